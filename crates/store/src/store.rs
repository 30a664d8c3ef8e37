//! The row-store surface the commands are written against, plus an
//! in-memory implementation used by tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use brokersheet_core::model::Record;

use crate::error::StoreError;

/// A named table of rows behind a header row. Positions are 1-based sheet
/// rows: the header is row 1, the first data record is position 2. A
/// delete shifts every later row up by one, so positions captured before
/// a mutation are stale afterwards.
///
/// There is no transaction boundary. A read followed by a write is not
/// atomic, and a position is only safe to address if no concurrent
/// delete/insert happened since it was read.
pub trait RowStore {
    /// All data records, keyed by the live header row. Fails with
    /// [`StoreError::NotFound`] when the table does not exist.
    fn list(&self, table: &str) -> Result<Vec<Record>, StoreError>;

    /// The header row. Empty means "no header row yet". The header order
    /// is the authoritative column order for every value-array write.
    fn headers(&self, table: &str) -> Result<Vec<String>, StoreError>;

    /// Append one row at the end. Values must already be ordered to the
    /// table's header sequence. Not idempotent.
    fn append(&self, table: &str, values: &[String]) -> Result<(), StoreError>;

    /// Overwrite the row at `position`. Positions below 2 are rejected
    /// before any call goes out.
    fn update(&self, table: &str, position: u32, values: &[String]) -> Result<(), StoreError>;

    /// Remove the row at `position`, shifting later rows up by one.
    fn delete(&self, table: &str, position: u32) -> Result<(), StoreError>;

    /// Create the table if absent; overwrite the header row when it is
    /// missing, shorter than `headers`, or differs in any position. The
    /// overwrite is destructive: a non-conforming header row is treated
    /// as corrupt.
    fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), StoreError>;

    /// Number of data records currently in the table.
    fn row_count(&self, table: &str) -> Result<u32, StoreError> {
        Ok(self.list(table)?.len() as u32)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// In-process [`RowStore`] with the same edge behavior as the remote one.
/// Used by engine and command tests; never talks to the network.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with headers and rows, replacing any existing content.
    pub fn with_table(self, name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        self.lock().insert(
            name.to_string(),
            MemoryTable {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
            },
        );
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryTable>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RowStore for MemoryStore {
    fn list(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let tables = self.lock();
        let t = tables.get(table).ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
        })?;
        Ok(t.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut fields = HashMap::new();
                for (j, h) in t.headers.iter().enumerate() {
                    fields.insert(h.clone(), row.get(j).cloned().unwrap_or_default());
                }
                Record {
                    position: (i + 2) as u32,
                    fields,
                }
            })
            .collect())
    }

    fn headers(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let tables = self.lock();
        let t = tables.get(table).ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
        })?;
        Ok(t.headers.clone())
    }

    fn append(&self, table: &str, values: &[String]) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let t = tables.get_mut(table).ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
        })?;
        t.rows.push(values.to_vec());
        Ok(())
    }

    fn update(&self, table: &str, position: u32, values: &[String]) -> Result<(), StoreError> {
        if position < 2 {
            return Err(StoreError::InvalidPosition { position });
        }
        let mut tables = self.lock();
        let t = tables.get_mut(table).ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
        })?;
        let idx = (position - 2) as usize;
        // The remote service fills the gap with empty rows when a write
        // lands past the last row; mirror that.
        while t.rows.len() <= idx {
            t.rows.push(Vec::new());
        }
        t.rows[idx] = values.to_vec();
        Ok(())
    }

    fn delete(&self, table: &str, position: u32) -> Result<(), StoreError> {
        if position < 2 {
            return Err(StoreError::InvalidPosition { position });
        }
        let mut tables = self.lock();
        let t = tables.get_mut(table).ok_or_else(|| StoreError::NotFound {
            table: table.to_string(),
        })?;
        let idx = (position - 2) as usize;
        if idx >= t.rows.len() {
            return Err(StoreError::Write {
                table: table.to_string(),
                detail: format!("row {position} is past the end of the table"),
            });
        }
        t.rows.remove(idx);
        Ok(())
    }

    fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let t = tables.entry(table.to_string()).or_default();
        let mismatched = t.headers.len() < headers.len()
            || headers.iter().zip(&t.headers).any(|(want, have)| want != have);
        if mismatched {
            t.headers = headers.iter().map(|h| h.to_string()).collect();
        }
        Ok(())
    }
}
