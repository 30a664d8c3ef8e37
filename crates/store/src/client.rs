//! Spreadsheet service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required) speaking the
//! values API: read a range, append a row, overwrite a row, and batch
//! structural edits (add sheet, delete row).

use std::collections::HashMap;
use std::time::Duration;

use brokersheet_core::model::Record;

use crate::auth::{load_credentials, Credentials};
use crate::error::StoreError;
use crate::store::RowStore;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Row-store client bound to one workspace (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
}

/// One sheet tab from the workspace metadata.
#[derive(Debug)]
struct SheetProps {
    title: String,
    sheet_id: i64,
}

impl SheetsClient {
    /// Create a client using saved credentials.
    pub fn from_saved_credentials() -> Result<Self, StoreError> {
        let creds = load_credentials().ok_or(StoreError::NotAuthenticated)?;
        Ok(Self::new(creds))
    }

    /// Create a client with explicit credentials.
    pub fn new(creds: Credentials) -> Self {
        Self::with_base_url(creds, SHEETS_API_BASE.to_string())
    }

    pub fn with_base_url(creds: Credentials, base_url: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("bsheet/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            spreadsheet_id: creds.spreadsheet_id,
            api_key: creds.api_key,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Titles of every table in the workspace.
    pub fn tables(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sheet_props()?.into_iter().map(|s| s.title).collect())
    }

    // ── Wire calls ──────────────────────────────────────────────────

    fn sheet_props(&self) -> Result<Vec<SheetProps>, StoreError> {
        let url = format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id);
        let json = self.get(&url, &[("fields", "sheets.properties")])?;

        let sheets = json["sheets"].as_array().cloned().unwrap_or_default();
        Ok(sheets
            .iter()
            .map(|s| SheetProps {
                title: s["properties"]["title"].as_str().unwrap_or("").to_string(),
                sheet_id: s["properties"]["sheetId"].as_i64().unwrap_or(0),
            })
            .collect())
    }

    fn sheet_id(&self, table: &str) -> Result<i64, StoreError> {
        self.sheet_props()?
            .into_iter()
            .find(|s| s.title == table)
            .map(|s| s.sheet_id)
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
            })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    fn read_values(&self, table: &str, suffix: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.values_url(&a1(table, suffix));
        let json = self.get(&url, &[]).map_err(|e| missing_table(table, e))?;
        let rows = json["values"].as_array().cloned().unwrap_or_default();
        Ok(rows.iter().map(string_cells).collect())
    }

    /// Overwrite the header row. Internal: position 1 is off limits to the
    /// public update path.
    fn write_header(&self, table: &str, headers: &[&str]) -> Result<(), StoreError> {
        let range = a1(table, &format!("A1:{}1", column_letter(headers.len().max(1))));
        let url = self.values_url(&range);
        let body = serde_json::json!({ "values": [headers] });
        self.mutate(
            table,
            self.http
                .put(&url)
                .query(&[("valueInputOption", "USER_ENTERED")])
                .json(&body),
        )
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, StoreError> {
        let mut req = self.http.get(url).query(&[("key", self.api_key.as_str())]);
        if !query.is_empty() {
            req = req.query(query);
        }
        let response = req.send().map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http(status, api_message(&body, status)));
        }

        response.json().map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn mutate(
        &self,
        table: &str,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<(), StoreError> {
        let response = req
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|e| StoreError::Write {
                table: table.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Write {
                table: table.to_string(),
                detail: api_message(&body, status),
            });
        }

        Ok(())
    }
}

impl RowStore for SheetsClient {
    fn list(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let rows = self.read_values(table, "A:Z")?;
        let Some((header_row, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };
        Ok(data
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut fields = HashMap::new();
                for (j, h) in header_row.iter().enumerate() {
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
        let rows = self.read_values(table, "1:1")?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    fn append(&self, table: &str, values: &[String]) -> Result<(), StoreError> {
        let url = format!("{}:append", self.values_url(&a1(table, "A:Z")));
        let body = serde_json::json!({ "values": [values] });
        self.mutate(
            table,
            self.http
                .post(&url)
                .query(&[
                    ("valueInputOption", "USER_ENTERED"),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&body),
        )
    }

    fn update(&self, table: &str, position: u32, values: &[String]) -> Result<(), StoreError> {
        if position < 2 {
            return Err(StoreError::InvalidPosition { position });
        }
        // Range width follows the values written, not the header: cells
        // past the last value are left untouched. Callers that mean to
        // overwrite the whole row pass one value per header column.
        let last = column_letter(values.len().max(1));
        let range = a1(table, &format!("A{position}:{last}{position}"));
        let url = self.values_url(&range);
        let body = serde_json::json!({ "values": [values] });
        self.mutate(
            table,
            self.http
                .put(&url)
                .query(&[("valueInputOption", "USER_ENTERED")])
                .json(&body),
        )
    }

    fn delete(&self, table: &str, position: u32) -> Result<(), StoreError> {
        if position < 2 {
            return Err(StoreError::InvalidPosition { position });
        }
        let sheet_id = self.sheet_id(table)?;
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.base_url, self.spreadsheet_id
        );
        // The structural API is 0-based and half-open: deleting sheet row
        // N means [N-1, N).
        let body = serde_json::json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": position - 1,
                        "endIndex": position,
                    }
                }
            }]
        });
        self.mutate(table, self.http.post(&url).json(&body))
    }

    fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), StoreError> {
        if !self.tables()?.iter().any(|t| t == table) {
            let url = format!(
                "{}/spreadsheets/{}:batchUpdate",
                self.base_url, self.spreadsheet_id
            );
            let body = serde_json::json!({
                "requests": [{
                    "addSheet": { "properties": { "title": table } }
                }]
            });
            self.mutate(table, self.http.post(&url).json(&body))?;
        }

        let current = self.headers(table)?;
        let mismatched = current.len() < headers.len()
            || headers.iter().zip(&current).any(|(want, have)| want != have);
        if mismatched {
            self.write_header(table, headers)?;
        }
        Ok(())
    }
}

// ── Free functions ──────────────────────────────────────────────────

/// Quote a table title into A1 notation; embedded quotes double.
fn a1(table: &str, suffix: &str) -> String {
    format!("'{}'!{}", table.replace('\'', "''"), suffix)
}

/// 1-based column number to letters: 1 → A, 26 → Z, 27 → AA.
fn column_letter(mut n: usize) -> String {
    let mut s = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        s.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    s
}

fn string_cells(row: &serde_json::Value) -> Vec<String> {
    row.as_array()
        .map(|cells| {
            cells
                .iter()
                .map(|c| c.as_str().unwrap_or("").to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Service errors come wrapped as `{"error": {"message": ...}}`.
fn api_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        })
}

/// A read against a table the workspace does not have comes back as a
/// range-parse failure; surface it as NotFound.
fn missing_table(table: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::Http(400, ref msg) if msg.contains("Unable to parse range") => {
            StoreError::NotFound {
                table: table.to_string(),
            }
        }
        other => other,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
