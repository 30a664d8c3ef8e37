//! Command implementations.
//!
//! Every command takes the row store as `&dyn RowStore`, so the same code
//! runs against the remote workspace in `main` and against `MemoryStore`
//! in tests. Human progress goes to stderr, machine output (`--json`,
//! CSV) to stdout only.

pub mod company;
pub mod init;
pub mod invoice;
pub mod login;
pub mod product;
pub mod tx;
pub mod validate;

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;

use brokersheet_core::model::{Company, Product, Transaction, TRANSACTION_HEADERS};
use brokersheet_core::model::{
    COMPANY_TABLE, LEGACY_COMPANY_TABLE, LEGACY_PRODUCT_TABLE, PRODUCT_TABLE,
};
use brokersheet_core::normalize::{company_from_record, normalize_record, product_from_record};
use brokersheet_store::{auth, Credentials, RowStore, SheetsClient, StoreError};

use crate::CliError;

/// Resolve credentials (flag > env > saved file; clap folds flag and env
/// into one value) and build the remote client. Construction is offline;
/// nothing talks to the network until the first store call.
pub fn open_store(
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
) -> Result<SheetsClient, CliError> {
    let creds = match (spreadsheet_id, api_key) {
        (Some(id), Some(key)) => Credentials::new(id, key),
        (id, key) => {
            let saved = auth::load_credentials().ok_or(StoreError::NotAuthenticated)?;
            Credentials::new(
                id.unwrap_or(saved.spreadsheet_id),
                key.unwrap_or(saved.api_key),
            )
        }
    };
    Ok(SheetsClient::new(creds))
}

/// Parse a `--from`/`--to`/`--date` flag value, ISO `yyyy-mm-dd`.
pub fn parse_date_flag(flag: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::usage(format!("invalid {flag} date {value:?}: {e}")))
}

/// Both masters, canonical tables first, legacy tables appended. A master
/// that does not exist yet reads as empty; resolution simply finds nothing.
pub fn load_masters(store: &dyn RowStore) -> Result<(Vec<Company>, Vec<Product>), CliError> {
    let mut companies = Vec::new();
    for table in [COMPANY_TABLE, LEGACY_COMPANY_TABLE] {
        for record in list_or_empty(store, table)? {
            let company = company_from_record(&record);
            if !company.name.is_empty() {
                companies.push(company);
            }
        }
    }
    let mut products = Vec::new();
    for table in [PRODUCT_TABLE, LEGACY_PRODUCT_TABLE] {
        for record in list_or_empty(store, table)? {
            let product = product_from_record(&record);
            if !product.code.is_empty() || !product.name.is_empty() {
                products.push(product);
            }
        }
    }
    Ok((companies, products))
}

/// Normalized transactions from every listed period table, in table order.
/// Tables the workspace does not have yet are skipped.
pub fn load_transactions(
    store: &dyn RowStore,
    tables: &[String],
) -> Result<Vec<Transaction>, CliError> {
    let mut transactions = Vec::new();
    for table in tables {
        for record in list_or_empty(store, table)? {
            transactions.push(normalize_record(&record));
        }
    }
    Ok(transactions)
}

fn list_or_empty(
    store: &dyn RowStore,
    table: &str,
) -> Result<Vec<brokersheet_core::model::Record>, CliError> {
    match store.list(table) {
        Ok(records) => Ok(records),
        Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write transactions as CSV with the canonical header row, which is
/// emitted even when there are zero rows.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    out: &Option<PathBuf>,
) -> Result<String, CliError> {
    let out_label = out
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());

    let writer: Box<dyn Write> = match out {
        Some(path) => {
            let f = std::fs::File::create(path)
                .map_err(|e| CliError::io(format!("cannot create {}: {}", path.display(), e)))?;
            Box::new(std::io::BufWriter::new(f))
        }
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(TRANSACTION_HEADERS)
        .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;

    for tx in transactions {
        csv_writer
            .write_record([
                tx.date.as_str(),
                tx.buyer_name.as_str(),
                tx.buyer_city.as_str(),
                tx.seller_name.as_str(),
                tx.seller_city.as_str(),
                tx.product_name.as_str(),
                tx.product_code.as_str(),
                &tx.qty.to_string(),
                &tx.price.to_string(),
                tx.remarks.as_str(),
            ])
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))?;

    Ok(out_label)
}

/// Exactly one JSON value on stdout, newline-terminated.
pub fn print_json(value: &serde_json::Value) {
    println!("{}", value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokersheet_store::MemoryStore;

    #[test]
    fn masters_merge_canonical_and_legacy_tables() {
        let store = MemoryStore::new()
            .with_table(
                COMPANY_TABLE,
                &["companyName", "companyCity"],
                &[&["Acme", "Pune"]],
            )
            .with_table(LEGACY_COMPANY_TABLE, &["Name", "City"], &[&["Beta", "Indore"]]);

        let (companies, products) = load_masters(&store).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].name, "Acme");
        assert_eq!(companies[1].name, "Beta");
        assert!(products.is_empty());
    }

    #[test]
    fn missing_period_tables_are_skipped() {
        let store = MemoryStore::new().with_table(
            "FY2024-25",
            &["date", "qty"],
            &[&["2024-05-01", "10"]],
        );
        let tables = vec!["FY2023-24".to_string(), "FY2024-25".to_string()];
        let txs = load_transactions(&store, &tables).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].qty, 10.0);
    }

    #[test]
    fn csv_export_writes_headers_even_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_transactions_csv(&[], &Some(path.clone())).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("date,buyerCompanyName,"));
    }

    #[test]
    fn date_flag_rejects_display_form() {
        assert!(parse_date_flag("--from", "2024-05-01").is_ok());
        let err = parse_date_flag("--from", "01/05/2024").unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.message.contains("--from"));
    }
}
