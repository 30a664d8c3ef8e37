//! `bsheet init`: sheet bootstrap.

use brokersheet_core::model::{
    fy_table, COMPANY_HEADERS, COMPANY_TABLE, PRODUCT_HEADERS, PRODUCT_TABLE,
    TRANSACTION_HEADERS,
};
use brokersheet_store::RowStore;

use crate::CliError;

/// Guarantee the period table and both masters exist with canonical
/// headers. Idempotent; must run before the first write to a fresh book,
/// and is cheap enough to run any time after.
pub fn cmd_init(store: &dyn RowStore, period: Option<String>, quiet: bool) -> Result<(), CliError> {
    let period = period.unwrap_or_else(|| fy_table(chrono::Local::now().date_naive()));

    for (table, headers) in [
        (period.as_str(), &TRANSACTION_HEADERS[..]),
        (COMPANY_TABLE, &COMPANY_HEADERS[..]),
        (PRODUCT_TABLE, &PRODUCT_HEADERS[..]),
    ] {
        store.ensure_table(table, headers)?;
        if !quiet {
            eprintln!("Ensured table '{}'", table);
        }
    }
    Ok(())
}
