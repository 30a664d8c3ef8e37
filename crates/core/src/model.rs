use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Master table holding one company per row.
pub const COMPANY_TABLE: &str = "Company Master";
pub const COMPANY_HEADERS: [&str; 2] = ["companyName", "companyCity"];

/// Master table holding one product per row.
pub const PRODUCT_TABLE: &str = "Product Master";
pub const PRODUCT_HEADERS: [&str; 2] = ["productCode", "productName"];

/// Master tables from older books. Readable through the same alias
/// machinery; all writes target the canonical masters above.
pub const LEGACY_COMPANY_TABLE: &str = "Companies";
pub const LEGACY_PRODUCT_TABLE: &str = "Products";

/// Canonical header row for a period (financial-year) transaction table.
/// Older tables carry other spellings; reads go through the alias chains in
/// [`crate::normalize`], writes always use these names.
pub const TRANSACTION_HEADERS: [&str; 10] = [
    "date",
    "buyerCompanyName",
    "buyerCompanyCity",
    "sellerCompanyName",
    "sellerCompanyCity",
    "product",
    "productCode",
    "qty",
    "price",
    "remarks",
];

/// Period table name for a transaction date. The financial year starts in
/// April: 2024-05-01 books into `FY2024-25`, 2024-02-10 into `FY2023-24`.
pub fn fy_table(date: NaiveDate) -> String {
    let start = fy_start_year(date);
    format!("FY{start}-{:02}", (start + 1) % 100)
}

/// Every period table a date range touches, oldest first. A range inside
/// one financial year yields a single table.
pub fn fy_tables(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let first = fy_start_year(start);
    let last = fy_start_year(end).max(first);
    (first..=last)
        .map(|y| format!("FY{y}-{:02}", (y + 1) % 100))
        .collect()
}

fn fy_start_year(date: NaiveDate) -> i32 {
    if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Parse a ledger date in either stored form: ISO `2024-05-01` or the
/// display form `01/05/2024`.
pub fn parse_ledger_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(v, "%d/%m/%Y"))
        .ok()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One raw data row, keyed by header text exactly as the table spells it.
/// `position` is the 1-based sheet row (header row is 1, so the first data
/// record has position 2). Positions go stale across deletes; callers
/// re-read before addressing a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub position: u32,
    pub fields: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A normalized ledger row. Serialized field names mirror the canonical
/// header row so JSON output and sheet columns read the same.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub position: u32,
    pub date: String,
    #[serde(rename = "buyerCompanyName")]
    pub buyer_name: String,
    #[serde(rename = "buyerCompanyCity")]
    pub buyer_city: String,
    #[serde(rename = "sellerCompanyName")]
    pub seller_name: String,
    #[serde(rename = "sellerCompanyCity")]
    pub seller_city: String,
    #[serde(rename = "product")]
    pub product_name: String,
    #[serde(rename = "productCode")]
    pub product_code: String,
    pub qty: f64,
    pub price: f64,
    pub remarks: String,
}

impl Transaction {
    /// The row's date as a calendar date, if it parses in either stored form.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_ledger_date(&self.date)
    }
}

// ---------------------------------------------------------------------------
// Master data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    #[serde(rename = "companyName")]
    pub name: String,
    #[serde(rename = "companyCity")]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    #[serde(rename = "productCode")]
    pub code: String,
    #[serde(rename = "productName")]
    pub name: String,
}
