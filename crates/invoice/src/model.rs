use chrono::NaiveDate;
use serde::Serialize;

use brokersheet_core::model::{Company, Product, Transaction};

use crate::policy::RatePolicy;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One invoice computation. Company matching is case-insensitive; the date
/// range is inclusive on both ends.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub company: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Per-unit amount or percentage, depending on `policy`.
    pub rate: f64,
    pub policy: RatePolicy,
    pub mode: InvoiceMode,
}

/// Preview and final runs share one code path, so their figures always
/// agree; preview only substitutes placeholder invoice identity.
#[derive(Debug, Clone)]
pub enum InvoiceMode {
    Preview,
    Final {
        invoice_no: String,
        /// Display date, `dd/mm/yyyy`.
        invoice_date: String,
    },
}

/// Pre-loaded inputs: every transaction from the period table(s) covering
/// the range, plus both masters for city/product resolution.
#[derive(Debug, Clone, Default)]
pub struct InvoiceInput {
    pub transactions: Vec<Transaction>,
    pub companies: Vec<Company>,
    pub products: Vec<Product>,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

pub const NO_MATCH_MESSAGE: &str = "No matching transactions found.";

/// An empty primary filter is a legitimate business result, distinct from
/// a zero-quantity invoice. Callers branch on it, not on totals.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Invoice(InvoicePayload),
    NoMatch,
}

impl Outcome {
    /// The wire shape: the payload itself on success, the fixed
    /// `{"success": false, ...}` envelope on no match.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Invoice(payload) => {
                serde_json::to_value(payload).expect("invoice payload serializes")
            }
            Self::NoMatch => serde_json::json!({
                "success": false,
                "error": NO_MATCH_MESSAGE,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The full invoice response. Field order is the wire contract; renderers
/// downstream consume this JSON as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    pub success: bool,
    pub summary: InvoiceSummary,
    pub transactions: Vec<InvoiceLine>,
    #[serde(rename = "otherSideTransactions")]
    pub other_side_transactions: Vec<InvoiceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    /// Sequential, count-derived, NOT a stable identifier: it shifts when
    /// rows are added or removed before generation.
    #[serde(rename = "invoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "companyCity", skip_serializing_if = "Option::is_none")]
    pub company_city: Option<String>,
    #[serde(rename = "invoiceDate")]
    pub invoice_date: String,
    #[serde(rename = "dateRange")]
    pub date_range: DateRange,
    #[serde(rename = "brokerageRate")]
    pub brokerage_rate: f64,
    #[serde(rename = "totalQty")]
    pub total_qty: f64,
    #[serde(rename = "brokerageAmount")]
    pub brokerage_amount: f64,
    #[serde(rename = "otherSideBrokerage")]
    pub other_side_brokerage: f64,
    /// Reported for transparency; deliberately not folded into
    /// `total_payable`.
    #[serde(rename = "otherSideTotalPayable")]
    pub other_side_total_payable: f64,
    #[serde(rename = "totalPayable")]
    pub total_payable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    /// Display form, `dd/mm/yyyy`.
    pub start: String,
    pub end: String,
}

/// One transaction as it appears on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceLine {
    pub date: String,
    #[serde(rename = "buyerCompanyName")]
    pub buyer_company_name: String,
    #[serde(rename = "buyerCompanyCity")]
    pub buyer_company_city: String,
    #[serde(rename = "sellerCompanyName")]
    pub seller_company_name: String,
    #[serde(rename = "sellerCompanyCity")]
    pub seller_company_city: String,
    pub product: String,
    #[serde(rename = "productCode")]
    pub product_code: String,
    pub qty: f64,
    pub price: f64,
    pub rate: f64,
    pub amount: f64,
    pub remarks: String,
}
