//! `brokersheet-invoice`: the period brokerage invoice engine.
//!
//! Pure aggregation: [`engine::run`] takes a request plus pre-loaded,
//! normalized transactions and masters, and produces either the invoice
//! payload or a typed no-match outcome. No I/O happens in this crate; the
//! CLI loads the period tables and hands them in.

pub mod engine;
pub mod model;
pub mod policy;

pub use engine::run;
pub use model::{
    InvoiceInput, InvoiceMode, InvoicePayload, InvoiceRequest, Outcome, NO_MATCH_MESSAGE,
};
pub use policy::RatePolicy;
