//! `brokersheet-core`: ledger tables, period naming and row normalization.
//!
//! Pure domain crate: no I/O. The store crate produces header-keyed records;
//! everything here turns them into typed rows and orders values back into
//! header sequence for writes.

pub mod model;
pub mod normalize;
pub mod resolve;

pub use model::{Company, Product, Record, Transaction};
pub use normalize::normalize_record;
pub use resolve::MasterIndex;
