//! `brokersheet-store`: the remote row store behind every command.
//!
//! Blocking reqwest client (no Tokio runtime required) speaking the
//! spreadsheet service's values API, plus an in-memory fake implementing
//! the same [`RowStore`] trait for tests.

pub mod auth;
pub mod client;
pub mod error;
pub mod store;

pub use auth::Credentials;
pub use client::SheetsClient;
pub use error::StoreError;
pub use store::{MemoryStore, RowStore};
