//! CLI exit code registry.
//!
//! Single source of truth for `bsheet` exit codes. Exit codes are part of
//! the shell contract; scripts branch on them, so every code here is
//! stable once shipped.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified; avoid)                  |
//! | 2    | Usage error (bad arguments, malformed dates)        |
//! | 3    | Validation error (required field missing or wrong)  |
//! | 4    | Not found (table/row/company/product, or no match)  |
//! | 5    | Store I/O (network, service rejection, bad body)    |
//! | 6    | Not authenticated (no credentials, or rejected key) |

use brokersheet_store::StoreError;

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments or malformed option values.
pub const EXIT_USAGE: u8 = 2;

/// Input failed a business-rule check (empty buyer, negative qty, …).
pub const EXIT_VALIDATION: u8 = 3;

/// Referenced table/row/master entry absent, or an invoice filter that
/// matched nothing.
pub const EXIT_NOT_FOUND: u8 = 4;

/// Transport failure or service rejection while reading/writing the book.
pub const EXIT_STORE: u8 = 5;

/// No credentials configured, or the service rejected them.
pub const EXIT_AUTH: u8 = 6;

/// Map a store error to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::NotAuthenticated => EXIT_AUTH,
        StoreError::NotFound { .. } => EXIT_NOT_FOUND,
        StoreError::InvalidPosition { .. } => EXIT_VALIDATION,
        StoreError::Http(401 | 403, _) => EXIT_AUTH,
        StoreError::Write { .. } | StoreError::Network(_) | StoreError::Http(..) => EXIT_STORE,
        StoreError::Parse(_) => EXIT_STORE,
    }
}
