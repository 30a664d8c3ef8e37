use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// No credentials configured.
    NotAuthenticated,
    /// The named table does not exist in the workspace.
    NotFound { table: String },
    /// Row position outside the data region; row 1 is the header, data
    /// starts at position 2.
    InvalidPosition { position: u32 },
    /// A mutation failed in transport or was rejected by the service.
    Write { table: String, detail: String },
    /// Network error on a read.
    Network(String),
    /// Non-2xx from the service on a read.
    Http(u16, String),
    /// Response body did not parse.
    Parse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "Not authenticated; run `bsheet login` first")
            }
            Self::NotFound { table } => write!(f, "table '{table}' not found"),
            Self::InvalidPosition { position } => {
                write!(f, "invalid row position {position} (first data row is 2)")
            }
            Self::Write { table, detail } => {
                write!(f, "write to '{table}' failed: {detail}")
            }
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(code, msg) => write!(f, "HTTP {code}: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
