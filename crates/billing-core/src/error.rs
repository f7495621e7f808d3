use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of input record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Seller,
    Order,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Seller => f.write_str("seller"),
            RecordKind::Order => f.write_str("order"),
        }
    }
}

/// All errors produced by the billing report crates.
#[derive(Error, Debug)]
pub enum BillingError {
    /// A share was requested of a total that is zero.
    #[error("Cannot compute a share of a zero total")]
    DivisionByZero,

    /// An order points at a seller id that is not in the seller set.
    #[error("Order {order_id} references unknown seller {seller_id}")]
    DanglingReference { order_id: String, seller_id: String },

    /// A record carries a value outside its allowed domain.
    #[error("Malformed {kind} {id}: field {field} has invalid value {value}")]
    MalformedRecord {
        kind: RecordKind,
        id: String,
        field: &'static str,
        value: String,
    },

    /// Two sellers share the same id.
    #[error("Duplicate seller id: {0}")]
    DuplicateSeller(String),

    /// One line of a JSONL file could not be decoded into a record.
    #[error("Unparsable record at {path}:{line}: {message}")]
    UnparsableRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the billing crates.
pub type Result<T> = std::result::Result<T, BillingError>;
