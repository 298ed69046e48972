//! Error types for the consolidator.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the consolidator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input tree could not be enumerated.
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// A row could not be turned into a typed record.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the source file (header is line 1).
        line: u64,
        message: String,
    },

    /// Processing ledger could not be read or written.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Cumulative output file could not be written.
    #[error("Output error: {0}")]
    Output(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a discovery error.
    pub fn discovery(msg: impl Into<String>) -> Self {
        Error::Discovery(msg.into())
    }

    /// Create a parse error for the given source line.
    pub fn parse(line: u64, msg: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create a ledger error.
    pub fn ledger(msg: impl Into<String>) -> Self {
        Error::Ledger(msg.into())
    }

    /// Create an output error.
    pub fn output(msg: impl Into<String>) -> Self {
        Error::Output(msg.into())
    }
}
