//! Error types for the desk pipeline
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Top-level error raised by services, listeners and connectors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Key absent from a keyed store or catalog.
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// Malformed external record. Aborts the ingestion call that read it.
    #[error("Malformed record at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// One side of a book carries no quote.
    #[error("Empty book for {instrument}")]
    EmptyBook { instrument: String },

    /// Summed quantity no longer fits its integer type.
    #[error("Quantity overflow for {instrument}")]
    QuantityOverflow { instrument: String },

    /// Outbound connector could not push a record.
    #[error("Sink error: {reason}")]
    Sink { reason: String },
}

impl ServiceError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    pub fn overflow(instrument: impl Into<String>) -> Self {
        Self::QuantityOverflow {
            instrument: instrument.into(),
        }
    }
}

/// Failure decoding fractional price notation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceFormatError {
    #[error("missing '-' separator in {0:?}")]
    MissingSeparator(String),

    #[error("fractional segment of {0:?} must be exactly 3 characters")]
    FractionLength(String),

    #[error("invalid digits in {0:?}")]
    InvalidDigits(String),

    #[error("32nds out of range in {0:?}")]
    ThirtySecondsOutOfRange(String),
}
