use thiserror::Error;

/// Failures that abort a single ticker's analysis run.
///
/// Degenerate inputs that still have a defined answer (a zero-variance return
/// series, the undefined first-row return) are handled inside the stages and
/// never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The upstream price source failed or returned nothing usable.
    #[error("retrieval failed for {ticker}: {reason}")]
    Retrieval { ticker: String, reason: String },

    /// Cleaning left too few rows to derive a return series.
    #[error("cleaned series for {ticker} has {rows} row(s), need at least {min}")]
    EmptySeries {
        ticker: String,
        rows: usize,
        min: usize,
    },

    /// A stage needs more observations than the series holds.
    #[error("{operation} requires at least {required} observations, series has {actual}")]
    InsufficientHistory {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// The cleaned snapshot could not be written.
    #[error("failed to persist snapshot for {ticker}: {reason}")]
    Persistence { ticker: String, reason: String },
}
