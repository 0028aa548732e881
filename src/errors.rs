//! Error handling for the Solana anomaly analyzer.
//!
//! The pipeline never lets an error escape a run: every failure is folded
//! into a terminal message on the workflow state and surfaced through the
//! final formatting stage. The variants here exist so the adapters and
//! stages can say *which kind* of failure occurred before it is folded.

use thiserror::Error;

/// Main error type for the analyzer.
///
/// Each variant corresponds to one failure class of the pipeline: query
/// interpretation, address/signature resolution, transaction retrieval,
/// and narrative synthesis, plus transport-level failures from the
/// completion service. Cache I/O uses `anyhow` directly; a cache miss is
/// never an error.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Query interpretation could not produce structured intent.
    #[error("Failed to parse query: {0}")]
    ParseFailure(String),

    /// Address or signature resolution failed at a metadata provider.
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Transaction history retrieval failed.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Narrative synthesis failed.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// The completion service returned a transport-level error or an
    /// unusable response body.
    #[error("Completion service error: {0}")]
    Completion(String),
}

/// Result type alias for the analyzer.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
