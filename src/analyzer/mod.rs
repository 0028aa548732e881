//! Heuristic analysis of transaction sets and entity metadata

pub mod entity;
pub mod patterns;


pub use self::entity::{categorize_primary, classify_counterparty, estimate_bot_likelihood};
pub use self::patterns::{detect_suspicious_patterns, PatternAnalysis};
