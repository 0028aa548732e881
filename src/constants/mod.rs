//! Constants used throughout the analyzer

pub mod prompts;

/// Default look-back window in hours when no token is referenced.
pub const DEFAULT_HOURS_BACK: u64 = 10;

/// Look-back window in hours for token-specific or "all time" queries
/// (one year).
pub const TOKEN_HISTORY_HOURS: u64 = 8760;

/// Maximum number of suspicious addresses kept after pattern detection.
pub const MAX_SUSPICIOUS_ADDRESSES: usize = 20;

/// Maximum number of suspicious addresses investigated by the deep dive.
pub const MAX_DEEP_DIVE_ADDRESSES: usize = 5;

/// Maximum number of full transactions handed to the narrative prompt.
pub const MAX_PROMPT_TRANSACTIONS: usize = 200;
