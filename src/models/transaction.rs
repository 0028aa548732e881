//! Enhanced transaction records as returned by the transaction provider.
//!
//! Field names follow the provider's camelCase wire format. Records are
//! immutable once fetched and live only for the duration of one pipeline
//! run; they are never persisted.

use serde::{Deserialize, Serialize};

/// A single enhanced transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction signature.
    pub signature: String,
    /// Unix timestamp in seconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Provider-assigned type, e.g. "SWAP", "TRANSFER", "NFT_SALE",
    /// "UNKNOWN".
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
    /// Token movements in this transaction.
    #[serde(default)]
    pub token_transfers: Vec<TokenTransfer>,
    /// Native SOL movements in this transaction.
    #[serde(default)]
    pub native_transfers: Vec<NativeTransfer>,
}

/// A token movement inside a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    /// Mint address of the token being moved.
    #[serde(default)]
    pub mint: String,
    /// Sending user account, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_account: Option<String>,
    /// Receiving user account, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_account: Option<String>,
    /// Amount moved; may be fractional and may be absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_amount: Option<f64>,
}

/// A native SOL movement inside a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_account: Option<String>,
    /// Amount in lamports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

impl Transaction {
    /// Whether this transaction moves the given token mint.
    pub fn touches_mint(&self, mint: &str) -> bool {
        self.token_transfers.iter().any(|t| t.mint == mint)
    }

    /// Provider type, defaulting to "UNKNOWN" when absent.
    pub fn type_or_unknown(&self) -> &str {
        self.tx_type.as_deref().unwrap_or("UNKNOWN")
    }
}
