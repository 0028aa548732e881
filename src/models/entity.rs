//! Entity metadata for Solana addresses.
//!
//! Metadata is resolved from two independent provider calls (a search-style
//! lookup and a direct account-info lookup) and merged here. The merged
//! record is what the classifier and the report read.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use solana_pubkey::Pubkey;

/// Raw metadata extracted from one provider response for one address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityLookup {
    /// Whether the address lies on the ed25519 curve. `false` is the
    /// authoritative signal that the address is program-derived.
    pub is_on_curve: Option<bool>,
    /// Provider's own type string, e.g. "SYSTEM", "UNKNOWN".
    pub entity_type: Option<String>,
    /// Metadata account type, e.g. "system_account", "token_account",
    /// "program".
    pub account_type: Option<String>,
    /// Human-readable label, e.g. "Jupiter Aggregator".
    pub account_label: Option<String>,
    /// Tags such as "dex", "protocol", "raydium".
    #[serde(default)]
    pub account_tags: Vec<String>,
    /// Owning program of the account, when reported.
    pub owner_program: Option<String>,
}

impl EntityLookup {
    /// True when the lookup carries no usable metadata at all.
    pub fn is_empty(&self) -> bool {
        self.is_on_curve.is_none()
            && self.entity_type.is_none()
            && self.account_type.is_none()
            && self.account_label.is_none()
            && self.account_tags.is_empty()
    }
}

/// Merged metadata for one address, ready for classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// The address this metadata describes.
    pub address: String,
    /// Curve membership; `Some(false)` means PDA, `None` means unknown.
    pub is_on_curve: Option<bool>,
    /// Provider type string, "UNKNOWN" when unreported.
    pub entity_type: String,
    /// Metadata account type, when reported.
    pub account_type: Option<String>,
    /// Human-readable label, when known.
    pub account_label: Option<String>,
    /// Entity tags.
    pub account_tags: Vec<String>,
    /// Owning program of the account, when reported.
    pub owner_program: Option<String>,
}

impl EntityMetadata {
    /// Merge the two lookup sources for `address`.
    ///
    /// Account-info takes precedence when both sources disagree on type or
    /// label; tags and `is_on_curve` come from the search payload when it
    /// reports them, with account-info as fallback. When neither source
    /// reports curve membership, it is derived locally from the address
    /// bytes.
    pub fn merge(address: &str, search: &EntityLookup, account: &EntityLookup) -> Self {
        let is_on_curve = search
            .is_on_curve
            .or(account.is_on_curve)
            .or_else(|| is_on_curve_local(address));

        let entity_type = account
            .entity_type
            .clone()
            .filter(|t| t != "unknown")
            .or_else(|| search.entity_type.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let account_type = account.account_type.clone().or_else(|| search.account_type.clone());
        let account_label = account
            .account_label
            .clone()
            .or_else(|| search.account_label.clone());

        let account_tags = if !search.account_tags.is_empty() {
            search.account_tags.clone()
        } else {
            account.account_tags.clone()
        };

        let owner_program = account.owner_program.clone().or_else(|| search.owner_program.clone());

        Self {
            address: address.to_string(),
            is_on_curve,
            entity_type,
            account_type,
            account_label,
            account_tags,
            owner_program,
        }
    }

    /// Whether the merged record identifies a program-derived address.
    pub fn is_pda(&self) -> bool {
        self.is_on_curve == Some(false)
    }

    /// Whether any source marked this as a system account. An account
    /// owned by the system program counts even when untyped.
    pub fn is_system_account(&self) -> bool {
        self.entity_type == "SYSTEM"
            || self.entity_type == "system_account"
            || self.account_type.as_deref() == Some("system_account")
            || self
                .owner_program
                .as_deref()
                .map_or(false, |owner| owner == solana_sdk_ids::system_program::id().to_string())
    }

    /// Whether the entity carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.account_tags.iter().any(|t| t == tag)
    }
}

/// Semantic category assigned to an address. Ordered rule lists in the
/// analyzer decide which variant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Pda,
    SystemAccount,
    DexPool,
    Protocol,
    Program,
    KnownEntity,
    RegularWallet,
}

impl EntityCategory {
    /// Categories that can never carry suspicion.
    pub fn is_benign(&self) -> bool {
        !matches!(self, EntityCategory::RegularWallet | EntityCategory::KnownEntity)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityCategory::Pda => "pda",
            EntityCategory::SystemAccount => "system_account",
            EntityCategory::DexPool => "dex_pool",
            EntityCategory::Protocol => "protocol",
            EntityCategory::Program => "program",
            EntityCategory::KnownEntity => "known_entity",
            EntityCategory::RegularWallet => "regular_wallet",
        };
        f.write_str(s)
    }
}

/// Derive curve membership from the address bytes when no provider
/// reported it. Invalid base58 yields `None` rather than a guess.
fn is_on_curve_local(address: &str) -> Option<bool> {
    Pubkey::from_str(address).ok().map(|pk| pk.is_on_curve())
}
