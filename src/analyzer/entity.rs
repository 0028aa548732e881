//! Entity classification.
//!
//! Two independent ordered rule lists: one categorizes the primary query
//! subject, one classifies counterparties during the deep dive. Their tag
//! handling differs on purpose; do not fold them into each other.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::models::entity::{EntityCategory, EntityMetadata};
use crate::models::report::BotLikelihood;

static DEX_POOL_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["dex", "market", "meteora", "raydium", "orca", "jupiter"]
        .into_iter()
        .collect()
});

static PROTOCOL_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["protocol", "defi"].into_iter().collect());

/// Categorize the primary query subject. First match governs.
pub fn categorize_primary(meta: &EntityMetadata) -> EntityCategory {
    if meta.is_pda() {
        return EntityCategory::Pda;
    }
    if meta.is_system_account() {
        return EntityCategory::SystemAccount;
    }
    if meta.account_tags.iter().any(|t| DEX_POOL_TAGS.contains(t.as_str())) {
        return EntityCategory::DexPool;
    }
    if meta.account_tags.iter().any(|t| PROTOCOL_TAGS.contains(t.as_str())) {
        return EntityCategory::Protocol;
    }
    if meta.has_tag("program") || meta.account_type.as_deref() == Some("program") {
        return EntityCategory::Program;
    }
    if meta.account_label.is_some() {
        return EntityCategory::KnownEntity;
    }
    EntityCategory::RegularWallet
}

/// Classify a counterparty during the deep dive. Returns the
/// classification name and whether the address is benign (excluded from
/// suspicion reporting). First match wins.
pub fn classify_counterparty(meta: &EntityMetadata) -> (&'static str, bool) {
    if meta.is_pda() {
        return ("pda", true);
    }
    if meta.entity_type == "SYSTEM"
        || meta.entity_type == "system_account"
        || matches!(meta.account_type.as_deref(), Some("system_account") | Some("token_account"))
    {
        return ("infrastructure", true);
    }
    if meta.entity_type == "UNKNOWN"
        && meta.account_label.is_none()
        && meta.account_tags.is_empty()
        && meta.is_on_curve != Some(false)
    {
        return ("likely_trader", false);
    }
    if meta.has_tag("jupiter") || meta.has_tag("dex_wallet") {
        return ("known_bot", false);
    }
    if meta.has_tag("protocol") || meta.has_tag("program") {
        return ("protocol", true);
    }
    if meta.account_type.as_deref() == Some("program") {
        return ("program", true);
    }
    if meta
        .account_label
        .as_deref()
        .map_or(false, |label| label.contains("Authority"))
    {
        return ("pda_authority", true);
    }
    if meta.account_label.is_some() && (meta.has_tag("dex") || meta.has_tag("market")) {
        return ("dex_pool", true);
    }
    if meta.is_on_curve == Some(true) {
        return ("likely_trader", false);
    }
    // Conservative default: insufficient evidence either way
    ("unknown", true)
}

/// Bot-likelihood tier for a deep-dive profile.
pub fn estimate_bot_likelihood(
    is_benign: bool,
    transaction_count: usize,
    counterparty_count: usize,
) -> BotLikelihood {
    if !is_benign && transaction_count > 50 && counterparty_count > 3 {
        BotLikelihood::High
    } else if !is_benign && transaction_count > 20 {
        BotLikelihood::Medium
    } else {
        BotLikelihood::Low
    }
}
