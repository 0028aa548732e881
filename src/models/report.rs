//! Structured findings passed between pipeline stages.
//!
//! These structs travel through the workflow as values; they are only
//! serialized to text at the narrative prompt boundary.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityCategory, EntityMetadata};
use super::transaction::Transaction;

/// A counterparty flagged by the pattern detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAddressRecord {
    pub address: String,
    pub transaction_count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_volume: f64,
    /// Human-readable concatenation of the triggered heuristics.
    pub reason: String,
}

/// Entity section of the data report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    pub address: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub category: EntityCategory,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub is_on_curve: Option<bool>,
    pub is_pda: bool,
    pub is_system_account: bool,
    pub is_known_entity: bool,
    pub specific_token: Option<String>,
    pub description: String,
}

impl EntityInfo {
    /// Build the report section from merged metadata and its category.
    pub fn from_metadata(
        meta: &EntityMetadata,
        category: EntityCategory,
        specific_token: Option<&str>,
    ) -> Self {
        let is_pda = meta.is_pda();
        let is_system = category == EntityCategory::SystemAccount;
        let description = if is_pda {
            "PDA (Program Derived Address) - program-controlled account, should NOT be flagged for illegal activity".to_string()
        } else if is_system {
            "SYSTEM ACCOUNT (infrastructure - should be filtered out from suspicious address detection)".to_string()
        } else if let Some(label) = &meta.account_label {
            if meta.account_tags.is_empty() {
                label.clone()
            } else {
                format!("{} ({})", label, meta.account_tags.join(", "))
            }
        } else if meta.entity_type != "UNKNOWN" {
            format!("{} account", meta.entity_type)
        } else {
            "Regular wallet".to_string()
        };

        Self {
            address: meta.address.clone(),
            entity_type: meta.entity_type.clone(),
            category,
            name: meta.account_label.clone(),
            tags: meta.account_tags.clone(),
            is_on_curve: meta.is_on_curve,
            is_pda,
            is_system_account: is_system,
            is_known_entity: meta.account_label.is_some() || category != EntityCategory::RegularWallet,
            specific_token: specific_token.map(str::to_string),
            description,
        }
    }
}

/// One entry of the top-counterparty frequency table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressFrequency {
    pub address: String,
    pub transaction_count: usize,
}

/// A compact view of one transaction for report samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleTransaction {
    pub signature: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    /// ISO-8601 timestamp, when the transaction carries one.
    pub timestamp: Option<String>,
    pub token_transfers: usize,
}

impl SampleTransaction {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            signature: tx.signature.clone(),
            tx_type: tx.type_or_unknown().to_string(),
            timestamp: tx.timestamp.and_then(iso_timestamp),
            token_transfers: tx.token_transfers.len(),
        }
    }
}

/// Summary of the pattern-detection pass carried in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSection {
    pub total_unique_counterparties: usize,
    pub suspicious_count: usize,
    pub top_suspicious: Vec<TopSuspicious>,
}

/// Condensed suspicious-address line for the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSuspicious {
    pub address: String,
    pub reason: String,
    pub tx_count: usize,
}

/// The structured report assembled after data retrieval, consumed by the
/// deep dive and the narrative synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataReport {
    pub entity_info: EntityInfo,
    pub total_transactions: usize,
    pub time_range: String,
    pub unique_addresses: usize,
    pub known_transaction_types: BTreeMap<String, usize>,
    pub top_addresses_by_frequency: Vec<AddressFrequency>,
    pub sample_transactions: Vec<SampleTransaction>,
    pub suspicious_pattern_detection: PatternSection,
}

/// Bot-likelihood tier assigned during the deep dive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotLikelihood {
    High,
    Medium,
    Low,
}

/// Derived activity flags for a deep-dive profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFlags {
    pub is_multi_pool_trader: bool,
    pub is_high_frequency: bool,
    pub trades_multiple_tokens: bool,
    pub estimated_bot_likelihood: BotLikelihood,
}

/// Full profile of one investigated suspicious address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousProfile {
    pub address: String,
    /// Reason string from the initial pattern detection.
    pub original_reason: String,
    pub is_on_curve: Option<bool>,
    pub is_pda: bool,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub account_type: Option<String>,
    pub account_label: Option<String>,
    pub account_tags: Vec<String>,
    pub classification: String,
    pub is_benign: bool,
    pub transaction_count: usize,
    pub unique_counterparties: usize,
    pub unique_tokens: usize,
    pub total_volume: f64,
    pub activities: ActivityFlags,
    pub sample_transactions: Vec<SampleTransaction>,
}

/// Transaction summary handed to the narrative prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub time_range: SummaryTimeRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTimeRange {
    pub earliest: Option<i64>,
    pub latest: Option<i64>,
}

impl TransactionSummary {
    /// Summarize a newest-first transaction slice.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut by_type = BTreeMap::new();
        for tx in transactions {
            *by_type.entry(tx.type_or_unknown().to_string()).or_insert(0) += 1;
        }
        Self {
            total: transactions.len(),
            by_type,
            time_range: SummaryTimeRange {
                earliest: transactions.last().and_then(|tx| tx.timestamp),
                latest: transactions.first().and_then(|tx| tx.timestamp),
            },
        }
    }
}

/// Render a unix timestamp as ISO-8601, mirroring the report format.
pub fn iso_timestamp(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0).single().map(|t| t.to_rfc3339())
}

/// Human-readable description of the retrieval window.
pub fn describe_time_range(hours_back: u64, specific_token: Option<&str>) -> String {
    let days = hours_back / 24;
    match specific_token {
        Some(mint) if hours_back >= 720 => {
            format!("Complete history ({} days) - filtered for token: {}", days, mint)
        }
        Some(mint) => format!(
            "Last {} hours ({} days) - filtered for token: {}",
            hours_back, days, mint
        ),
        None => format!("Last {} hours ({} days)", hours_back, days),
    }
}
