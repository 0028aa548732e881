//! Workflow state for one analysis run.
//!
//! Owned exclusively by the orchestrator; never shared across concurrent
//! runs. Enrichment lives in named fields rather than a stringly-typed
//! metadata bag.

use crate::interpreter::QueryType;
use crate::models::entity::EntityLookup;
use crate::models::report::{DataReport, SuspiciousAddressRecord, SuspiciousProfile};
use crate::models::transaction::Transaction;

/// Progressively-enriched state of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    /// The original query; immutable once set.
    pub user_query: String,
    /// Extracted addresses; the first element is the primary subject.
    pub extracted_addresses: Vec<String>,
    /// Extracted token mints.
    pub extracted_tokens: Vec<String>,
    /// Extracted transaction signatures.
    pub transaction_signatures: Vec<String>,
    /// Query intent category.
    pub query_type: Option<QueryType>,
    /// Brief restatement of the user's intent.
    pub intent: Option<String>,
    /// Look-back window in hours; resolved during data retrieval.
    pub hours_back: Option<u64>,
    /// Token mint the run is filtered to, when present.
    pub specific_token: Option<String>,
    /// Retrieved transactions, newest-first as returned by the provider.
    pub transactions: Vec<Transaction>,
    /// Canonical account metadata attached after transaction retrieval.
    pub account_info: Option<EntityLookup>,
    /// Structured report assembled by the retrieval stage.
    pub data_report: Option<DataReport>,
    /// Counterparties flagged by the pattern detector, detection order.
    pub suspicious_addresses: Vec<SuspiciousAddressRecord>,
    /// Deep-dive profiles of investigated suspicious addresses.
    pub suspicious_profiles: Vec<SuspiciousProfile>,
    /// Final narrative; empty until synthesis or error formatting.
    pub analysis: String,
    /// Terminal error. Once set, no further enrichment stage runs; only
    /// the final formatter reads it.
    pub error: Option<String>,
}

impl WorkflowState {
    /// Seed a fresh state with only the user query set.
    pub fn new(user_query: &str) -> Self {
        Self {
            user_query: user_query.to_string(),
            ..Default::default()
        }
    }
}
