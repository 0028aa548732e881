//! Pipeline orchestration tests against in-memory providers.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use crate::constants::prompts::QUERY_PARSER_PROMPT;
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::models::entity::EntityLookup;
use crate::models::transaction::{TokenTransfer, Transaction};
use crate::providers::{CompletionService, EntityProvider, TransactionProvider};

use super::Pipeline;

const FOCAL: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
const WASHER: &str = "So11111111111111111111111111111111111111112";
const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

struct MockCompletion {
    parse_response: String,
    analysis_response: String,
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, system_prompt: &str, _user_prompt: &str) -> AnalyzerResult<String> {
        if system_prompt == QUERY_PARSER_PROMPT {
            Ok(self.parse_response.clone())
        } else {
            Ok(self.analysis_response.clone())
        }
    }
}

#[derive(Default)]
struct MockTransactions {
    by_address: HashMap<String, Vec<Transaction>>,
    by_signature: Vec<Transaction>,
    fail_address_fetch: bool,
}

#[async_trait]
impl TransactionProvider for MockTransactions {
    async fn fetch_by_signatures(&self, _signatures: &[String]) -> AnalyzerResult<Vec<Transaction>> {
        Ok(self.by_signature.clone())
    }

    async fn fetch_by_address(
        &self,
        address: &str,
        _hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>> {
        if self.fail_address_fetch {
            return Err(AnalyzerError::Retrieval("address fetch disabled".to_string()));
        }
        Ok(self.by_address.get(address).cloned().unwrap_or_default())
    }

    async fn fetch_token_transactions(
        &self,
        address: &str,
        mint: &str,
        hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>> {
        let all = self.fetch_by_address(address, hours_back).await?;
        Ok(all.into_iter().filter(|tx| tx.touches_mint(mint)).collect())
    }
}

#[derive(Default)]
struct MockEntities {
    /// Per-address (search, account-info) lookup pairs. Missing entries
    /// resolve to empty metadata rather than errors.
    lookups: HashMap<String, (EntityLookup, EntityLookup)>,
    /// Addresses whose account-info lookup fails.
    fail_account_info: Vec<String>,
}

#[async_trait]
impl EntityProvider for MockEntities {
    async fn search(&self, address: &str) -> AnalyzerResult<EntityLookup> {
        Ok(self
            .lookups
            .get(address)
            .map(|(search, _)| search.clone())
            .unwrap_or_default())
    }

    async fn account_info(&self, address: &str) -> AnalyzerResult<EntityLookup> {
        if self.fail_account_info.iter().any(|a| a == address) {
            return Err(AnalyzerError::Lookup("metadata unavailable".to_string()));
        }
        Ok(self
            .lookups
            .get(address)
            .map(|(_, account)| account.clone())
            .unwrap_or_default())
    }
}

fn parse_response(addresses: &[&str], signatures: &[&str], query_type: &str) -> String {
    json!({
        "addresses": addresses,
        "transactionSignatures": signatures,
        "queryType": query_type,
        "timeParameters": { "hoursBack": 10 },
        "tokenMint": null,
        "intent": "test intent"
    })
    .to_string()
}

fn transfer_tx(sig: &str, timestamp: i64, from: &str, to: &str) -> Transaction {
    Transaction {
        signature: sig.to_string(),
        timestamp: Some(timestamp),
        tx_type: Some("SWAP".to_string()),
        token_transfers: vec![TokenTransfer {
            mint: MINT.to_string(),
            from_user_account: Some(from.to_string()),
            to_user_account: Some(to.to_string()),
            token_amount: Some(5.0),
        }],
        native_transfers: vec![],
    }
}

/// Three buys and three sells between the focal address and one
/// counterparty, with irregular timing.
fn wash_trades(counterparty: &str, sig_prefix: &str) -> Vec<Transaction> {
    let timestamps = [1_700_000_000, 1_700_000_017, 1_700_000_900, 1_700_003_001, 1_700_004_444, 1_700_010_000];
    timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            if i % 2 == 0 {
                transfer_tx(&format!("{}{}", sig_prefix, i), ts, counterparty, FOCAL)
            } else {
                transfer_tx(&format!("{}{}", sig_prefix, i), ts, FOCAL, counterparty)
            }
        })
        .collect()
}

fn wash_trading_set() -> Vec<Transaction> {
    wash_trades(WASHER, "sig")
}

fn on_curve_wallet() -> (EntityLookup, EntityLookup) {
    (
        EntityLookup::default(),
        EntityLookup {
            is_on_curve: Some(true),
            entity_type: Some("UNKNOWN".to_string()),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn signature_query_skips_address_retrieval() {
    let transactions = MockTransactions {
        by_signature: vec![transfer_tx("sig0", 1_700_000_000, WASHER, FOCAL)],
        // Any address-based retrieval would surface as a pipeline error.
        fail_address_fetch: true,
        ..Default::default()
    };
    let completion = MockCompletion {
        parse_response: parse_response(&[], &["3".repeat(88).as_str()], "transaction_lookup"),
        analysis_response: "Signature narrative".to_string(),
    };

    let pipeline = Pipeline::new(transactions, MockEntities::default(), completion);
    let state = pipeline.run("what happened in this transaction?").await;

    assert!(state.error.is_none());
    assert_eq!(state.transactions.len(), 1);
    assert!(state.data_report.is_none());
    assert_eq!(state.analysis, "Signature narrative");
}

#[tokio::test]
async fn query_without_identifiers_is_an_error() {
    let completion = MockCompletion {
        parse_response: parse_response(&[], &[], "general"),
        analysis_response: "unreached".to_string(),
    };

    let pipeline = Pipeline::new(MockTransactions::default(), MockEntities::default(), completion);
    let state = pipeline.run("tell me about solana").await;

    assert_eq!(
        state.error.as_deref(),
        Some("No addresses or transaction signatures found in query")
    );
    assert_eq!(
        state.analysis,
        "Error: No addresses or transaction signatures found in query\n\nPlease check your query and try again."
    );
}

#[tokio::test]
async fn unparseable_interpreter_output_fails_gracefully() {
    let completion = MockCompletion {
        parse_response: "I could not find any addresses, sorry!".to_string(),
        analysis_response: "unreached".to_string(),
    };

    let pipeline = Pipeline::new(MockTransactions::default(), MockEntities::default(), completion);
    let state = pipeline.run("???").await;

    assert_eq!(state.error.as_deref(), Some("Failed to parse query"));
    assert!(state.analysis.starts_with("Error: Failed to parse query"));
}

#[tokio::test]
async fn wash_trader_is_flagged_and_profiled() {
    let mut by_address = HashMap::new();
    by_address.insert(FOCAL.to_string(), wash_trading_set());
    // The counterparty's own history, fetched during the deep dive.
    by_address.insert(
        WASHER.to_string(),
        vec![transfer_tx("own0", 1_700_000_100, WASHER, FOCAL)],
    );

    let mut lookups = HashMap::new();
    lookups.insert(FOCAL.to_string(), on_curve_wallet());
    lookups.insert(WASHER.to_string(), on_curve_wallet());

    let completion = MockCompletion {
        parse_response: parse_response(&[FOCAL], &[], "abnormality_detection"),
        analysis_response: "Wash trading narrative".to_string(),
    };

    let pipeline = Pipeline::new(
        MockTransactions { by_address, ..Default::default() },
        MockEntities { lookups, ..Default::default() },
        completion,
    );
    let state = pipeline.run("any suspicious activity on this wallet?").await;

    assert!(state.error.is_none());
    let report = state.data_report.as_ref().unwrap();
    assert_eq!(report.total_transactions, 6);
    assert_eq!(report.suspicious_pattern_detection.suspicious_count, 1);

    assert_eq!(state.suspicious_addresses.len(), 1);
    assert_eq!(state.suspicious_addresses[0].address, WASHER);
    assert!(state.suspicious_addresses[0].reason.contains("Wash trading"));

    assert_eq!(state.suspicious_profiles.len(), 1);
    let profile = &state.suspicious_profiles[0];
    assert_eq!(profile.address, WASHER);
    assert!(!profile.is_pda);
    assert_eq!(profile.transaction_count, 1);
    assert!(profile.original_reason.contains("Wash trading"));

    assert_eq!(state.analysis, "Wash trading narrative");
}

#[tokio::test]
async fn pda_counterparties_are_never_profiled() {
    let mut by_address = HashMap::new();
    by_address.insert(FOCAL.to_string(), wash_trading_set());

    let mut lookups = HashMap::new();
    lookups.insert(FOCAL.to_string(), on_curve_wallet());
    lookups.insert(
        WASHER.to_string(),
        (
            EntityLookup::default(),
            EntityLookup { is_on_curve: Some(false), ..Default::default() },
        ),
    );

    let completion = MockCompletion {
        parse_response: parse_response(&[FOCAL], &[], "abnormality_detection"),
        analysis_response: "narrative".to_string(),
    };

    let pipeline = Pipeline::new(
        MockTransactions { by_address, ..Default::default() },
        MockEntities { lookups, ..Default::default() },
        completion,
    );
    let state = pipeline.run("any suspicious activity?").await;

    assert!(state.error.is_none());
    // Flagged by the detector, excluded from profiling as a PDA.
    assert_eq!(state.suspicious_addresses.len(), 1);
    assert!(state.suspicious_profiles.is_empty());
}

#[tokio::test]
async fn deep_dive_isolates_per_address_lookup_failures() {
    // Two wash-trading counterparties; metadata lookup fails for the
    // first one. The failure must not become terminal and must not stop
    // the second counterparty from being profiled.
    const SECOND: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    let mut focal_history = wash_trades(WASHER, "a");
    focal_history.extend(wash_trades(SECOND, "b"));

    let mut by_address = HashMap::new();
    by_address.insert(FOCAL.to_string(), focal_history);
    by_address.insert(
        SECOND.to_string(),
        vec![transfer_tx("own1", 1_700_000_200, SECOND, FOCAL)],
    );

    let mut lookups = HashMap::new();
    lookups.insert(FOCAL.to_string(), on_curve_wallet());
    lookups.insert(SECOND.to_string(), on_curve_wallet());

    let completion = MockCompletion {
        parse_response: parse_response(&[FOCAL], &[], "abnormality_detection"),
        analysis_response: "narrative despite partial data".to_string(),
    };

    let pipeline = Pipeline::new(
        MockTransactions { by_address, ..Default::default() },
        MockEntities {
            lookups,
            fail_account_info: vec![WASHER.to_string()],
        },
        completion,
    );
    let state = pipeline.run("any suspicious activity?").await;

    assert!(state.error.is_none());
    assert_eq!(state.suspicious_addresses.len(), 2);
    assert_eq!(state.suspicious_profiles.len(), 1);
    assert_eq!(state.suspicious_profiles[0].address, SECOND);
    assert_eq!(state.analysis, "narrative despite partial data");
}

#[tokio::test]
async fn deep_dive_only_runs_for_abnormality_queries() {
    let mut by_address = HashMap::new();
    by_address.insert(FOCAL.to_string(), wash_trading_set());

    let mut lookups = HashMap::new();
    lookups.insert(FOCAL.to_string(), on_curve_wallet());
    lookups.insert(WASHER.to_string(), on_curve_wallet());

    let completion = MockCompletion {
        parse_response: parse_response(&[FOCAL], &[], "wallet_analysis"),
        analysis_response: "narrative".to_string(),
    };

    let pipeline = Pipeline::new(
        MockTransactions { by_address, ..Default::default() },
        MockEntities { lookups, ..Default::default() },
        completion,
    );
    let state = pipeline.run("what does this wallet do?").await;

    assert!(state.error.is_none());
    assert!(!state.suspicious_addresses.is_empty());
    assert!(state.suspicious_profiles.is_empty());
}

#[tokio::test]
async fn hours_override_beats_interpreted_window() {
    let mut by_address = HashMap::new();
    by_address.insert(FOCAL.to_string(), wash_trading_set());

    let mut lookups = HashMap::new();
    lookups.insert(FOCAL.to_string(), on_curve_wallet());
    lookups.insert(WASHER.to_string(), on_curve_wallet());

    let completion = MockCompletion {
        parse_response: parse_response(&[FOCAL], &[], "wallet_analysis"),
        analysis_response: "narrative".to_string(),
    };

    let pipeline = Pipeline::new(
        MockTransactions { by_address, ..Default::default() },
        MockEntities { lookups, ..Default::default() },
        completion,
    )
    .with_hours_override(Some(48));
    let state = pipeline.run("recent activity").await;

    assert!(state.error.is_none());
    assert_eq!(state.hours_back, Some(48));
    let report = state.data_report.as_ref().unwrap();
    assert!(report.time_range.contains("48 hours"));
}
