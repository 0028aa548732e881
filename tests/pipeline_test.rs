use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tempfile::tempdir;

use solana_anomaly_analyzer::cache::Cache;
use solana_anomaly_analyzer::errors::{AnalyzerError, AnalyzerResult};
use solana_anomaly_analyzer::models::entity::EntityLookup;
use solana_anomaly_analyzer::models::transaction::{TokenTransfer, Transaction};
use solana_anomaly_analyzer::providers::{
    CompletionService, EntityProvider, TransactionProvider,
};
use solana_anomaly_analyzer::workflow::Pipeline;

const WALLET: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
const COUNTERPARTY: &str = "So11111111111111111111111111111111111111112";
const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

struct ScriptedCompletion {
    parse_response: String,
    analysis_response: AnalyzerResult<String>,
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, system_prompt: &str, _user_prompt: &str) -> AnalyzerResult<String> {
        // The interpreter prompt asks for a JSON object; the analyst
        // prompt does not.
        if system_prompt.contains("JSON") {
            Ok(self.parse_response.clone())
        } else {
            match &self.analysis_response {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(AnalyzerError::Completion("service unavailable".to_string())),
            }
        }
    }
}

struct FixedTransactions {
    by_address: HashMap<String, Vec<Transaction>>,
}

#[async_trait]
impl TransactionProvider for FixedTransactions {
    async fn fetch_by_signatures(&self, _signatures: &[String]) -> AnalyzerResult<Vec<Transaction>> {
        Ok(vec![])
    }

    async fn fetch_by_address(
        &self,
        address: &str,
        _hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>> {
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

struct OnCurveEntities;

#[async_trait]
impl EntityProvider for OnCurveEntities {
    async fn search(&self, _address: &str) -> AnalyzerResult<EntityLookup> {
        Ok(EntityLookup::default())
    }

    async fn account_info(&self, _address: &str) -> AnalyzerResult<EntityLookup> {
        Ok(EntityLookup {
            is_on_curve: Some(true),
            ..Default::default()
        })
    }
}

fn swap(sig: &str, timestamp: i64, from: &str, to: &str) -> Transaction {
    Transaction {
        signature: sig.to_string(),
        timestamp: Some(timestamp),
        tx_type: Some("SWAP".to_string()),
        token_transfers: vec![TokenTransfer {
            mint: MINT.to_string(),
            from_user_account: Some(from.to_string()),
            to_user_account: Some(to.to_string()),
            token_amount: Some(12.5),
        }],
        native_transfers: vec![],
    }
}

fn abnormality_parse_response() -> String {
    json!({
        "addresses": [WALLET],
        "transactionSignatures": [],
        "queryType": "abnormality_detection",
        "timeParameters": { "hoursBack": 10 },
        "tokenMint": null,
        "intent": "look for suspicious activity"
    })
    .to_string()
}

fn wallet_history() -> HashMap<String, Vec<Transaction>> {
    // Equal buys and sells against one counterparty, irregular timing.
    let timestamps = [1_700_000_000i64, 1_700_000_031, 1_700_001_200, 1_700_002_000, 1_700_006_500, 1_700_009_001];
    let txs = timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            if i % 2 == 0 {
                swap(&format!("s{}", i), ts, COUNTERPARTY, WALLET)
            } else {
                swap(&format!("s{}", i), ts, WALLET, COUNTERPARTY)
            }
        })
        .collect();

    let mut by_address = HashMap::new();
    by_address.insert(WALLET.to_string(), txs);
    by_address.insert(
        COUNTERPARTY.to_string(),
        vec![swap("own0", 1_700_000_500, COUNTERPARTY, WALLET)],
    );
    by_address
}

#[tokio::test]
async fn full_abnormality_run_produces_a_narrative() {
    let pipeline = Pipeline::new(
        FixedTransactions { by_address: wallet_history() },
        OnCurveEntities,
        ScriptedCompletion {
            parse_response: abnormality_parse_response(),
            analysis_response: Ok("The wallet shows a wash-trading loop.".to_string()),
        },
    );

    let state = pipeline.run("is this wallet doing anything suspicious?").await;

    assert!(state.error.is_none());
    assert_eq!(state.analysis, "The wallet shows a wash-trading loop.");

    let report = state.data_report.expect("report should be built");
    assert_eq!(report.total_transactions, 6);
    assert_eq!(report.suspicious_pattern_detection.suspicious_count, 1);
    assert_eq!(report.time_range, "Last 10 hours (0 days)");

    assert_eq!(state.suspicious_profiles.len(), 1);
    assert_eq!(state.suspicious_profiles[0].address, COUNTERPARTY);
}

#[tokio::test]
async fn completion_outage_becomes_a_formatted_error() {
    let pipeline = Pipeline::new(
        FixedTransactions { by_address: wallet_history() },
        OnCurveEntities,
        ScriptedCompletion {
            parse_response: abnormality_parse_response(),
            analysis_response: Err(AnalyzerError::Completion("down".to_string())),
        },
    );

    let state = pipeline.run("is this wallet doing anything suspicious?").await;

    assert!(state.error.is_some());
    assert!(state.analysis.starts_with("Error: Analysis failed:"));
    assert!(state.analysis.ends_with("Please check your query and try again."));
}

#[test]
fn cache_round_trip_and_clear() {
    let dir = tempdir().unwrap();
    std::env::set_var("HOME", dir.path());

    let lookup = EntityLookup {
        is_on_curve: Some(true),
        account_label: Some("Some DEX".to_string()),
        account_tags: vec!["dex".to_string()],
        ..Default::default()
    };

    Cache::save("search", WALLET, &lookup).unwrap();
    let cached = Cache::get("search", WALLET).unwrap().expect("saved lookup");
    assert_eq!(cached.account_label.as_deref(), Some("Some DEX"));
    assert_eq!(cached.account_tags, vec!["dex".to_string()]);

    assert!(Cache::get("account", WALLET).unwrap().is_none());

    Cache::clear(WALLET).unwrap();
    assert!(Cache::get("search", WALLET).unwrap().is_none());

    Cache::save("account", WALLET, &lookup).unwrap();
    Cache::clear_all().unwrap();
    assert!(Cache::get("account", WALLET).unwrap().is_none());
}
