//! Stage implementations for the analysis pipeline.

use std::collections::BTreeMap;

use serde_json::json;

use crate::analyzer::{
    categorize_primary, classify_counterparty, detect_suspicious_patterns, estimate_bot_likelihood,
};
use crate::constants::prompts::ANALYST_PROMPT;
use crate::constants::{
    DEFAULT_HOURS_BACK, MAX_DEEP_DIVE_ADDRESSES, MAX_PROMPT_TRANSACTIONS, TOKEN_HISTORY_HOURS,
};
use crate::errors::AnalyzerError;
use crate::interpreter::{self, QueryType};
use crate::models::entity::EntityMetadata;
use crate::models::report::{
    describe_time_range, ActivityFlags, AddressFrequency, DataReport, EntityInfo, PatternSection,
    SampleTransaction, SuspiciousProfile, TopSuspicious, TransactionSummary,
};
use crate::models::transaction::Transaction;
use crate::providers::{CompletionService, EntityProvider, TransactionProvider};

use super::{Pipeline, StageOutcome, WorkflowState};

impl<T, E, C> Pipeline<T, E, C>
where
    T: TransactionProvider,
    E: EntityProvider,
    C: CompletionService,
{
    /// Stage 1: interpret the user query into structured intent.
    pub(super) async fn parse_query(&self, state: &mut WorkflowState) -> StageOutcome {
        log::info!("[parse_query] Analyzing user query");

        match interpreter::interpret(&self.completion, &state.user_query).await {
            Ok(parsed) => {
                state.extracted_addresses = parsed.addresses;
                state.extracted_tokens = parsed.token_mint.iter().cloned().collect();
                state.transaction_signatures = parsed.signatures;
                state.query_type = Some(parsed.query_type);
                state.hours_back = self.hours_override.or(parsed.hours_back);
                state.specific_token = parsed.token_mint;
                state.intent = parsed.intent;
                StageOutcome::Continue
            }
            Err(e) => {
                log::error!("[parse_query] {}", e);
                state.query_type = Some(QueryType::General);
                StageOutcome::Fail("Failed to parse query".to_string())
            }
        }
    }

    /// Stage 2: retrieve transactions and entity metadata, run the
    /// pattern detector and assemble the structured report.
    pub(super) async fn fetch_data(&self, state: &mut WorkflowState) -> StageOutcome {
        log::info!("[fetch_data] Gathering data");

        // Explicit signatures resolve directly; address-based retrieval
        // is skipped entirely.
        if let Some(signature) = state.transaction_signatures.first().cloned() {
            log::info!("[fetch_data] Looking up transaction by signature");
            match self
                .transactions
                .fetch_by_signatures(std::slice::from_ref(&signature))
                .await
            {
                Ok(transactions) => {
                    state.transactions = transactions;
                    return StageOutcome::Continue;
                }
                Err(e) => return StageOutcome::Fail(format!("Data fetch failed: {}", e)),
            }
        }

        let address = match state.extracted_addresses.first().cloned() {
            Some(address) => address,
            None => {
                return StageOutcome::Fail(
                    "No addresses or transaction signatures found in query".to_string(),
                )
            }
        };

        let specific_token = state
            .specific_token
            .clone()
            .or_else(|| state.extracted_tokens.first().cloned());
        let default_hours = if specific_token.is_some() {
            TOKEN_HISTORY_HOURS
        } else {
            DEFAULT_HOURS_BACK
        };
        let hours_back = state.hours_back.unwrap_or(default_hours);
        state.hours_back = Some(hours_back);
        state.specific_token = specific_token.clone();

        // Entity resolution via two independent lookups
        let search = match self.entities.search(&address).await {
            Ok(lookup) => lookup,
            Err(e) => return StageOutcome::Fail(format!("Failed to search address: {}", e)),
        };
        let account = match self.entities.account_info(&address).await {
            Ok(lookup) => lookup,
            Err(e) => return StageOutcome::Fail(format!("Failed to fetch account info: {}", e)),
        };

        let merged = EntityMetadata::merge(&address, &search, &account);
        let category = categorize_primary(&merged);
        log::info!(
            "[fetch_data] Entity: {} | type {} | category {}",
            merged.account_label.as_deref().unwrap_or("Unknown"),
            merged.entity_type,
            category
        );

        let transactions = if let Some(mint) = &specific_token {
            log::info!(
                "[fetch_data] Fetching token transactions ({}h window)",
                hours_back
            );
            match self
                .transactions
                .fetch_token_transactions(&address, mint, Some(hours_back))
                .await
            {
                Ok(txs) => txs,
                Err(e) => {
                    return StageOutcome::Fail(format!("Failed to fetch token transactions: {}", e))
                }
            }
        } else {
            log::info!("[fetch_data] Fetching transactions (last {}h)", hours_back);
            match self
                .transactions
                .fetch_by_address(&address, Some(hours_back))
                .await
            {
                Ok(txs) => txs,
                Err(e) => return StageOutcome::Fail(format!("Failed to fetch transactions: {}", e)),
            }
        };
        log::info!("[fetch_data] Found {} transactions", transactions.len());

        // Canonical metadata re-fetch for the report; semantically the
        // same data as above, idempotent
        let account_info = match self.entities.account_info(&address).await {
            Ok(lookup) => lookup,
            Err(e) => return StageOutcome::Fail(format!("Failed to fetch account info: {}", e)),
        };

        let (frequency, type_counts) = counterparty_frequencies(&transactions);
        let mut top_addresses: Vec<AddressFrequency> = frequency
            .iter()
            .map(|(address, count)| AddressFrequency {
                address: address.clone(),
                transaction_count: *count,
            })
            .collect();
        top_addresses.sort_by(|a, b| b.transaction_count.cmp(&a.transaction_count));
        top_addresses.truncate(10);

        let pattern_analysis = detect_suspicious_patterns(&transactions, &address);
        log::info!(
            "[fetch_data] Pattern detection: {} suspicious of {} unique counterparties",
            pattern_analysis.total_suspicious,
            pattern_analysis.total_unique_addresses
        );

        let report = DataReport {
            entity_info: EntityInfo::from_metadata(&merged, category, specific_token.as_deref()),
            total_transactions: transactions.len(),
            time_range: describe_time_range(hours_back, specific_token.as_deref()),
            unique_addresses: frequency.len(),
            known_transaction_types: type_counts,
            top_addresses_by_frequency: top_addresses,
            sample_transactions: transactions
                .iter()
                .filter(|tx| tx.type_or_unknown() != "UNKNOWN")
                .take(10)
                .map(SampleTransaction::from_transaction)
                .collect(),
            suspicious_pattern_detection: PatternSection {
                total_unique_counterparties: pattern_analysis.total_unique_addresses,
                suspicious_count: pattern_analysis.total_suspicious,
                top_suspicious: pattern_analysis
                    .suspicious_addresses
                    .iter()
                    .take(5)
                    .map(|s| TopSuspicious {
                        address: s.address.clone(),
                        reason: s.reason.clone(),
                        tx_count: s.transaction_count,
                    })
                    .collect(),
            },
        };

        state.transactions = transactions;
        state.account_info = Some(account_info);
        state.suspicious_addresses = pattern_analysis.suspicious_addresses;
        state.data_report = Some(report);
        StageOutcome::Continue
    }

    /// Stage 3: recursively classify the top suspicious addresses. Only
    /// runs for abnormality-detection queries after a successful data
    /// fetch; per-address failures are logged and skipped, never
    /// terminal.
    pub(super) async fn deep_dive(&self, state: &mut WorkflowState) -> StageOutcome {
        if state.query_type != Some(QueryType::AbnormalityDetection) || state.data_report.is_none()
        {
            log::info!("[deep_dive] Skipping (not abnormality detection or no data)");
            return StageOutcome::Continue;
        }
        if state.suspicious_addresses.is_empty() {
            log::info!("[deep_dive] No suspicious addresses to investigate");
            return StageOutcome::Continue;
        }

        let hours_back = state.hours_back.unwrap_or(DEFAULT_HOURS_BACK);
        let top: Vec<_> = state
            .suspicious_addresses
            .iter()
            .take(MAX_DEEP_DIVE_ADDRESSES)
            .cloned()
            .collect();
        log::info!("[deep_dive] Investigating {} suspicious addresses", top.len());

        let mut profiles = Vec::new();

        for suspicious in top {
            let address = &suspicious.address;

            // A failed search still leaves the account-info path
            let search = match self.entities.search(address).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    log::debug!("[deep_dive] Search failed for {}: {}", address, e);
                    Default::default()
                }
            };
            let account = match self.entities.account_info(address).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    log::warn!("[deep_dive] Account info failed for {}: {}", address, e);
                    continue;
                }
            };

            let merged = EntityMetadata::merge(address, &search, &account);
            if merged.is_pda() {
                log::info!(
                    "[deep_dive] {} is a PDA (isOnCurve: false), skipping",
                    address
                );
                continue;
            }

            let transactions = match self
                .transactions
                .fetch_by_address(address, Some(hours_back))
                .await
            {
                Ok(txs) => txs,
                Err(e) => {
                    log::warn!("[deep_dive] Transaction fetch failed for {}: {}", address, e);
                    continue;
                }
            };
            log::info!(
                "[deep_dive] {} has {} transactions of its own",
                address,
                transactions.len()
            );

            let (counterparties, tokens, total_volume) =
                crate::analyzer::patterns::aggregate_activity(&transactions, address);
            let (classification, is_benign) = classify_counterparty(&merged);
            let likelihood =
                estimate_bot_likelihood(is_benign, transactions.len(), counterparties);

            profiles.push(SuspiciousProfile {
                address: address.clone(),
                original_reason: suspicious.reason.clone(),
                is_on_curve: merged.is_on_curve,
                is_pda: false,
                entity_type: merged.entity_type.clone(),
                account_type: merged.account_type.clone(),
                account_label: merged.account_label.clone(),
                account_tags: merged.account_tags.clone(),
                classification: classification.to_string(),
                is_benign,
                transaction_count: transactions.len(),
                unique_counterparties: counterparties,
                unique_tokens: tokens,
                total_volume,
                activities: ActivityFlags {
                    is_multi_pool_trader: counterparties > 3,
                    is_high_frequency: transactions.len() > 50,
                    trades_multiple_tokens: tokens > 2,
                    estimated_bot_likelihood: likelihood,
                },
                sample_transactions: transactions
                    .iter()
                    .take(3)
                    .map(SampleTransaction::from_transaction)
                    .collect(),
            });
        }

        log::info!("[deep_dive] Complete: {} profiles", profiles.len());
        state.suspicious_profiles = profiles;
        StageOutcome::Continue
    }

    /// Stage 4: assemble the narrative prompt from the structured
    /// findings and pass the completion through. No numeric computation
    /// happens here beyond what upstream stages already produced.
    pub(super) async fn analyze_data(&self, state: &mut WorkflowState) -> StageOutcome {
        log::info!("[analyze_data] Synthesizing narrative");

        let user_prompt = build_analysis_prompt(state);
        match self.completion.complete(ANALYST_PROMPT, &user_prompt).await {
            Ok(analysis) => {
                state.analysis = analysis;
                StageOutcome::Continue
            }
            Err(e) => {
                log::error!("[analyze_data] {}", e);
                StageOutcome::Fail(AnalyzerError::Analysis(e.to_string()).to_string())
            }
        }
    }

    /// Stage 5: shape the final output. The only stage allowed to read
    /// the terminal error.
    pub(super) fn format_response(&self, state: &mut WorkflowState) {
        log::info!("[format_response] Formatting final output");

        if let Some(error) = &state.error {
            state.analysis = format!(
                "Error: {}\n\nPlease check your query and try again.",
                error
            );
        } else if state.analysis.is_empty() {
            state.analysis = "No analysis available".to_string();
        }
    }
}

/// Per-address appearance counts over all token transfers (the focal
/// address included), plus the known transaction-type histogram.
fn counterparty_frequencies(
    transactions: &[Transaction],
) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut frequency = BTreeMap::new();
    let mut type_counts = BTreeMap::new();

    for tx in transactions {
        let tx_type = tx.type_or_unknown();
        if tx_type != "UNKNOWN" {
            *type_counts.entry(tx_type.to_string()).or_insert(0) += 1;
        }
        for transfer in &tx.token_transfers {
            for side in [&transfer.from_user_account, &transfer.to_user_account] {
                if let Some(addr) = side {
                    *frequency.entry(addr.clone()).or_insert(0) += 1;
                }
            }
        }
    }

    (frequency, type_counts)
}

/// Serialize the structured findings into the analysis prompt. This is
/// the only place report objects are rendered to text.
fn build_analysis_prompt(state: &WorkflowState) -> String {
    let summary = TransactionSummary::from_transactions(&state.transactions);

    let entity_info = state
        .data_report
        .as_ref()
        .and_then(|r| serde_json::to_string_pretty(&r.entity_info).ok())
        .unwrap_or_else(|| "{}".to_string());
    let report_json = state
        .data_report
        .as_ref()
        .and_then(|r| serde_json::to_string_pretty(r).ok())
        .unwrap_or_else(|| "{}".to_string());
    let summary_json =
        serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string());

    let deep_dive_section = if state.suspicious_profiles.is_empty() {
        String::new()
    } else {
        let profiles = serde_json::to_string_pretty(&state.suspicious_profiles)
            .unwrap_or_else(|_| "[]".to_string());
        format!(
            "\n## RECURSIVE ANALYSIS OF SUSPICIOUS ADDRESSES (PDAs already filtered out)\n\n\
             {}\n\n\
             This shows the full activity of each suspicious address across all pools and tokens.\n\
             All addresses here have isOnCurve: true or an undetermined isOnCurve status.\n",
            profiles
        )
    };

    let full_transactions: Vec<serde_json::Value> = state
        .transactions
        .iter()
        .take(MAX_PROMPT_TRANSACTIONS)
        .map(|tx| {
            json!({
                "signature": tx.signature,
                "type": tx.type_or_unknown(),
                "timestamp": tx.timestamp,
                "tokenTransfers": tx.token_transfers.iter().map(|t| json!({
                    "from": t.from_user_account,
                    "to": t.to_user_account,
                    "mint": t.mint,
                    "amount": t.token_amount,
                })).collect::<Vec<_>>(),
                "nativeTransfers": tx.native_transfers.len(),
            })
        })
        .collect();
    let full_transactions_json =
        serde_json::to_string_pretty(&full_transactions).unwrap_or_else(|_| "[]".to_string());

    let time_range = state
        .hours_back
        .map(|h| format!("Last {} hours", h))
        .unwrap_or_else(|| "Last 10 hours".to_string());

    format!(
        "Entity Info: {entity_info}\n\n\
         Total Transactions: {total}\n\
         Time Range: {time_range}\n\n\
         ## TRANSACTION DATA FOR ANALYSIS\n\n\
         Summary:\n{summary_json}\n\n\
         Initial Pattern Detection:\n{report_json}\n\
         {deep_dive_section}\n\
         ## FULL TRANSACTION DETAILS\n\n\
         Here are the transactions with complete tokenTransfers data for your analysis:\n\
         {full_transactions_json}\n\n\
         User Query: {query}",
        entity_info = entity_info,
        total = state.transactions.len(),
        time_range = time_range,
        summary_json = summary_json,
        report_json = report_json,
        deep_dive_section = deep_dive_section,
        full_transactions_json = full_transactions_json,
        query = state.user_query,
    )
}
