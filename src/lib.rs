//! A library for detecting anomalous activity on Solana addresses
//!
//! This crate turns free-text questions about Solana addresses, tokens and
//! transactions into a structured forensic analysis: it interprets the
//! query, retrieves on-chain history and entity metadata, runs heuristic
//! pattern detection, investigates flagged counterparties, and synthesizes
//! a narrative answer.

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod constants;
pub mod errors;
pub mod interpreter;
pub mod models;
pub mod providers;
pub mod workflow;

use anyhow::Result;

use crate::config::Config;
use crate::providers::{CompletionClient, HeliusClient, SolscanClient};
use crate::workflow::Pipeline;

/// Main entry point for analyzing a free-text query.
///
/// Wires the HTTP providers from the given config and runs the query
/// through the full pipeline. Always returns text: pipeline failures come
/// back as a formatted error message rather than an `Err`.
pub async fn analyze_query(query: &str, config: &Config) -> Result<String> {
    analyze_query_with_window(query, config, None).await
}

/// Like [`analyze_query`], with an explicit look-back window in hours that
/// overrides whatever the query interpreter extracts.
pub async fn analyze_query_with_window(
    query: &str,
    config: &Config,
    hours_back: Option<u64>,
) -> Result<String> {
    let transactions = HeliusClient::new(config);
    let entities = SolscanClient::new(config);
    let completion = CompletionClient::new(config);

    let pipeline =
        Pipeline::new(transactions, entities, completion).with_hours_override(hours_back);
    let state = pipeline.run(query).await;

    Ok(state.analysis)
}

/// Version of the anomaly analyzer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
