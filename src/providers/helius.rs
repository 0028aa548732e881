//! Enhanced-transaction provider adapter.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::models::transaction::Transaction;

use super::TransactionProvider;

/// HTTP client for the enhanced-transaction API.
pub struct HeliusClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SignatureBatch<'a> {
    transactions: &'a [String],
}

impl HeliusClient {
    /// Create a new client from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.helius_base_url.clone(),
            api_key: config.helius_api_key.clone(),
        }
    }

    /// Fetch one page of transactions for an address, newest-first,
    /// optionally continuing backward from `before`.
    async fn fetch_page(
        &self,
        address: &str,
        before: Option<&str>,
    ) -> AnalyzerResult<Vec<Transaction>> {
        let mut url = format!(
            "{}/v0/addresses/{}/transactions?api-key={}",
            self.base_url, address, self.api_key
        );
        if let Some(sig) = before {
            url.push_str("&before=");
            url.push_str(sig);
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalyzerError::Retrieval(e.to_string()))?
            .error_for_status()
            .map_err(|e| AnalyzerError::Retrieval(e.to_string()))?;

        response
            .json::<Vec<Transaction>>()
            .await
            .map_err(|e| AnalyzerError::Retrieval(e.to_string()))
    }

    /// Paginate backward from the most recent transaction, keeping
    /// everything newer than the cutoff. Stops at the first transaction
    /// that falls out of range; pages are never reordered.
    async fn fetch_window(&self, address: &str, hours_back: u64) -> AnalyzerResult<Vec<Transaction>> {
        let cutoff = Utc::now().timestamp() - (hours_back as i64) * 3600;

        let mut accumulated = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let page = self.fetch_page(address, before.as_deref()).await?;
            if page.is_empty() {
                break;
            }

            let (next_before, out_of_range) = scan_page(page, cutoff, &mut accumulated);

            if out_of_range {
                break;
            }
            match next_before {
                Some(sig) => before = Some(sig),
                None => break,
            }
        }

        log::debug!(
            "Fetched {} transactions for {} within {}h window",
            accumulated.len(),
            address,
            hours_back
        );
        Ok(accumulated)
    }
}

/// Consume one newest-first page of the backward scan. Records at or
/// after the cutoff are accumulated, timestampless records are skipped,
/// and the first older record stops the scan. Returns the cursor for the
/// next page (the page's last signature, captured before the scan
/// consumes it) and whether the cutoff was crossed.
fn scan_page(
    page: Vec<Transaction>,
    cutoff: i64,
    accumulated: &mut Vec<Transaction>,
) -> (Option<String>, bool) {
    let next_before = page.last().map(|tx| tx.signature.clone());
    let mut out_of_range = false;

    for tx in page {
        match tx.timestamp {
            // Timestampless records cannot be placed in the window
            None => continue,
            Some(ts) if ts >= cutoff => accumulated.push(tx),
            Some(_) => {
                out_of_range = true;
                break;
            }
        }
    }

    (next_before, out_of_range)
}

#[async_trait]
impl TransactionProvider for HeliusClient {
    async fn fetch_by_signatures(&self, signatures: &[String]) -> AnalyzerResult<Vec<Transaction>> {
        let url = format!("{}/v0/transactions?api-key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&SignatureBatch { transactions: signatures })
            .send()
            .await
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))?;

        response
            .json::<Vec<Transaction>>()
            .await
            .map_err(|e| AnalyzerError::Lookup(e.to_string()))
    }

    async fn fetch_by_address(
        &self,
        address: &str,
        hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>> {
        match hours_back {
            Some(hours) => self.fetch_window(address, hours).await,
            None => self.fetch_page(address, None).await,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(sig: &str, timestamp: Option<i64>) -> Transaction {
        Transaction {
            signature: sig.to_string(),
            timestamp,
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_page_keeps_in_range_and_advances_cursor() {
        let mut accumulated = Vec::new();
        let page = vec![tx("a", Some(1000)), tx("b", Some(900)), tx("c", Some(800))];

        let (cursor, out_of_range) = scan_page(page, 500, &mut accumulated);

        assert!(!out_of_range);
        assert_eq!(cursor.as_deref(), Some("c"));
        assert_eq!(accumulated.len(), 3);
    }

    #[test]
    fn test_scan_page_stops_at_first_record_past_cutoff() {
        let mut accumulated = Vec::new();
        // The third record is back in range; it must not survive the stop
        let page = vec![tx("a", Some(1000)), tx("b", Some(400)), tx("c", Some(999))];

        let (_, out_of_range) = scan_page(page, 500, &mut accumulated);

        assert!(out_of_range);
        assert_eq!(accumulated.len(), 1);
        assert_eq!(accumulated[0].signature, "a");
    }

    #[test]
    fn test_scan_page_skips_timestampless_records() {
        let mut accumulated = Vec::new();
        let page = vec![tx("a", Some(1000)), tx("b", None), tx("c", Some(600))];

        let (cursor, out_of_range) = scan_page(page, 500, &mut accumulated);

        assert!(!out_of_range);
        assert_eq!(cursor.as_deref(), Some("c"));
        let kept: Vec<&str> = accumulated.iter().map(|t| t.signature.as_str()).collect();
        assert_eq!(kept, ["a", "c"]);
    }

    #[test]
    fn test_scan_page_boundary_timestamp_is_in_range() {
        let mut accumulated = Vec::new();
        let page = vec![tx("a", Some(500))];

        let (_, out_of_range) = scan_page(page, 500, &mut accumulated);

        assert!(!out_of_range);
        assert_eq!(accumulated.len(), 1);
    }
}
