//! External data providers for the analysis pipeline.
//!
//! All I/O goes through the three traits below, so the workflow can be
//! exercised against in-memory implementations. The concrete adapters are
//! thin HTTP wrappers with no business logic.

pub mod completion;
pub mod helius;
pub mod solscan;

use async_trait::async_trait;

use crate::errors::AnalyzerResult;
use crate::models::entity::EntityLookup;
use crate::models::transaction::Transaction;

pub use self::completion::CompletionClient;
pub use self::helius::HeliusClient;
pub use self::solscan::SolscanClient;

/// Transaction-history provider.
///
/// Transactions are returned newest-first. Failures propagate as errors
/// rather than partial silent results.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Resolve transactions directly by signature.
    async fn fetch_by_signatures(&self, signatures: &[String]) -> AnalyzerResult<Vec<Transaction>>;

    /// Fetch transactions for an address. With `hours_back` set, the
    /// adapter paginates backward until the first transaction older than
    /// the cutoff.
    async fn fetch_by_address(
        &self,
        address: &str,
        hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>>;

    /// Fetch the address's transactions touching one token mint.
    async fn fetch_token_transactions(
        &self,
        address: &str,
        mint: &str,
        hours_back: Option<u64>,
    ) -> AnalyzerResult<Vec<Transaction>>;
}

/// Entity-metadata provider. Two independent call paths return partially
/// overlapping metadata; the models layer merges them.
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// Search-style lookup for an address.
    async fn search(&self, address: &str) -> AnalyzerResult<EntityLookup>;

    /// Direct account-info lookup for an address.
    async fn account_info(&self, address: &str) -> AnalyzerResult<EntityLookup>;
}

/// Black-box text completion service: prompt in, text out. Responses are
/// non-deterministic; callers tolerate malformed structured output.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> AnalyzerResult<String>;
}
