//! Query interpretation.
//!
//! Maps free-text input to structured intent. The natural-language
//! understanding is delegated to the completion service; this module owns
//! the extraction contract, response cleanup and validation of the
//! identifiers that come back.

use serde::{Deserialize, Serialize};

use crate::constants::prompts::QUERY_PARSER_PROMPT;
use crate::constants::{DEFAULT_HOURS_BACK, TOKEN_HISTORY_HOURS};
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::providers::CompletionService;

/// Intent category of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    AbnormalityDetection,
    WalletAnalysis,
    TransactionLookup,
    General,
}

/// Structured intent extracted from a free-text query.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// Extracted addresses, first element is the primary subject.
    pub addresses: Vec<String>,
    /// Extracted transaction signatures.
    pub signatures: Vec<String>,
    pub query_type: QueryType,
    /// Explicit time window in hours, when the query stated one.
    pub hours_back: Option<u64>,
    /// Token mint the query is about, when mentioned.
    pub token_mint: Option<String>,
    /// Brief description of what the user wants.
    pub intent: Option<String>,
}

impl ParsedQuery {
    /// Time window with defaults applied: one year when a specific token
    /// is referenced, ten hours otherwise.
    pub fn resolved_hours_back(&self) -> u64 {
        self.hours_back.unwrap_or(if self.token_mint.is_some() {
            TOKEN_HISTORY_HOURS
        } else {
            DEFAULT_HOURS_BACK
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParsed {
    #[serde(default)]
    addresses: Vec<String>,
    #[serde(default)]
    transaction_signatures: Vec<String>,
    query_type: Option<QueryType>,
    time_parameters: Option<RawTimeParameters>,
    token_mint: Option<String>,
    intent: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeParameters {
    hours_back: Option<u64>,
}

/// Interpret a free-text query via the completion service.
pub async fn interpret<C: CompletionService>(
    completion: &C,
    query: &str,
) -> AnalyzerResult<ParsedQuery> {
    let response = completion.complete(QUERY_PARSER_PROMPT, query).await?;
    parse_response(&response)
}

/// Parse the completion response into structured intent. The response is
/// expected to contain a single JSON object, possibly wrapped in code
/// fences.
pub fn parse_response(response: &str) -> AnalyzerResult<ParsedQuery> {
    let cleaned = strip_code_fences(response);
    let raw: RawParsed = serde_json::from_str(&cleaned)
        .map_err(|e| AnalyzerError::ParseFailure(e.to_string()))?;

    let parsed = ParsedQuery {
        addresses: raw
            .addresses
            .into_iter()
            .filter(|a| is_plausible_address(a))
            .collect(),
        signatures: raw
            .transaction_signatures
            .into_iter()
            .filter(|s| is_plausible_signature(s))
            .collect(),
        query_type: raw.query_type.unwrap_or(QueryType::General),
        hours_back: raw.time_parameters.and_then(|t| t.hours_back),
        token_mint: raw.token_mint.filter(|m| !m.is_empty() && m != "null"),
        intent: raw.intent,
    };

    log::debug!(
        "Parsed query: {} address(es), {} signature(s), type {:?}",
        parsed.addresses.len(),
        parsed.signatures.len(),
        parsed.query_type
    );
    Ok(parsed)
}

/// Strip markdown code-fence markers from a completion response.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// A base58 string of 32-44 characters that decodes to a 32-byte key.
pub fn is_plausible_address(candidate: &str) -> bool {
    if candidate.len() < 32 || candidate.len() > 44 {
        return false;
    }
    matches!(bs58::decode(candidate).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Transaction signatures are 87-88 character strings.
pub fn is_plausible_signature(candidate: &str) -> bool {
    candidate.len() == 87 || candidate.len() == 88
}
