//! Suspicious-pattern detection over a transaction set.
//!
//! Scans every token transfer around a focal address, accumulates
//! per-counterparty activity and flags counterparties whose behavior
//! matches wash-trading, high-frequency or bot-timing heuristics.

use std::collections::HashMap;

use crate::constants::MAX_SUSPICIOUS_ADDRESSES;
use crate::models::report::SuspiciousAddressRecord;
use crate::models::transaction::Transaction;

/// Transaction count above which a counterparty is flagged suspicious.
const FLAG_FREQUENCY_THRESHOLD: usize = 20;

/// Transaction count above which the reason string cites extreme
/// frequency. Intentionally looser than the flagging threshold.
const REASON_FREQUENCY_THRESHOLD: usize = 30;

/// Minimum recorded timestamps before the timing-regularity heuristic
/// participates in flagging.
const MIN_TIMING_SAMPLES: usize = 10;

/// Results of the pattern-detection pass.
#[derive(Debug, Clone)]
pub struct PatternAnalysis {
    /// Flagged counterparties in detection order, truncated to the top 20.
    pub suspicious_addresses: Vec<SuspiciousAddressRecord>,
    /// Distinct non-focal addresses seen in any token transfer.
    pub total_unique_addresses: usize,
    /// Count of all flagged counterparties before truncation.
    pub total_suspicious: usize,
}

/// Accumulated activity for one counterparty.
#[derive(Debug, Default)]
struct CounterpartyActivity {
    signatures: Vec<String>,
    total_volume: f64,
    buy_count: usize,
    sell_count: usize,
    timestamps: Vec<i64>,
}

impl CounterpartyActivity {
    fn transaction_count(&self) -> usize {
        self.signatures.len()
    }

    fn is_suspicious(&self) -> bool {
        let wash = self.buy_count > 0 && self.sell_count > 0 && self.buy_count == self.sell_count;
        let high_frequency = self.transaction_count() > FLAG_FREQUENCY_THRESHOLD;
        let bot_timing =
            self.timestamps.len() >= MIN_TIMING_SAMPLES && has_regular_intervals(&self.timestamps);
        wash || high_frequency || bot_timing
    }

    fn reason(&self) -> String {
        let mut reasons = Vec::new();
        if self.buy_count == self.sell_count && self.buy_count > 2 {
            reasons.push("Wash trading pattern (equal buys/sells)");
        }
        if self.transaction_count() > REASON_FREQUENCY_THRESHOLD {
            reasons.push("Extremely high frequency");
        }
        if has_regular_intervals(&self.timestamps) {
            reasons.push("Bot-like regular intervals");
        }
        if reasons.is_empty() {
            "High activity".to_string()
        } else {
            reasons.join(", ")
        }
    }
}

/// Scan `transactions` and flag suspicious counterparties of
/// `focal_address`.
pub fn detect_suspicious_patterns(
    transactions: &[Transaction],
    focal_address: &str,
) -> PatternAnalysis {
    let mut activity: HashMap<String, CounterpartyActivity> = HashMap::new();
    // HashMap iteration order is arbitrary; first-seen order is the
    // contract for the output list.
    let mut detection_order: Vec<String> = Vec::new();

    for tx in transactions {
        for transfer in &tx.token_transfers {
            let sides = [
                (transfer.from_user_account.as_deref(), false),
                (transfer.to_user_account.as_deref(), true),
            ];
            for (side, is_buy) in sides {
                let addr = match side {
                    Some(a) if a != focal_address => a,
                    _ => continue,
                };

                let entry = activity.entry(addr.to_string()).or_insert_with(|| {
                    detection_order.push(addr.to_string());
                    CounterpartyActivity::default()
                });

                entry.signatures.push(tx.signature.clone());
                entry.total_volume += transfer.token_amount.unwrap_or(0.0);
                if let Some(ts) = tx.timestamp {
                    entry.timestamps.push(ts);
                }
                if is_buy {
                    entry.buy_count += 1;
                } else {
                    entry.sell_count += 1;
                }
            }
        }
    }

    let mut suspicious = Vec::new();
    for addr in &detection_order {
        let act = &activity[addr];
        if act.is_suspicious() {
            suspicious.push(SuspiciousAddressRecord {
                address: addr.clone(),
                transaction_count: act.transaction_count(),
                buy_count: act.buy_count,
                sell_count: act.sell_count,
                total_volume: act.total_volume,
                reason: act.reason(),
            });
        }
    }

    let total_suspicious = suspicious.len();
    suspicious.truncate(MAX_SUSPICIOUS_ADDRESSES);

    PatternAnalysis {
        suspicious_addresses: suspicious,
        total_unique_addresses: activity.len(),
        total_suspicious,
    }
}

/// Timing-regularity test: with five or more sorted timestamps, the
/// population variance of consecutive gaps must stay below 10% of the
/// mean gap.
pub fn has_regular_intervals(timestamps: &[i64]) -> bool {
    if timestamps.len() < 5 {
        return false;
    }

    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let intervals: Vec<f64> = sorted.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    if intervals.is_empty() {
        return false;
    }

    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let variance =
        intervals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / intervals.len() as f64;

    variance < mean * 0.1
}

/// Aggregate activity of one address's own history, used by the deep
/// dive: distinct counterparties, distinct token mints and cumulative
/// volume.
pub fn aggregate_activity(transactions: &[Transaction], address: &str) -> (usize, usize, f64) {
    let mut counterparties = std::collections::HashSet::new();
    let mut tokens = std::collections::HashSet::new();
    let mut total_volume = 0.0;

    for tx in transactions {
        for transfer in &tx.token_transfers {
            if !transfer.mint.is_empty() {
                tokens.insert(transfer.mint.clone());
            }
            if let Some(from) = &transfer.from_user_account {
                if from != address {
                    counterparties.insert(from.clone());
                }
            }
            if let Some(to) = &transfer.to_user_account {
                if to != address {
                    counterparties.insert(to.clone());
                }
            }
            total_volume += transfer.token_amount.unwrap_or(0.0);
        }
    }

    (counterparties.len(), tokens.len(), total_volume)
}
