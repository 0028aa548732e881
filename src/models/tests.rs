use super::entity::{EntityLookup, EntityMetadata};
use super::report::{describe_time_range, TransactionSummary};
use super::transaction::Transaction;

fn lookup(is_on_curve: Option<bool>, entity_type: Option<&str>, label: Option<&str>) -> EntityLookup {
    EntityLookup {
        is_on_curve,
        entity_type: entity_type.map(str::to_string),
        account_label: label.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn test_merge_account_info_precedence() {
    let search = lookup(None, Some("UNKNOWN"), Some("Search Label"));
    let account = lookup(None, Some("SYSTEM"), Some("Account Label"));

    let merged = EntityMetadata::merge("addr", &search, &account);
    assert_eq!(merged.entity_type, "SYSTEM");
    assert_eq!(merged.account_label.as_deref(), Some("Account Label"));
}

#[test]
fn test_merge_on_curve_search_first() {
    let search = lookup(Some(true), None, None);
    let account = lookup(Some(false), None, None);

    let merged = EntityMetadata::merge("addr", &search, &account);
    assert_eq!(merged.is_on_curve, Some(true));
    assert!(!merged.is_pda());

    let merged = EntityMetadata::merge("addr", &lookup(None, None, None), &account);
    assert_eq!(merged.is_on_curve, Some(false));
    assert!(merged.is_pda());
}

#[test]
fn test_merge_prefers_search_tags() {
    let mut search = lookup(None, None, None);
    search.account_tags = vec!["dex".to_string(), "raydium".to_string()];
    let mut account = lookup(None, None, Some("Pool"));
    account.account_tags = vec!["stale".to_string()];

    let merged = EntityMetadata::merge("addr", &search, &account);
    assert_eq!(merged.account_tags, vec!["dex", "raydium"]);

    // Account-info tags only fill in when search reports none
    let merged = EntityMetadata::merge("addr", &lookup(None, None, None), &account);
    assert_eq!(merged.account_tags, vec!["stale"]);
}

#[test]
fn test_system_account_detection() {
    let account = lookup(None, Some("system_account"), None);
    let merged = EntityMetadata::merge("addr", &EntityLookup::default(), &account);
    assert!(merged.is_system_account());
}

#[test]
fn test_transaction_wire_format() {
    let json = r#"{
        "signature": "sig1",
        "timestamp": 1700000000,
        "type": "SWAP",
        "tokenTransfers": [
            {"mint": "MintA", "fromUserAccount": "A", "toUserAccount": "B", "tokenAmount": 1.5}
        ],
        "nativeTransfers": []
    }"#;
    let tx: Transaction = serde_json::from_str(json).unwrap();
    assert_eq!(tx.signature, "sig1");
    assert_eq!(tx.type_or_unknown(), "SWAP");
    assert_eq!(tx.token_transfers.len(), 1);
    assert_eq!(tx.token_transfers[0].from_user_account.as_deref(), Some("A"));
    assert!(tx.touches_mint("MintA"));
    assert!(!tx.touches_mint("MintB"));
}

#[test]
fn test_transaction_summary_time_range() {
    let txs = vec![
        Transaction {
            signature: "new".into(),
            timestamp: Some(200),
            tx_type: Some("SWAP".into()),
            ..Default::default()
        },
        Transaction {
            signature: "old".into(),
            timestamp: Some(100),
            ..Default::default()
        },
    ];
    let summary = TransactionSummary::from_transactions(&txs);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.time_range.latest, Some(200));
    assert_eq!(summary.time_range.earliest, Some(100));
    assert_eq!(summary.by_type.get("SWAP"), Some(&1));
    assert_eq!(summary.by_type.get("UNKNOWN"), Some(&1));
}

#[test]
fn test_describe_time_range() {
    assert_eq!(describe_time_range(10, None), "Last 10 hours (0 days)");
    assert_eq!(
        describe_time_range(8760, Some("Mint")),
        "Complete history (365 days) - filtered for token: Mint"
    );
    assert_eq!(
        describe_time_range(48, Some("Mint")),
        "Last 48 hours (2 days) - filtered for token: Mint"
    );
}
