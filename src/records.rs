use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use std::fs;

/// The two sample records: one well-formed, one with an out-of-range YES
/// price and odds change.
pub fn demo_records() -> Vec<Value> {
    let now = Utc::now().to_rfc3339();

    vec![
        json!({
            "market_id": "us-president-2024",
            "timestamp": now,
            "yes_price": 0.55,
            "no_price": 0.45,
            "volume_24h": 125000.0,
            "liquidity": 500000.0,
            "category": "Politics",
            "odds_change": 15.2
        }),
        json!({
            "market_id": "us-president-2024",
            "timestamp": now,
            "yes_price": 1.2,
            "no_price": 0.45,
            "volume_24h": 125000.0,
            "liquidity": 500000.0,
            "odds_change": 200
        }),
    ]
}

/// Load raw records from a JSON array file or newline-delimited JSON.
///
/// Entries are returned as-is; non-object entries are left for the caller
/// to reject.
pub fn load_records(path: &str) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path))?;

    parse_records(&contents).with_context(|| format!("Failed to parse records file: {}", path))
}

fn parse_records(contents: &str) -> Result<Vec<Value>> {
    // A whole-file array first, otherwise one JSON value per line
    if let Ok(records) = serde_json::from_str::<Vec<Value>>(contents) {
        return Ok(records);
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Value>(line).with_context(|| format!("Invalid JSON on line {}", idx + 1))
        })
        .collect()
}
