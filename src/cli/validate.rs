use anyhow::Result;

use memrank::config::MemrankConfig;
use memrank::memory::confidence::{get_confidence_info, promote_to_critical, record_validation};

/// Record a validation and print the resulting confidence state.
pub fn validate(config: &MemrankConfig, id: &str, was_useful: bool) -> Result<()> {
    let store = super::open_store(config)?;
    let outcome = record_validation(&store, id, was_useful)?;
    super::print_json(&outcome)
}

/// Promote directly, failing when the record has not met the thresholds.
pub fn promote(config: &MemrankConfig, id: &str) -> Result<()> {
    let store = super::open_store(config)?;
    let promoted = promote_to_critical(&store, id)?;
    super::print_json(&serde_json::json!({ "id": id, "promoted": promoted }))
}

pub fn confidence(config: &MemrankConfig, id: &str) -> Result<()> {
    let store = super::open_store(config)?;
    let info = get_confidence_info(&store, id)?;
    super::print_json(&info)
}
