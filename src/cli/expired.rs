use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use memrank::config::MemrankConfig;
use memrank::memory::maintenance::find_expired;
use memrank::memory::tiers::TierRegistry;

pub fn expired(config: &MemrankConfig, input: Option<&Path>) -> Result<()> {
    let records = super::load_records(config, input)?;
    let candidates = find_expired(&records, &TierRegistry::standard(), Utc::now());
    super::print_json(&candidates)
}
