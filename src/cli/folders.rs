use anyhow::Result;
use std::path::Path;

use memrank::config::MemrankConfig;
use memrank::memory::folders::aggregate_folders;
use memrank::memory::tiers::TierRegistry;

/// Print folder scores, best first. Command-line flags extend the configured defaults.
pub fn folders(
    config: &MemrankConfig,
    input: Option<&Path>,
    limit: Option<usize>,
    include_archived: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let records = super::load_records(config, input)?;

    let mut options = config.folder_options();
    options.include_archived |= include_archived;
    if limit.is_some() {
        options.limit = limit;
    }
    options.exclude_patterns.extend(exclude);

    let scores = aggregate_folders(&records, &TierRegistry::standard(), &options);
    super::print_json(&scores)
}
