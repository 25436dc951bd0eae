use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use memrank::config::MemrankConfig;
use memrank::memory::pattern::QueryContext;
use memrank::memory::scoring::{RankedMemory, ScoringEngine, ScoringModel};

pub struct RankArgs {
    pub input: Option<PathBuf>,
    pub query: Option<String>,
    pub anchors: Vec<String>,
    pub model: Option<ScoringModel>,
    pub limit: Option<usize>,
    pub explain: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedSummary<'a> {
    id: &'a str,
    title: &'a str,
    importance_tier: &'a str,
    composite_score: f64,
}

/// Rank searchable records and print them best first.
pub fn rank(config: &MemrankConfig, args: &RankArgs) -> Result<()> {
    let records = super::load_records(config, args.input.as_deref())?;

    let engine = ScoringEngine::default();
    let records = engine.tiers().filter_searchable(records);

    let mut options = config.scoring_options().with_query(
        QueryContext::new(args.query.clone().unwrap_or_default())
            .with_anchors(args.anchors.clone()),
    );
    if let Some(model) = args.model {
        options = options.with_model(model);
    }

    let mut ranked = engine.score_and_rank(records, &options);
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    if args.explain {
        super::print_json(&ranked)
    } else {
        let summary: Vec<RankedSummary<'_>> = ranked.iter().map(summarize).collect();
        super::print_json(&summary)
    }
}

fn summarize(ranked: &RankedMemory) -> RankedSummary<'_> {
    RankedSummary {
        id: &ranked.record.id,
        title: &ranked.record.title,
        importance_tier: ranked.record.importance_tier.as_str(),
        composite_score: ranked.composite_score,
    }
}
