//! Legacy six-factor model.
//!
//! ```text
//! score = 0.30 × similarity + 0.25 × importance + 0.10 × recency
//!       + 0.15 × popularity + 0.05 × tier_boost + 0.15 × retrievability
//! ```
//!
//! `tier_boost` is the tier's intrinsic value, not its search boost.

use serde::{Deserialize, Serialize};

use super::{FactorScore, ScoreBreakdown, ScoringContext, ScoringModel};
use crate::memory::decay::{inverse_time_decay, retrievability_at};
use crate::memory::types::MemoryRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyWeights {
    pub similarity: f64,
    pub importance: f64,
    pub recency: f64,
    pub popularity: f64,
    pub tier_boost: f64,
    pub retrievability: f64,
}

impl Default for LegacyWeights {
    fn default() -> Self {
        Self {
            similarity: 0.30,
            importance: 0.25,
            recency: 0.10,
            popularity: 0.15,
            tier_boost: 0.05,
            retrievability: 0.15,
        }
    }
}

pub(crate) fn breakdown(record: &MemoryRecord, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
    let w = &ctx.options.legacy_weights;
    let now = ctx.options.now;
    let tier = record.importance_tier;

    let recency = inverse_time_decay(
        record.recency_timestamp(),
        tier,
        now,
        ctx.options.decay_rate,
    );
    let retrievability = retrievability_at(record.review_timestamp(), record.stability(), now);

    let factors = vec![
        FactorScore::new("similarity", record.normalized_similarity(), w.similarity),
        FactorScore::new("importance", record.importance_weight(), w.importance),
        FactorScore::new("recency", recency, w.recency),
        FactorScore::new(
            "popularity",
            ctx.popularity.score(record.access_count),
            w.popularity,
        ),
        FactorScore::new("tier_boost", ctx.tiers.config(tier).value, w.tier_boost),
        FactorScore::new("retrievability", retrievability, w.retrievability),
    ];

    ScoreBreakdown::from_factors(ScoringModel::Legacy, factors)
}
