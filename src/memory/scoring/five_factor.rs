//! Five-factor model.
//!
//! ```text
//! score = 0.25 × temporal + 0.15 × usage + 0.25 × importance
//!       + 0.20 × pattern  + 0.15 × citation
//! ```
//!
//! The weights were tuned empirically; the regression tests pin current behavior.

use serde::{Deserialize, Serialize};

use super::{FactorScore, ScoreBreakdown, ScoringContext, ScoringModel};
use crate::memory::decay::{days_between, retrievability_at, NEUTRAL_SCORE};
use crate::memory::pattern::pattern_alignment;
use crate::memory::types::{ImportanceTier, MemoryRecord};

const USAGE_STEP: f64 = 0.05;
const USAGE_CAP: f64 = 1.5;
const CITATION_RATE: f64 = 0.1;
const CITATION_WINDOW_DAYS: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiveFactorWeights {
    pub temporal: f64,
    pub usage: f64,
    pub importance: f64,
    pub pattern: f64,
    pub citation: f64,
}

impl Default for FiveFactorWeights {
    fn default() -> Self {
        Self {
            temporal: 0.25,
            usage: 0.15,
            importance: 0.25,
            pattern: 0.20,
            citation: 0.15,
        }
    }
}

/// Importance multiplier per tier, applied to the record's base weight.
pub fn tier_multiplier(tier: ImportanceTier) -> f64 {
    match tier {
        ImportanceTier::Constitutional => 2.0,
        ImportanceTier::Critical => 1.5,
        ImportanceTier::Important => 1.3,
        ImportanceTier::Normal => 1.0,
        ImportanceTier::Temporary => 0.6,
        ImportanceTier::Deprecated => 0.1,
    }
}

/// Usage boost `min(1.5, 1 + n × 0.05)` rescaled to `[0, 1]`.
pub fn usage_score(access_count: u64) -> f64 {
    let raw = (1.0 + access_count as f64 * USAGE_STEP).min(USAGE_CAP);
    (raw - 1.0) / (USAGE_CAP - 1.0)
}

pub fn importance_score(record: &MemoryRecord) -> f64 {
    (record.importance_weight() * tier_multiplier(record.importance_tier) / 2.0).min(1.0)
}

/// Citation recency: inverse-time over a 90-day window, neutral without any citation signal.
pub fn citation_score(record: &MemoryRecord, now: chrono::DateTime<chrono::Utc>) -> f64 {
    let Some(ts) = record.citation_timestamp() else {
        return NEUTRAL_SCORE;
    };
    let days = days_between(ts, now).max(0.0);
    if days < CITATION_WINDOW_DAYS {
        1.0 / (1.0 + days * CITATION_RATE)
    } else {
        0.0
    }
}

pub(crate) fn breakdown(record: &MemoryRecord, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
    let w = &ctx.options.five_factor_weights;
    let now = ctx.options.now;

    let factors = vec![
        FactorScore::new(
            "temporal",
            retrievability_at(record.review_timestamp(), record.stability(), now),
            w.temporal,
        ),
        FactorScore::new("usage", usage_score(record.access_count), w.usage),
        FactorScore::new("importance", importance_score(record), w.importance),
        FactorScore::new(
            "pattern",
            pattern_alignment(record, &ctx.options.query),
            w.pattern,
        ),
        FactorScore::new("citation", citation_score(record, now), w.citation),
    ];

    ScoreBreakdown::from_factors(ScoringModel::FiveFactor, factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::pattern::QueryContext;
    use crate::memory::scoring::{LogPopularity, ScoringOptions};
    use crate::memory::tiers::TierRegistry;
    use chrono::{Duration, Utc};

    fn run(record: &MemoryRecord, options: &ScoringOptions) -> ScoreBreakdown {
        let tiers = TierRegistry::standard();
        let ctx = ScoringContext {
            tiers: &tiers,
            popularity: &LogPopularity,
            options,
        };
        breakdown(record, &ctx)
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = FiveFactorWeights::default();
        let sum = w.temporal + w.usage + w.importance + w.pattern + w.citation;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_usage_score_saturates_at_ten() {
        assert_eq!(usage_score(0), 0.0);
        assert!((usage_score(4) - 0.4).abs() < 1e-12);
        assert_eq!(usage_score(10), 1.0);
        assert_eq!(usage_score(1_000), 1.0);
    }

    #[test]
    fn test_importance_uses_tier_multiplier() {
        let mut record = MemoryRecord::default();
        assert_eq!(importance_score(&record), 0.25);

        record.importance_tier = ImportanceTier::Constitutional;
        assert_eq!(importance_score(&record), 0.5);

        record.importance_weight = 1.0;
        assert_eq!(importance_score(&record), 1.0);

        record.importance_tier = ImportanceTier::Deprecated;
        assert!((importance_score(&record) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_citation_window() {
        let now = Utc::now();
        let mut record = MemoryRecord::default();
        assert_eq!(citation_score(&record, now), 0.5);

        record.last_cited = Some(now);
        assert_eq!(citation_score(&record, now), 1.0);

        record.last_cited = Some(now - Duration::days(10));
        assert!((citation_score(&record, now) - 0.5).abs() < 1e-9);

        record.last_cited = Some(now - Duration::days(90));
        assert_eq!(citation_score(&record, now), 0.0);
    }

    #[test]
    fn test_citation_falls_back_to_last_accessed() {
        let now = Utc::now();
        let record = MemoryRecord {
            last_accessed: Some(now),
            ..Default::default()
        };
        assert_eq!(citation_score(&record, now), 1.0);
    }

    #[test]
    fn test_no_timestamps_yield_neutral_factors() {
        let b = run(&MemoryRecord::default(), &ScoringOptions::default());
        assert_eq!(b.factor("temporal").map(|f| f.value), Some(0.5));
        assert_eq!(b.factor("citation").map(|f| f.value), Some(0.5));
        assert!(b.total.is_finite());
    }

    #[test]
    fn test_query_context_feeds_pattern_factor() {
        let now = Utc::now();
        let record = MemoryRecord {
            title: "Release checklist".into(),
            updated_at: Some(now),
            ..Default::default()
        };
        let plain = run(&record, &ScoringOptions::default().at(now));
        let matched = run(
            &record,
            &ScoringOptions::default()
                .at(now)
                .with_query(QueryContext::new("release checklist")),
        );
        assert!(matched.total > plain.total);
        assert_eq!(matched.factor("pattern").map(|f| f.value), Some(0.3));
    }

    #[test]
    fn test_adversarial_weights_stay_in_range() {
        let mut options = ScoringOptions::default();
        options.five_factor_weights = FiveFactorWeights {
            temporal: f64::MAX,
            usage: f64::MAX,
            importance: -f64::MAX,
            pattern: f64::NEG_INFINITY,
            citation: f64::NAN,
        };
        let b = run(&MemoryRecord::default(), &options);
        assert!((0.0..=1.0).contains(&b.total));
    }
}
