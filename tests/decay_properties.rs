use chrono::{Duration, TimeZone, Utc};
use memrank::memory::decay::{fsrs_retrievability, inverse_time_decay, retrievability_at};
use memrank::memory::scoring::{
    FiveFactorWeights, LegacyWeights, ScoringEngine, ScoringModel, ScoringOptions,
};
use memrank::memory::tiers::normalize_tier;
use memrank::memory::types::{ImportanceTier, MemoryRecord};
use proptest::prelude::*;

fn tier_strategy() -> impl Strategy<Value = ImportanceTier> {
    prop::sample::select(ImportanceTier::ALL.to_vec())
}

proptest! {
    #[test]
    fn fsrs_decreases_with_elapsed_time(
        t in 0.0f64..10_000.0,
        dt in 0.001f64..1_000.0,
        stability in 0.01f64..1_000.0,
    ) {
        prop_assert!(fsrs_retrievability(t + dt, stability) <= fsrs_retrievability(t, stability));
    }

    #[test]
    fn fsrs_increases_with_stability(
        t in 0.001f64..10_000.0,
        s in 0.01f64..1_000.0,
        ds in 0.001f64..1_000.0,
    ) {
        prop_assert!(fsrs_retrievability(t, s + ds) >= fsrs_retrievability(t, s));
    }

    #[test]
    fn constitutional_never_decays(days in 0i64..100_000, rate in 0.0f64..10.0) {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let ts = Some(now - Duration::days(days));
        prop_assert_eq!(inverse_time_decay(ts, ImportanceTier::Constitutional, now, rate), 1.0);
    }

    #[test]
    fn inverse_decay_in_unit_range(days in -1_000i64..100_000, tier in tier_strategy()) {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let v = inverse_time_decay(Some(now - Duration::days(days)), tier, now, 0.1);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn unknown_tier_names_normalize_to_normal(name in "[a-z]{1,12}") {
        let expected = ImportanceTier::parse(&name).unwrap_or(ImportanceTier::Normal);
        prop_assert_eq!(normalize_tier(&name), expected);
    }

    #[test]
    fn composite_scores_stay_in_unit_range(
        similarity in prop::num::f64::ANY,
        weight in prop::num::f64::ANY,
        access in any::<u64>(),
        stability in prop::num::f64::ANY,
        w in prop::array::uniform5(-1e6f64..1e6),
        tier in tier_strategy(),
        days in -100i64..10_000,
    ) {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let record = MemoryRecord {
            similarity,
            importance_weight: weight,
            access_count: access,
            stability,
            importance_tier: tier,
            updated_at: Some(now - Duration::days(days)),
            last_cited: Some(now - Duration::days(days)),
            ..Default::default()
        };
        let engine = ScoringEngine::default();

        let mut options = ScoringOptions::default().at(now);
        options.legacy_weights = LegacyWeights {
            similarity: w[0],
            importance: w[1],
            recency: w[2],
            popularity: w[3],
            tier_boost: w[4],
            retrievability: w[0] - w[1],
        };
        options.five_factor_weights = FiveFactorWeights {
            temporal: w[0],
            usage: w[1],
            importance: w[2],
            pattern: w[3],
            citation: w[4],
        };

        for model in [ScoringModel::Legacy, ScoringModel::FiveFactor] {
            let score = engine.score(&record, &options.clone().with_model(model));
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[test]
fn missing_timestamps_are_exactly_neutral() {
    let now = Utc::now();
    assert_eq!(inverse_time_decay(None, ImportanceTier::Normal, now, 0.1), 0.5);
    assert_eq!(retrievability_at(None, 3.0, now), 0.5);
}

#[test]
fn invalid_stability_uses_default_on_every_path() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let reviewed = now - Duration::days(10);
    let expected = fsrs_retrievability(10.0, 1.0);

    assert_eq!(fsrs_retrievability(10.0, 0.0), expected);
    assert_eq!(retrievability_at(Some(reviewed), 0.0, now), expected);

    let record = MemoryRecord {
        stability: 0.0,
        last_review: Some(reviewed),
        ..Default::default()
    };
    let options = ScoringOptions::default()
        .at(now)
        .with_model(ScoringModel::FiveFactor);
    let temporal = ScoringEngine::default()
        .breakdown(&record, &options)
        .factor("temporal")
        .map(|f| f.value);
    assert_eq!(temporal, Some(expected));

    // Valid stabilities stay monotonic down to the smallest positive values.
    assert!(fsrs_retrievability(10.0, 0.01) < expected);
}
