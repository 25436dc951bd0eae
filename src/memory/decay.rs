//! Recency and retrievability calculators.
//!
//! Two models coexist and feed different scoring paths:
//!
//! - **Inverse-time decay**: `1 / (1 + days × rate)`. At the default rate of 0.10 a record
//!   keeps ~59% after 7 days, 50% after 10 and 25% after 30. Constitutional records never
//!   decay.
//! - **FSRS retrievability**: the power-law forgetting curve
//!   `R = (1 + FACTOR × t / S) ^ DECAY` with `FACTOR = 19/81` and `DECAY = -0.5`, where `S`
//!   is the record's stability in days.
//!
//! Missing timestamps return [`NEUTRAL_SCORE`] rather than propagating NaN into weighted sums.

use chrono::{DateTime, Utc};

use super::types::{ImportanceTier, DEFAULT_STABILITY};

pub const DEFAULT_DECAY_RATE: f64 = 0.10;

/// FSRS power-law factor, chosen so that `R(S) = 0.9`.
pub const FSRS_FACTOR: f64 = 19.0 / 81.0;
pub const FSRS_DECAY: f64 = -0.5;

/// Score returned when the input needed to compute a factor is absent.
pub const NEUTRAL_SCORE: f64 = 0.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days from `from` to `now`. Negative when `from` is in the future.
pub fn days_between(from: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - from).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Inverse-time decay for a record of the given tier.
pub fn inverse_time_decay(
    timestamp: Option<DateTime<Utc>>,
    tier: ImportanceTier,
    now: DateTime<Utc>,
    decay_rate: f64,
) -> f64 {
    if tier == ImportanceTier::Constitutional {
        return 1.0;
    }
    let Some(ts) = timestamp else {
        return NEUTRAL_SCORE;
    };

    let days = days_between(ts, now);
    if days <= 0.0 {
        return 1.0;
    }

    let rate = if decay_rate.is_finite() && decay_rate >= 0.0 {
        decay_rate
    } else {
        DEFAULT_DECAY_RATE
    };
    (1.0 / (1.0 + days * rate)).clamp(0.0, 1.0)
}

/// FSRS retrievability after `elapsed_days` at the given stability.
///
/// Non-positive or non-finite stability falls back to [`DEFAULT_STABILITY`], matching
/// [`MemoryRecord::stability`](super::types::MemoryRecord::stability); negative elapsed time
/// clamps to zero.
pub fn fsrs_retrievability(elapsed_days: f64, stability: f64) -> f64 {
    let stability = if stability.is_finite() && stability > 0.0 {
        stability
    } else {
        DEFAULT_STABILITY
    };
    if elapsed_days.is_nan() {
        return NEUTRAL_SCORE;
    }
    let t = elapsed_days.max(0.0);
    let r = (1.0 + FSRS_FACTOR * t / stability).powf(FSRS_DECAY);
    if r.is_finite() {
        r.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// FSRS retrievability measured from an optional timestamp.
pub fn retrievability_at(
    timestamp: Option<DateTime<Utc>>,
    stability: f64,
    now: DateTime<Utc>,
) -> f64 {
    match timestamp {
        Some(ts) => fsrs_retrievability(days_between(ts, now), stability),
        None => NEUTRAL_SCORE,
    }
}

/// Days until retrievability falls to `target_retention`.
///
/// Inverse of [`fsrs_retrievability`]: `t = S / FACTOR × (R^(1/DECAY) − 1)`. The target is
/// clamped into `(0, 1)`; at `0.9` the interval equals the stability.
pub fn next_review_days(stability: f64, target_retention: f64) -> f64 {
    let stability = if stability.is_finite() && stability > 0.0 {
        stability
    } else {
        DEFAULT_STABILITY
    };
    let retention = if target_retention.is_finite() {
        target_retention.clamp(0.01, 0.99)
    } else {
        0.9
    };
    stability / FSRS_FACTOR * (retention.powf(1.0 / FSRS_DECAY) - 1.0)
}
