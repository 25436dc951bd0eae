//! Composite relevance scoring.
//!
//! Two complete models live side by side and are picked per call through
//! [`ScoringOptions::model`]:
//!
//! - [`legacy`]: six factors: similarity, importance, recency, popularity, tier boost,
//!   retrievability.
//! - [`five_factor`]: temporal, usage, importance, pattern, citation.
//!
//! The models are plain functions dispatched by a `match`; their "recency" and "temporal"
//! factors share math but are not interchangeable. Both produce a [`ScoreBreakdown`] whose
//! total is clamped to `[0, 1]`.

pub mod five_factor;
pub mod legacy;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decay::DEFAULT_DECAY_RATE;
use super::pattern::QueryContext;
use super::tiers::TierRegistry;
use super::types::MemoryRecord;

pub use five_factor::FiveFactorWeights;
pub use legacy::LegacyWeights;

/// Which composite formula to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringModel {
    #[default]
    Legacy,
    FiveFactor,
}

impl ScoringModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::FiveFactor => "five-factor",
        }
    }
}

impl std::fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScoringModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "six-factor" | "6" => Ok(Self::Legacy),
            "five-factor" | "five_factor" | "5" => Ok(Self::FiveFactor),
            _ => Err(format!("unknown scoring model: {s}")),
        }
    }
}

/// Popularity as a function of access count, owned by the caller.
///
/// Implementations must be monotonic non-decreasing and saturate within `[0, 1]`; the
/// scorer clamps whatever comes back.
pub trait PopularityModel: Send + Sync {
    fn score(&self, access_count: u64) -> f64;
}

impl<F> PopularityModel for F
where
    F: Fn(u64) -> f64 + Send + Sync,
{
    fn score(&self, access_count: u64) -> f64 {
        self(access_count)
    }
}

/// Default popularity curve: `min(1, log10(n + 1) / 2)`, saturating at 99 accesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPopularity;

impl PopularityModel for LogPopularity {
    fn score(&self, access_count: u64) -> f64 {
        ((access_count as f64 + 1.0).log10() / 2.0).min(1.0)
    }
}

/// Per-call knobs.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub model: ScoringModel,
    /// Reference instant for every age computation in the call.
    pub now: DateTime<Utc>,
    pub decay_rate: f64,
    pub legacy_weights: LegacyWeights,
    pub five_factor_weights: FiveFactorWeights,
    /// Only consulted by the five-factor pattern factor.
    pub query: QueryContext,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            model: ScoringModel::default(),
            now: Utc::now(),
            decay_rate: DEFAULT_DECAY_RATE,
            legacy_weights: LegacyWeights::default(),
            five_factor_weights: FiveFactorWeights::default(),
            query: QueryContext::default(),
        }
    }
}

impl ScoringOptions {
    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_query(mut self, query: QueryContext) -> Self {
        self.query = query;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// One factor's contribution to a composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub name: &'static str,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
}

impl FactorScore {
    pub(crate) fn new(name: &'static str, value: f64, weight: f64) -> Self {
        let value = clamp_unit(value);
        let weight = if weight.is_finite() { weight } else { 0.0 };
        Self {
            name,
            value,
            weight,
            contribution: value * weight,
        }
    }
}

/// Auditable decomposition of a composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub model: ScoringModel,
    pub factors: Vec<FactorScore>,
    pub total: f64,
}

impl ScoreBreakdown {
    pub(crate) fn from_factors(model: ScoringModel, factors: Vec<FactorScore>) -> Self {
        let sum: f64 = factors.iter().map(|f| f.contribution).sum();
        Self {
            model,
            factors,
            total: clamp_unit(sum),
        }
    }

    /// Look up a factor by name.
    pub fn factor(&self, name: &str) -> Option<&FactorScore> {
        self.factors.iter().find(|f| f.name == name)
    }
}

/// A record annotated with its composite score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMemory {
    #[serde(flatten)]
    pub record: MemoryRecord,
    pub composite_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Clamp into `[0, 1]`; NaN maps to 0.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Inputs shared by both strategies.
pub(crate) struct ScoringContext<'a> {
    pub tiers: &'a TierRegistry,
    pub popularity: &'a dyn PopularityModel,
    pub options: &'a ScoringOptions,
}

/// Composite scorer. Holds the injected tier table and popularity model; all methods are pure.
#[derive(Clone)]
pub struct ScoringEngine {
    tiers: Arc<TierRegistry>,
    popularity: Arc<dyn PopularityModel>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(Arc::new(TierRegistry::standard()), Arc::new(LogPopularity))
    }
}

impl ScoringEngine {
    pub fn new(tiers: Arc<TierRegistry>, popularity: Arc<dyn PopularityModel>) -> Self {
        Self { tiers, popularity }
    }

    pub fn tiers(&self) -> &TierRegistry {
        &self.tiers
    }

    /// Per-factor breakdown for one record.
    pub fn breakdown(&self, record: &MemoryRecord, options: &ScoringOptions) -> ScoreBreakdown {
        let ctx = ScoringContext {
            tiers: &self.tiers,
            popularity: self.popularity.as_ref(),
            options,
        };
        match options.model {
            ScoringModel::Legacy => legacy::breakdown(record, &ctx),
            ScoringModel::FiveFactor => five_factor::breakdown(record, &ctx),
        }
    }

    /// Composite score in `[0, 1]` for one record.
    pub fn score(&self, record: &MemoryRecord, options: &ScoringOptions) -> f64 {
        self.breakdown(record, options).total
    }

    /// Score every record and sort descending. Ties keep input order.
    pub fn score_and_rank(
        &self,
        records: Vec<MemoryRecord>,
        options: &ScoringOptions,
    ) -> Vec<RankedMemory> {
        let mut ranked: Vec<RankedMemory> = records
            .into_par_iter()
            .map(|record| {
                let breakdown = self.breakdown(&record, options);
                RankedMemory {
                    composite_score: breakdown.total,
                    record,
                    breakdown,
                }
            })
            .collect();

        // `sort_by` is stable, which keeps equal scores in their original order.
        ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));

        tracing::debug!(
            model = %options.model,
            count = ranked.len(),
            top = ranked.first().map(|r| r.composite_score),
            "scored candidate set"
        );
        ranked
    }
}
