//! Core record type definitions.
//!
//! Defines [`ImportanceTier`] (the six-level importance classification), [`MemoryType`]
//! (the kind of knowledge a record holds), and [`MemoryRecord`] (a candidate entry as
//! supplied by the query layer).
//!
//! Deserialization is deliberately forgiving: unknown tiers become `normal`, unparsable
//! timestamps become `None`, and non-numeric scores become `NaN`. The sanitizing accessors on
//! [`MemoryRecord`] then map anything non-finite to the field's neutral default, so one
//! malformed record never fails a batch.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::tiers::normalize_tier;

/// Coarse importance classification, ordered from most to least important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceTier {
    Constitutional,
    Critical,
    Important,
    #[default]
    Normal,
    Temporary,
    Deprecated,
}

impl ImportanceTier {
    pub const ALL: [ImportanceTier; 6] = [
        Self::Constitutional,
        Self::Critical,
        Self::Important,
        Self::Normal,
        Self::Temporary,
        Self::Deprecated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constitutional => "constitutional",
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Normal => "normal",
            Self::Temporary => "temporary",
            Self::Deprecated => "deprecated",
        }
    }

    /// Case-insensitive strict parse. Returns `None` for anything that is not a tier name.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lowered)
    }

    /// Whether this tier sits at the top of the promotion ladder.
    pub fn is_top_tier(&self) -> bool {
        matches!(self, Self::Critical | Self::Constitutional)
    }
}

impl std::fmt::Display for ImportanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown importance tier: {s}"))
    }
}

impl<'de> Deserialize<'de> for ImportanceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RawValue>::deserialize(deserializer)? {
            Some(RawValue::Text(s)) => normalize_tier(&s),
            _ => Self::default(),
        })
    }
}

/// What kind of knowledge a record captures. Drives the type-keyword bonus in pattern scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryType {
    Decision,
    Blocker,
    Context,
    NextStep,
    Insight,
}

impl MemoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Blocker => "blocker",
            Self::Context => "context",
            Self::NextStep => "next-step",
            Self::Insight => "insight",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "decision" => Ok(Self::Decision),
            "blocker" => Ok(Self::Blocker),
            "context" => Ok(Self::Context),
            "next-step" => Ok(Self::NextStep),
            "insight" => Ok(Self::Insight),
            _ => Err(format!("unknown memory type: {s}")),
        }
    }
}

pub const DEFAULT_IMPORTANCE_WEIGHT: f64 = 0.5;
pub const DEFAULT_STABILITY: f64 = 1.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A candidate memory, as handed over by the query/storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRecord {
    pub id: String,
    pub title: String,
    /// Folder grouping key. `None` groups under `"unknown"`.
    pub path: Option<String>,
    #[serde(deserialize_with = "lenient_memory_type")]
    pub memory_type: Option<MemoryType>,
    pub anchors: Vec<String>,
    /// Raw semantic similarity on a 0–100 scale, computed upstream.
    #[serde(deserialize_with = "lenient_f64")]
    pub similarity: f64,
    pub importance_tier: ImportanceTier,
    #[serde(deserialize_with = "lenient_f64")]
    pub importance_weight: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub access_count: u64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_cited: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_review: Option<DateTime<Utc>>,
    /// FSRS stability, in days.
    #[serde(deserialize_with = "lenient_f64")]
    pub stability: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient_count_u32")]
    pub validation_count: u32,
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            path: None,
            memory_type: None,
            anchors: Vec::new(),
            similarity: 0.0,
            importance_tier: ImportanceTier::Normal,
            importance_weight: DEFAULT_IMPORTANCE_WEIGHT,
            access_count: 0,
            created_at: None,
            updated_at: None,
            last_accessed: None,
            last_cited: None,
            last_review: None,
            stability: DEFAULT_STABILITY,
            confidence: DEFAULT_CONFIDENCE,
            validation_count: 0,
        }
    }
}

impl MemoryRecord {
    /// Similarity rescaled from 0–100 to `[0, 1]`. Non-finite input yields 0.
    pub fn normalized_similarity(&self) -> f64 {
        if self.similarity.is_finite() {
            (self.similarity / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn importance_weight(&self) -> f64 {
        finite_or(self.importance_weight, DEFAULT_IMPORTANCE_WEIGHT).clamp(0.0, 1.0)
    }

    pub fn stability(&self) -> f64 {
        let s = finite_or(self.stability, DEFAULT_STABILITY);
        if s > 0.0 {
            s
        } else {
            DEFAULT_STABILITY
        }
    }

    pub fn confidence(&self) -> f64 {
        finite_or(self.confidence, DEFAULT_CONFIDENCE).clamp(0.0, 1.0)
    }

    /// Folder key, falling back to `"unknown"` for missing or blank paths.
    pub fn folder(&self) -> &str {
        match self.path.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => "unknown",
        }
    }

    /// Timestamp driving inverse-time recency.
    pub fn recency_timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Timestamp driving FSRS retrievability.
    pub fn review_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_review
            .or(self.last_accessed)
            .or(self.updated_at)
            .or(self.created_at)
    }

    /// Timestamp driving the citation factor.
    pub fn citation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_cited.or(self.last_accessed)
    }
}

pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Parse RFC 3339 or SQLite-style `YYYY-MM-DD HH:MM:SS` timestamps (assumed UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Int(i64),
    Float(f64),
    Other(serde::de::IgnoredAny),
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Option::<RawValue>::deserialize(deserializer)? {
        Some(RawValue::Text(s)) => parse_timestamp(&s),
        // Integers are epoch milliseconds.
        Some(RawValue::Int(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(RawValue::Float(ms)) if ms.is_finite() => {
            Utc.timestamp_millis_opt(ms as i64).single()
        }
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<RawValue>::deserialize(deserializer)? {
        Some(RawValue::Int(i)) => i as f64,
        Some(RawValue::Float(f)) => f,
        Some(RawValue::Text(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Option::<RawValue>::deserialize(deserializer)? {
        Some(RawValue::Int(i)) => i.max(0) as u64,
        Some(RawValue::Float(f)) if f.is_finite() && f > 0.0 => f as u64,
        Some(RawValue::Text(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_count_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    lenient_count(deserializer).map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn lenient_memory_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MemoryType>, D::Error> {
    Ok(match Option::<RawValue>::deserialize(deserializer)? {
        Some(RawValue::Text(s)) => s.parse().ok(),
        _ => None,
    })
}
