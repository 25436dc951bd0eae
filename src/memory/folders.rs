//! Folder-level aggregation for the "most active folders" view.
//!
//! Records are grouped by `path`. Each folder gets a composite of four sub-scores, then an
//! archive multiplier penalizes throwaway locations (archives, scratch space, test fixtures,
//! prototypes). Archived folders are hidden unless the caller asks for them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::decay::{inverse_time_decay, DEFAULT_DECAY_RATE};
use super::scoring::clamp_unit;
use super::tiers::TierRegistry;
use super::types::{ImportanceTier, MemoryRecord};

const RECENCY_WEIGHT: f64 = 0.4;
const IMPORTANCE_WEIGHT: f64 = 0.3;
const ACTIVITY_WEIGHT: f64 = 0.2;
const VALIDATION_WEIGHT: f64 = 0.1;

/// Members needed for full activity credit.
const ACTIVITY_SATURATION: f64 = 5.0;

/// Validation sub-score until folder feedback is wired to confidence data.
const VALIDATION_PLACEHOLDER: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct FolderOptions {
    pub now: DateTime<Utc>,
    pub decay_rate: f64,
    pub include_archived: bool,
    pub limit: Option<usize>,
    /// Regexes matched against the folder path; matching folders are dropped.
    pub exclude_patterns: Vec<String>,
}

impl Default for FolderOptions {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            decay_rate: DEFAULT_DECAY_RATE,
            include_archived: false,
            limit: None,
            exclude_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderScore {
    pub folder: String,
    pub simplified: String,
    pub count: usize,
    pub score: f64,
    pub recency_score: f64,
    pub importance_score: f64,
    pub activity_score: f64,
    pub validation_score: f64,
    pub last_activity: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub top_tier: ImportanceTier,
}

/// One archive convention: the first rule whose predicate matches sets the multiplier.
pub struct ArchiveRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub multiplier: f64,
}

/// Predicates receive the path normalized to `/seg/seg/` form.
pub const ARCHIVE_RULES: &[ArchiveRule] = &[
    ArchiveRule {
        name: "z_archive",
        matches: |p| p.contains("/z_archive/"),
        multiplier: 0.1,
    },
    ArchiveRule {
        name: "scratch",
        matches: |p| p.contains("/scratch/"),
        multiplier: 0.2,
    },
    ArchiveRule {
        name: "test-prefix",
        matches: |p| segments(p).any(|s| s.starts_with("test-")),
        multiplier: 0.2,
    },
    ArchiveRule {
        name: "test-suffix",
        matches: |p| segments(p).any(|s| s.ends_with("-test")),
        multiplier: 0.2,
    },
    ArchiveRule {
        name: "prototype",
        matches: |p| p.contains("/prototype/"),
        multiplier: 0.2,
    },
];

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn normalize_path(path: &str) -> String {
    let joined = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}/")
}

/// Archive multiplier for a folder path; 1.0 when no rule matches.
pub fn archive_multiplier(path: &str) -> f64 {
    let normalized = normalize_path(path);
    ARCHIVE_RULES
        .iter()
        .find(|rule| (rule.matches)(&normalized))
        .map_or(1.0, |rule| rule.multiplier)
}

fn simplified_name(folder: &str, archived: bool) -> String {
    let leaf = segments(&folder.replace('\\', "/"))
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| folder.to_string());
    if archived {
        format!("{leaf} (archived)")
    } else {
        leaf
    }
}

fn compile_excludes(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "skipping invalid exclude pattern");
                None
            }
        })
        .collect()
}

/// Group `records` by folder and score each folder, best first.
pub fn aggregate_folders(
    records: &[MemoryRecord],
    tiers: &TierRegistry,
    options: &FolderOptions,
) -> Vec<FolderScore> {
    if records.is_empty() {
        return Vec::new();
    }

    let excludes = compile_excludes(&options.exclude_patterns);

    // Vec keeps first-seen order so equal scores stay stable.
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&MemoryRecord>> = HashMap::new();
    for record in records {
        let folder = record.folder();
        groups
            .entry(folder)
            .or_insert_with(|| {
                order.push(folder);
                Vec::new()
            })
            .push(record);
    }

    let mut scores: Vec<FolderScore> = order
        .into_iter()
        .filter(|folder| !excludes.iter().any(|re| re.is_match(folder)))
        .filter_map(|folder| {
            let members = groups.get(folder)?;
            let multiplier = archive_multiplier(folder);
            let is_archived = multiplier < 1.0;
            if is_archived && !options.include_archived {
                return None;
            }
            Some(score_folder(folder, members, multiplier, tiers, options))
        })
        .collect();

    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(limit) = options.limit {
        scores.truncate(limit);
    }

    tracing::debug!(
        records = records.len(),
        folders = scores.len(),
        "aggregated folder scores"
    );
    scores
}

fn score_folder(
    folder: &str,
    members: &[&MemoryRecord],
    multiplier: f64,
    tiers: &TierRegistry,
    options: &FolderOptions,
) -> FolderScore {
    let count = members.len();

    let recency_score = members
        .iter()
        .map(|r| {
            inverse_time_decay(
                r.recency_timestamp(),
                r.importance_tier,
                options.now,
                options.decay_rate,
            )
        })
        .fold(0.0, f64::max);

    let importance_score = members
        .iter()
        .map(|r| tiers.config(r.importance_tier).value)
        .sum::<f64>()
        / count.max(1) as f64;

    let activity_score = (count as f64 / ACTIVITY_SATURATION).min(1.0);
    let validation_score = VALIDATION_PLACEHOLDER;

    let raw = recency_score * RECENCY_WEIGHT
        + importance_score * IMPORTANCE_WEIGHT
        + activity_score * ACTIVITY_WEIGHT
        + validation_score * VALIDATION_WEIGHT;

    let top_tier = members
        .iter()
        .map(|r| r.importance_tier)
        .min_by(|a, b| tiers.compare(*a, *b))
        .unwrap_or_default();

    let last_activity = members
        .iter()
        .filter_map(|r| r.recency_timestamp())
        .max();

    let is_archived = multiplier < 1.0;
    FolderScore {
        folder: folder.to_string(),
        simplified: simplified_name(folder, is_archived),
        count,
        score: clamp_unit(raw * multiplier),
        recency_score,
        importance_score,
        activity_score,
        validation_score,
        last_activity,
        is_archived,
        top_tier,
    }
}
