//! Pattern alignment: how well a record's title, anchors and type line up with the query.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::{MemoryRecord, MemoryType};

const TITLE_MATCH_BONUS: f64 = 0.3;
const TITLE_OVERLAP_WEIGHT: f64 = 0.15;
const ANCHOR_WEIGHT: f64 = 0.25;
const TYPE_KEYWORD_BONUS: f64 = 0.2;
const HIGH_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Query-side input, produced by the caller's trigger/term extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryContext {
    pub text: String,
    pub anchors: Vec<String>,
}

impl QueryContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchors: Vec::new(),
        }
    }

    pub fn with_anchors(mut self, anchors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.anchors = anchors.into_iter().map(Into::into).collect();
        self
    }
}

fn type_keywords(memory_type: MemoryType) -> &'static [&'static str] {
    match memory_type {
        MemoryType::Decision => &["decided", "decision", "chose", "choice", "why"],
        MemoryType::Blocker => &["stuck", "blocked", "issue", "problem"],
        MemoryType::Context => &["context", "background", "overview", "about"],
        MemoryType::NextStep => &["next", "todo", "plan", "continue"],
        MemoryType::Insight => &["learned", "insight", "discovered", "realized"],
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
        .filter(|w| !w.is_empty())
}

/// Pattern alignment score in `[0, 1]`.
pub fn pattern_alignment(record: &MemoryRecord, query: &QueryContext) -> f64 {
    let similarity = record.normalized_similarity();
    let query_text = query.text.trim().to_lowercase();
    let mut score = similarity * 0.5;

    score += title_bonus(&record.title, &query_text);
    score += anchor_bonus(&record.anchors, &query.anchors);

    if let Some(memory_type) = record.memory_type {
        let keywords = type_keywords(memory_type);
        if words(&query_text).any(|w| keywords.contains(&w)) {
            score += TYPE_KEYWORD_BONUS;
        }
    }

    if similarity >= HIGH_SIMILARITY_THRESHOLD {
        score += (similarity - HIGH_SIMILARITY_THRESHOLD) * 0.5;
    }

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn title_bonus(title: &str, query_lower: &str) -> f64 {
    let title = title.trim().to_lowercase();
    if title.is_empty() || query_lower.is_empty() {
        return 0.0;
    }
    let title_seq: Vec<&str> = words(&title).collect();
    let query_seq: Vec<&str> = words(query_lower).collect();
    if contains_phrase(&query_seq, &title_seq) || contains_phrase(&title_seq, &query_seq) {
        return TITLE_MATCH_BONUS;
    }

    let query_words: HashSet<&str> = words(query_lower).filter(|w| w.chars().count() > 2).collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let title_words: HashSet<&str> = words(&title).filter(|w| w.chars().count() > 2).collect();
    let shared = query_words.intersection(&title_words).count();
    if shared == 0 {
        return 0.0;
    }
    shared as f64 / query_words.len() as f64 * TITLE_OVERLAP_WEIGHT
}

/// Whether `needle` occurs in `haystack` as a run of whole words.
fn contains_phrase(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

fn anchor_bonus(record_anchors: &[String], query_anchors: &[String]) -> f64 {
    let wanted: HashSet<String> = query_anchors
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    if wanted.is_empty() || record_anchors.is_empty() {
        return 0.0;
    }
    let have: HashSet<String> = record_anchors.iter().map(|a| a.trim().to_lowercase()).collect();
    let matched = wanted.iter().filter(|a| have.contains(*a)).count();
    matched as f64 / wanted.len() as f64 * ANCHOR_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, similarity: f64) -> MemoryRecord {
        MemoryRecord {
            title: title.into(),
            similarity,
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_base_is_half_similarity() {
        let score = pattern_alignment(&record("", 60.0), &QueryContext::new("anything"));
        assert!(approx(score, 0.3));
    }

    #[test]
    fn test_title_substring_match() {
        let score = pattern_alignment(
            &record("Auth flow", 0.0),
            &QueryContext::new("how does the auth flow work"),
        );
        assert!(approx(score, 0.3));
    }

    #[test]
    fn test_title_match_needs_whole_words() {
        // "ai" sits inside "explain" and "rain" but is not a word of the query.
        let score = pattern_alignment(&record("AI", 0.0), &QueryContext::new("explain rain"));
        assert!(approx(score, 0.0));

        let score = pattern_alignment(&record("AI", 0.0), &QueryContext::new("notes on ai safety"));
        assert!(approx(score, 0.3));
    }

    #[test]
    fn test_query_inside_title() {
        let score = pattern_alignment(
            &record("Release checklist for mobile", 0.0),
            &QueryContext::new("release checklist"),
        );
        assert!(approx(score, 0.3));
    }

    #[test]
    fn test_title_partial_word_overlap() {
        // Query words > 2 chars: {database, migration, plan}; shared with title: {database, migration}
        let score = pattern_alignment(
            &record("Database migration rollback", 0.0),
            &QueryContext::new("database migration plan"),
        );
        assert!(approx(score, 2.0 / 3.0 * 0.15));
    }

    #[test]
    fn test_short_words_do_not_count() {
        let score = pattern_alignment(&record("a to b", 0.0), &QueryContext::new("go to it"));
        assert!(approx(score, 0.0));
    }

    #[test]
    fn test_anchor_fraction() {
        let mut r = record("", 0.0);
        r.anchors = vec!["Summary".into(), "decisions".into()];
        let query = QueryContext::new("").with_anchors(["summary", "files", "decisions", "notes"]);
        assert!(approx(pattern_alignment(&r, &query), 0.5 * 0.25));
    }

    #[test]
    fn test_type_keyword_bonus() {
        let mut r = record("", 0.0);
        r.memory_type = Some(MemoryType::Blocker);
        assert!(approx(
            pattern_alignment(&r, &QueryContext::new("why am I stuck here")),
            0.2
        ));
        assert!(approx(pattern_alignment(&r, &QueryContext::new("summary")), 0.0));
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let mut r = record("", 0.0);
        r.memory_type = Some(MemoryType::NextStep);
        // "context" contains no whole-word "next"
        assert!(approx(pattern_alignment(&r, &QueryContext::new("nextgen context")), 0.0));
    }

    #[test]
    fn test_high_similarity_bonus() {
        let score = pattern_alignment(&record("", 90.0), &QueryContext::new("x"));
        assert!(approx(score, 0.45 + 0.05));
    }

    #[test]
    fn test_clamped_to_one() {
        let mut r = record("deploy checklist", 100.0);
        r.memory_type = Some(MemoryType::Decision);
        r.anchors = vec!["deploy".into()];
        let query = QueryContext::new("why the deploy checklist decision").with_anchors(["deploy"]);
        assert_eq!(pattern_alignment(&r, &query), 1.0);
    }

    #[test]
    fn test_nan_similarity_is_zero_base() {
        let score = pattern_alignment(&record("", f64::NAN), &QueryContext::default());
        assert_eq!(score, 0.0);
    }
}
