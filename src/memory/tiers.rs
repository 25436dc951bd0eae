//! Importance tier registry.
//!
//! Six tiers govern how a record ranks, whether it decays, whether it auto-expires, and
//! whether it is searchable at all:
//!
//! | Tier | Value | Search boost | Decays | Auto-expire | Excluded | Always surface |
//! |------|-------|--------------|--------|-------------|----------|----------------|
//! | constitutional | 1.0 | 3.0× | no | – | no | yes (2000 tokens) |
//! | critical | 0.9 | 2.0× | no | – | no | no |
//! | important | 0.8 | 1.5× | no | – | no | no |
//! | normal | 0.5 | 1.0× | yes | – | no | no |
//! | temporary | 0.3 | 0.5× | yes | 7 days | no | no |
//! | deprecated | 0.1 | 0.0× | no | – | yes | no |
//!
//! The registry is built once ([`TierRegistry::standard`]) and passed by reference into
//! scoring code; nothing reads it from global state.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::types::{ImportanceTier, MemoryRecord};

/// Policy attached to one importance tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierConfig {
    /// Intrinsic importance in `[0, 1]`. Used as the legacy `tier_boost` factor.
    pub value: f64,
    /// Ranking multiplier for a separate boost stage. Not part of either composite formula.
    pub search_boost: f64,
    pub decay: bool,
    pub auto_expire_days: Option<u32>,
    pub exclude_from_search: bool,
    pub always_surface: bool,
    pub max_tokens: Option<usize>,
}

/// Immutable tier table.
#[derive(Debug, Clone)]
pub struct TierRegistry {
    configs: HashMap<ImportanceTier, TierConfig>,
}

impl Default for TierRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TierRegistry {
    /// The standard six-tier table.
    pub fn standard() -> Self {
        let entry = |value, search_boost, decay| TierConfig {
            value,
            search_boost,
            decay,
            auto_expire_days: None,
            exclude_from_search: false,
            always_surface: false,
            max_tokens: None,
        };

        let mut configs = HashMap::with_capacity(6);
        configs.insert(
            ImportanceTier::Constitutional,
            TierConfig {
                always_surface: true,
                max_tokens: Some(2000),
                ..entry(1.0, 3.0, false)
            },
        );
        configs.insert(ImportanceTier::Critical, entry(0.9, 2.0, false));
        configs.insert(ImportanceTier::Important, entry(0.8, 1.5, false));
        configs.insert(ImportanceTier::Normal, entry(0.5, 1.0, true));
        configs.insert(
            ImportanceTier::Temporary,
            TierConfig {
                auto_expire_days: Some(7),
                ..entry(0.3, 0.5, true)
            },
        );
        configs.insert(
            ImportanceTier::Deprecated,
            TierConfig {
                exclude_from_search: true,
                ..entry(0.1, 0.0, false)
            },
        );

        Self { configs }
    }

    /// Typed lookup.
    pub fn config(&self, tier: ImportanceTier) -> &TierConfig {
        // The table is populated for every variant in `standard()`.
        &self.configs[&tier]
    }

    /// Case-insensitive lookup by name. Unknown or empty names resolve to `normal`.
    pub fn get_tier_config(&self, name: &str) -> &TierConfig {
        self.config(normalize_tier(name))
    }

    /// Multiply a score by the tier's search boost. Non-finite scores yield 0.
    pub fn apply_tier_boost(&self, score: f64, tier: &str) -> f64 {
        if !score.is_finite() {
            return 0.0;
        }
        score * self.get_tier_config(tier).search_boost
    }

    pub fn is_excluded_from_search(&self, tier: &str) -> bool {
        self.get_tier_config(tier).exclude_from_search
    }

    pub fn allows_decay(&self, tier: &str) -> bool {
        self.get_tier_config(tier).decay
    }

    pub fn get_auto_expire_days(&self, tier: &str) -> Option<u32> {
        self.get_tier_config(tier).auto_expire_days
    }

    pub fn should_always_surface(&self, tier: &str) -> bool {
        self.get_tier_config(tier).always_surface
    }

    pub fn get_max_tokens(&self, tier: &str) -> Option<usize> {
        self.get_tier_config(tier).max_tokens
    }

    /// Ordering with the more important tier first.
    pub fn compare_tiers(&self, a: &str, b: &str) -> Ordering {
        self.compare(normalize_tier(a), normalize_tier(b))
    }

    pub fn compare(&self, a: ImportanceTier, b: ImportanceTier) -> Ordering {
        self.config(b).value.total_cmp(&self.config(a).value)
    }

    /// All tiers, most important first.
    pub fn get_tiers_by_importance(&self) -> Vec<ImportanceTier> {
        let mut tiers = ImportanceTier::ALL.to_vec();
        tiers.sort_by(|a, b| self.compare(*a, *b));
        tiers
    }

    /// Drop records whose tier is excluded from search.
    pub fn filter_searchable(&self, records: Vec<MemoryRecord>) -> Vec<MemoryRecord> {
        records
            .into_iter()
            .filter(|r| !self.config(r.importance_tier).exclude_from_search)
            .collect()
    }

    /// Records that surface regardless of query relevance, in input order.
    pub fn always_surface_records<'a>(&self, records: &'a [MemoryRecord]) -> Vec<&'a MemoryRecord> {
        records
            .iter()
            .filter(|r| self.config(r.importance_tier).always_surface)
            .collect()
    }
}

/// Map arbitrary input onto a valid tier, defaulting to `normal`.
pub fn normalize_tier(input: &str) -> ImportanceTier {
    ImportanceTier::parse(input).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tier_returns_normal_config() {
        let registry = TierRegistry::standard();
        let normal = registry.config(ImportanceTier::Normal);
        assert_eq!(registry.get_tier_config("nonsense"), normal);
        assert_eq!(registry.get_tier_config(""), normal);
        assert_eq!(registry.get_tier_config("   "), normal);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TierRegistry::standard();
        assert_eq!(registry.get_tier_config("Constitutional").value, 1.0);
        assert_eq!(registry.get_tier_config("DEPRECATED").value, 0.1);
        assert_eq!(registry.get_tier_config("tEmPoRaRy").auto_expire_days, Some(7));
    }

    #[test]
    fn test_apply_tier_boost() {
        let registry = TierRegistry::standard();
        assert_eq!(registry.apply_tier_boost(0.5, "constitutional"), 1.5);
        assert_eq!(registry.apply_tier_boost(0.5, "deprecated"), 0.0);
        assert_eq!(registry.apply_tier_boost(0.5, "unknown"), 0.5);
        assert_eq!(registry.apply_tier_boost(f64::NAN, "critical"), 0.0);
        assert_eq!(registry.apply_tier_boost(f64::INFINITY, "critical"), 0.0);
    }

    #[test]
    fn test_only_constitutional_always_surfaces() {
        let registry = TierRegistry::standard();
        for tier in ImportanceTier::ALL {
            let config = registry.config(tier);
            let is_constitutional = tier == ImportanceTier::Constitutional;
            assert_eq!(config.always_surface, is_constitutional, "{tier}");
            assert_eq!(config.max_tokens.is_some(), is_constitutional, "{tier}");
        }
        assert_eq!(registry.get_max_tokens("constitutional"), Some(2000));
    }

    #[test]
    fn test_only_deprecated_is_excluded() {
        let registry = TierRegistry::standard();
        for tier in ImportanceTier::ALL {
            let config = registry.config(tier);
            let is_deprecated = tier == ImportanceTier::Deprecated;
            assert_eq!(config.exclude_from_search, is_deprecated, "{tier}");
            assert_eq!(config.search_boost == 0.0, is_deprecated, "{tier}");
        }
    }

    #[test]
    fn test_tiers_by_importance_descending() {
        let registry = TierRegistry::standard();
        let ordered = registry.get_tiers_by_importance();
        assert_eq!(ordered, ImportanceTier::ALL.to_vec());
        let values: Vec<f64> = ordered.iter().map(|t| registry.config(*t).value).collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_compare_tiers() {
        let registry = TierRegistry::standard();
        assert_eq!(registry.compare_tiers("critical", "normal"), Ordering::Less);
        assert_eq!(registry.compare_tiers("deprecated", "temporary"), Ordering::Greater);
        assert_eq!(registry.compare_tiers("garbage", "normal"), Ordering::Equal);
    }

    #[test]
    fn test_decay_flags() {
        let registry = TierRegistry::standard();
        assert!(!registry.allows_decay("constitutional"));
        assert!(registry.allows_decay("normal"));
        assert!(registry.allows_decay("temporary"));
        assert_eq!(registry.get_auto_expire_days("normal"), None);
    }

    #[test]
    fn test_filter_searchable_drops_deprecated() {
        let registry = TierRegistry::standard();
        let records = vec![
            MemoryRecord {
                id: "a".into(),
                importance_tier: ImportanceTier::Deprecated,
                ..Default::default()
            },
            MemoryRecord {
                id: "b".into(),
                ..Default::default()
            },
        ];
        let kept = registry.filter_searchable(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn test_always_surface_records() {
        let registry = TierRegistry::standard();
        let records = vec![
            MemoryRecord {
                id: "rule".into(),
                importance_tier: ImportanceTier::Constitutional,
                ..Default::default()
            },
            MemoryRecord::default(),
        ];
        let surfaced = registry.always_surface_records(&records);
        assert_eq!(surfaced.len(), 1);
        assert_eq!(surfaced[0].id, "rule");
    }
}
