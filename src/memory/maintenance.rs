//! Auto-expiry report.
//!
//! Tiers with `auto_expire_days` (only `temporary` in the standard table) mark records as
//! expired once they are old enough. This module only reports; deletion belongs to the
//! storage layer that owns the records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decay::days_between;
use super::tiers::TierRegistry;
use super::types::{ImportanceTier, MemoryRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryCandidate {
    pub id: String,
    pub tier: ImportanceTier,
    pub age_days: f64,
    pub auto_expire_days: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// Records whose tier auto-expires and whose age has reached the tier's limit, oldest first.
///
/// Age is measured from `created_at`, falling back to `updated_at`. Records with neither
/// timestamp are never reported.
pub fn find_expired(
    records: &[MemoryRecord],
    tiers: &TierRegistry,
    now: DateTime<Utc>,
) -> Vec<ExpiryCandidate> {
    let mut expired: Vec<ExpiryCandidate> = records
        .iter()
        .filter_map(|record| {
            let limit = tiers.config(record.importance_tier).auto_expire_days?;
            let born = record.created_at.or(record.updated_at)?;
            let age_days = days_between(born, now);
            (age_days >= f64::from(limit)).then(|| ExpiryCandidate {
                id: record.id.clone(),
                tier: record.importance_tier,
                age_days,
                auto_expire_days: limit,
                created_at: record.created_at,
            })
        })
        .collect();

    expired.sort_by(|a, b| b.age_days.total_cmp(&a.age_days));
    tracing::debug!(
        scanned = records.len(),
        expired = expired.len(),
        "expiry scan complete"
    );
    expired
}
