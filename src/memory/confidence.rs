//! Validation-driven confidence and tier promotion.
//!
//! Each validation nudges a record's confidence (+0.1 when useful, −0.05 when not) and bumps
//! its validation count. Once confidence reaches 0.9 with at least five validations, a
//! record below the top tiers is promoted to `critical`.
//!
//! The whole read-modify-write runs inside [`ValidationStore::run`], which scopes a
//! transaction to a single record id. Validations of the same record serialize; different
//! records never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{ImportanceTier, MemoryRecord};
use crate::error::{MemoryError, Result};

pub const CONFIDENCE_INCREMENT: f64 = 0.1;
pub const CONFIDENCE_DECREMENT: f64 = 0.05;
pub const PROMOTION_CONFIDENCE: f64 = 0.9;
pub const PROMOTION_VALIDATIONS: u32 = 5;

/// The slice of a record the tracker reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationState {
    pub confidence: f64,
    pub validation_count: u32,
    pub tier: ImportanceTier,
}

/// The fields the tracker writes back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationUpdate {
    pub confidence: f64,
    pub validation_count: u32,
    pub tier: ImportanceTier,
    pub updated_at: DateTime<Utc>,
}

/// Operations available inside a single-record transaction.
pub trait ValidationTx {
    fn fetch(&mut self, id: &str) -> Result<Option<ValidationState>>;
    fn update(&mut self, id: &str, update: &ValidationUpdate) -> Result<()>;
}

/// Persistence seam for the tracker.
///
/// `run` must execute `f` atomically with respect to other `run` calls on the same `id`:
/// either every update `f` made is committed, or none is (when `f` returns an error).
pub trait ValidationStore {
    fn run<T, F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn ValidationTx) -> Result<T>;
}

/// Result of [`record_validation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub confidence: f64,
    pub validation_count: u32,
    pub promotion_eligible: bool,
    pub was_promoted: bool,
}

/// Read-only view returned by [`get_confidence_info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInfo {
    pub confidence: f64,
    pub validation_count: u32,
    pub tier: ImportanceTier,
    pub promotion_eligible: bool,
}

/// Whether a record meets the thresholds for automatic promotion.
pub fn check_promotion_eligibility(state: &ValidationState) -> bool {
    state.confidence >= PROMOTION_CONFIDENCE
        && state.validation_count >= PROMOTION_VALIDATIONS
        && !state.tier.is_top_tier()
}

/// Confidence after one validation, rounded to 6 decimals so repeated steps land exactly on
/// the thresholds.
pub fn adjust_confidence(current: f64, was_useful: bool) -> f64 {
    let current = if current.is_finite() {
        current.clamp(0.0, 1.0)
    } else {
        super::types::DEFAULT_CONFIDENCE
    };
    let next = if was_useful {
        (current + CONFIDENCE_INCREMENT).min(1.0)
    } else {
        (current - CONFIDENCE_DECREMENT).max(0.0)
    };
    (next * 1e6).round() / 1e6
}

/// Record one validation outcome and auto-promote when eligible, atomically.
pub fn record_validation<S: ValidationStore>(
    store: &S,
    id: &str,
    was_useful: bool,
) -> Result<ValidationOutcome> {
    let outcome = store.run(id, |tx| {
        let state = tx
            .fetch(id)?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;

        let mut next = ValidationState {
            confidence: adjust_confidence(state.confidence, was_useful),
            validation_count: state.validation_count.saturating_add(1),
            tier: state.tier,
        };

        let promotion_eligible = check_promotion_eligibility(&next);
        if promotion_eligible {
            next.tier = ImportanceTier::Critical;
        }

        tx.update(
            id,
            &ValidationUpdate {
                confidence: next.confidence,
                validation_count: next.validation_count,
                tier: next.tier,
                updated_at: Utc::now(),
            },
        )?;

        Ok(ValidationOutcome {
            confidence: next.confidence,
            validation_count: next.validation_count,
            promotion_eligible,
            was_promoted: promotion_eligible,
        })
    })?;

    if outcome.was_promoted {
        tracing::info!(
            id,
            confidence = outcome.confidence,
            validations = outcome.validation_count,
            "memory promoted to critical"
        );
    } else {
        tracing::debug!(
            id,
            was_useful,
            confidence = outcome.confidence,
            validations = outcome.validation_count,
            "validation recorded"
        );
    }
    Ok(outcome)
}

/// Promote a record to `critical` directly.
///
/// Returns `Ok(false)` when the record is already critical or constitutional, and
/// [`MemoryError::IneligiblePromotion`] when it has not met the thresholds.
pub fn promote_to_critical<S: ValidationStore>(store: &S, id: &str) -> Result<bool> {
    let promoted = store.run(id, |tx| {
        let state = tx
            .fetch(id)?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;

        if state.tier.is_top_tier() {
            return Ok(false);
        }
        if !check_promotion_eligibility(&state) {
            return Err(MemoryError::IneligiblePromotion {
                id: id.to_string(),
                confidence: state.confidence,
                required_confidence: PROMOTION_CONFIDENCE,
                validation_count: state.validation_count,
                required_validations: PROMOTION_VALIDATIONS,
            });
        }

        tx.update(
            id,
            &ValidationUpdate {
                confidence: state.confidence,
                validation_count: state.validation_count,
                tier: ImportanceTier::Critical,
                updated_at: Utc::now(),
            },
        )?;
        Ok(true)
    })?;

    if promoted {
        tracing::info!(id, "memory promoted to critical");
    }
    Ok(promoted)
}

/// Current confidence state without mutating anything.
pub fn get_confidence_info<S: ValidationStore>(store: &S, id: &str) -> Result<ConfidenceInfo> {
    store.run(id, |tx| {
        let state = tx
            .fetch(id)?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        Ok(ConfidenceInfo {
            promotion_eligible: check_promotion_eligibility(&state),
            confidence: state.confidence,
            validation_count: state.validation_count,
            tier: state.tier,
        })
    })
}

// ── In-memory store ──────────────────────────────────────────────────────────

/// Process-local store with one lock per record.
///
/// Updates are applied to a working copy and only written back when the transaction body
/// succeeds.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Arc<Mutex<MemoryRecord>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Replacing writes through the existing slot's lock, so a
    /// transaction running on that record finishes first and the replacement lands after it.
    pub fn insert(&self, record: MemoryRecord) -> Result<()> {
        let existing = {
            let mut records = self.records.write().map_err(|_| MemoryError::LockPoisoned)?;
            match records.get(&record.id) {
                Some(slot) => Arc::clone(slot),
                None => {
                    records.insert(record.id.clone(), Arc::new(Mutex::new(record)));
                    return Ok(());
                }
            }
        };
        let mut current = existing.lock().map_err(|_| MemoryError::LockPoisoned)?;
        *current = record;
        Ok(())
    }

    /// Snapshot of a record.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>> {
        let slot = self.slot(id)?;
        match slot {
            Some(slot) => {
                let record = slot.lock().map_err(|_| MemoryError::LockPoisoned)?;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    fn slot(&self, id: &str) -> Result<Option<Arc<Mutex<MemoryRecord>>>> {
        let records = self.records.read().map_err(|_| MemoryError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }
}

struct InMemoryTx<'a> {
    scope: &'a str,
    working: Option<MemoryRecord>,
}

impl InMemoryTx<'_> {
    fn check_scope(&self, id: &str) -> Result<()> {
        if id == self.scope {
            Ok(())
        } else {
            Err(MemoryError::Storage(format!(
                "transaction scoped to {} cannot touch {id}",
                self.scope
            )))
        }
    }
}

impl ValidationTx for InMemoryTx<'_> {
    fn fetch(&mut self, id: &str) -> Result<Option<ValidationState>> {
        self.check_scope(id)?;
        Ok(self.working.as_ref().map(|r| ValidationState {
            confidence: r.confidence(),
            validation_count: r.validation_count,
            tier: r.importance_tier,
        }))
    }

    fn update(&mut self, id: &str, update: &ValidationUpdate) -> Result<()> {
        self.check_scope(id)?;
        let record = self
            .working
            .as_mut()
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        record.confidence = update.confidence;
        record.validation_count = update.validation_count;
        record.importance_tier = update.tier;
        record.updated_at = Some(update.updated_at);
        Ok(())
    }
}

impl ValidationStore for InMemoryStore {
    fn run<T, F>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn ValidationTx) -> Result<T>,
    {
        let Some(slot) = self.slot(id)? else {
            let mut tx = InMemoryTx {
                scope: id,
                working: None,
            };
            return f(&mut tx);
        };

        let mut guard = slot.lock().map_err(|_| MemoryError::LockPoisoned)?;
        let mut tx = InMemoryTx {
            scope: id,
            working: Some(guard.clone()),
        };
        let value = f(&mut tx)?;
        if let Some(committed) = tx.working {
            *guard = committed;
        }
        Ok(value)
    }
}
