//! Memory relevance scoring: tiered importance, recency decay, folder aggregation, and
//! validation-driven promotion.
//!
//! Given a candidate set of stored knowledge entries ("memories") with an externally computed
//! similarity, memrank computes a composite ranking score per entry, applies tier policy for
//! decay and expiry, aggregates scores per folder with archive-path penalties, and tracks
//! validation feedback that can promote an entry to the `critical` tier.
//!
//! | Tier | Value | Decays | Notes |
//! |------|-------|--------|-------|
//! | **constitutional** | 1.0 | never | always surfaced, 2000-token budget |
//! | **critical** | 0.9 | no | promotion target |
//! | **important** | 0.8 | no | |
//! | **normal** | 0.5 | yes | default |
//! | **temporary** | 0.3 | yes | expires after 7 days |
//! | **deprecated** | 0.1 | no | excluded from search |
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and migrations for the reference store
//! - [`error`] — Library error type
//! - [`memory`] — Tiers, decay, scoring models, pattern alignment, confidence tracking,
//!   folder aggregation, and expiry

pub mod config;
pub mod db;
pub mod error;
pub mod memory;
