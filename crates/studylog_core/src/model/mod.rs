//! Domain model for study log records.
//!
//! # Responsibility
//! - Define the canonical record, its enumerations, search criteria and the
//!   pagination envelope used by every store backend.
//!
//! # Invariants
//! - Every persisted record is identified by a positive `StudyLogId`.
//! - Ordering of every list result is `study_date DESC, id DESC`.

pub mod filter;
pub mod page;
pub mod study_log;
