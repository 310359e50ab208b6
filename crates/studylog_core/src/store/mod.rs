//! Storage-agnostic study log store contract and its backends.
//!
//! # Responsibility
//! - Define the single `StudyLogStore` trait every backend implements.
//! - Define the error taxonomy shared by all backends.
//!
//! # Invariants
//! - All list results are ordered `study_date DESC, id DESC`.
//! - Paginated results never fail because an offset is out of range.
//! - Ids are positive, assigned once, and never reused.
//! - Writes call `StudyLog::validate()` before touching storage.

pub mod memory_store;
pub mod sqlite_store;

use crate::db::DbError;
use crate::model::filter::StudyLogFilter;
use crate::model::page::{Page, PageRequest};
use crate::model::study_log::{Category, StudyLog, StudyLogId, StudyLogValidationError};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use memory_store::{MemoryStoreConfig, MemoryStudyLogStore};
pub use sqlite_store::SqliteStudyLogStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by a store operation.
///
/// `NotFound`, `InvalidArgument` and `Conflict` are domain failures.
/// `Db` and `InvalidData` are infrastructure failures and are never
/// reinterpreted as domain failures.
#[derive(Debug)]
pub enum StoreError {
    NotFound(StudyLogId),
    InvalidArgument(String),
    /// Reserved for uniqueness constraints.
    Conflict(String),
    Db(DbError),
    InvalidData(String),
    /// Every positive id up to `i64::MAX` has been handed out.
    IdSequenceExhausted,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "study log not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted study log data: {message}"),
            Self::IdSequenceExhausted => write!(f, "study log id sequence is exhausted"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<StudyLogValidationError> for StoreError {
    fn from(value: StudyLogValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// Persistence contract for study logs.
///
/// Implementations must be observably identical: same ordering, same
/// filtering, same pagination and same error kinds for the same inputs.
pub trait StudyLogStore: Send + Sync {
    /// Inserts (id unset) or upserts by id, returning the persisted copy.
    fn save(&self, log: &StudyLog) -> StoreResult<StudyLog>;
    /// Replaces every caller-owned field of an existing record.
    ///
    /// Fails with `NotFound` when the id does not exist.
    fn update(&self, log: &StudyLog) -> StoreResult<StudyLog>;
    fn find_by_id(&self, id: StudyLogId) -> StoreResult<Option<StudyLog>>;
    fn exists_by_id(&self, id: StudyLogId) -> StoreResult<bool>;
    /// Returns `true` iff a record existed and was removed.
    fn delete_by_id(&self, id: StudyLogId) -> StoreResult<bool>;
    /// Removes every record. Intended for tests and resets.
    fn delete_all(&self) -> StoreResult<()>;
    fn count(&self) -> StoreResult<u64>;
    fn count_by_category(&self, category: Category) -> StoreResult<u64>;
    fn find_all(&self) -> StoreResult<Vec<StudyLog>>;
    fn find_by_study_date(&self, date: NaiveDate) -> StoreResult<Vec<StudyLog>>;
    fn find_by_category(&self, category: Category) -> StoreResult<Vec<StudyLog>>;
    fn find_all_with_paging(&self, request: PageRequest) -> StoreResult<Page<StudyLog>>;
    fn find_by_category_with_paging(
        &self,
        category: Category,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>>;
    fn search_with_paging(
        &self,
        filter: &StudyLogFilter,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>>;
}

impl<S: StudyLogStore + ?Sized> StudyLogStore for Box<S> {
    fn save(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        (**self).save(log)
    }

    fn update(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        (**self).update(log)
    }

    fn find_by_id(&self, id: StudyLogId) -> StoreResult<Option<StudyLog>> {
        (**self).find_by_id(id)
    }

    fn exists_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        (**self).exists_by_id(id)
    }

    fn delete_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        (**self).delete_by_id(id)
    }

    fn delete_all(&self) -> StoreResult<()> {
        (**self).delete_all()
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }

    fn count_by_category(&self, category: Category) -> StoreResult<u64> {
        (**self).count_by_category(category)
    }

    fn find_all(&self) -> StoreResult<Vec<StudyLog>> {
        (**self).find_all()
    }

    fn find_by_study_date(&self, date: NaiveDate) -> StoreResult<Vec<StudyLog>> {
        (**self).find_by_study_date(date)
    }

    fn find_by_category(&self, category: Category) -> StoreResult<Vec<StudyLog>> {
        (**self).find_by_category(category)
    }

    fn find_all_with_paging(&self, request: PageRequest) -> StoreResult<Page<StudyLog>> {
        (**self).find_all_with_paging(request)
    }

    fn find_by_category_with_paging(
        &self,
        category: Category,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        (**self).find_by_category_with_paging(category, request)
    }

    fn search_with_paging(
        &self,
        filter: &StudyLogFilter,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        (**self).search_with_paging(filter, request)
    }
}

/// Canonical list order: newest study date first, ties broken by id.
pub fn canonical_order(a: &StudyLog, b: &StudyLog) -> Ordering {
    b.study_date
        .cmp(&a.study_date)
        .then_with(|| b.id.cmp(&a.id))
}

/// Current wall clock in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Next `updated_at` for a record last touched at `previous`.
///
/// Strictly greater than `previous` even when the clock has not advanced.
pub(crate) fn next_updated_at(previous: i64, now: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

pub(crate) fn ensure_page_size(request: PageRequest) -> StoreResult<()> {
    if request.size == 0 {
        return Err(StoreError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
