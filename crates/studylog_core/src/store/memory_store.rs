//! In-process study log store.
//!
//! # Responsibility
//! - Keep study logs in a keyed map owned by one store instance.
//! - Answer every read by building a fresh filtered, sorted view.
//!
//! # Invariants
//! - Id allocation happens under the map write lock, so generated ids and
//!   explicit-id upserts never collide.
//! - `last_id` never wraps; once it reaches `i64::MAX` generated saves fail
//!   with `IdSequenceExhausted`.
//! - The sequence only moves forward unless `reset_sequence_on_clear` is
//!   explicitly enabled.

use crate::model::filter::StudyLogFilter;
use crate::model::page::{paginate, Page, PageRequest};
use crate::model::study_log::{Category, StudyLog, StudyLogId};
use crate::store::{
    canonical_order, ensure_page_size, next_updated_at, now_epoch_ms, StoreError, StoreResult,
    StudyLogStore,
};
use chrono::NaiveDate;
use log::{debug, info};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// `last_id` of a fresh store; the first generated id is 1.
const NO_ID_ISSUED: StudyLogId = 0;

/// Options for `MemoryStudyLogStore`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Restart ids at 1 after `delete_all`.
    ///
    /// Breaks id monotonicity across a clear. Only for test fixtures that
    /// want predictable ids.
    pub reset_sequence_on_clear: bool,
}

/// `StudyLogStore` backed by a `HashMap` guarded by a read/write lock.
#[derive(Debug)]
pub struct MemoryStudyLogStore {
    records: RwLock<HashMap<StudyLogId, StudyLog>>,
    /// Highest id stored so far, generated or explicit.
    last_id: AtomicI64,
    config: MemoryStoreConfig,
}

impl Default for MemoryStudyLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStudyLogStore {
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            last_id: AtomicI64::new(NO_ID_ISSUED),
            config,
        }
    }

    /// Id the next generated insert will receive, or `None` once the
    /// sequence is exhausted.
    pub fn next_id(&self) -> Option<StudyLogId> {
        self.last_id.load(Ordering::SeqCst).checked_add(1)
    }

    fn allocate_id(&self) -> StoreResult<StudyLogId> {
        self.last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| last + 1)
            .map_err(|_| StoreError::IdSequenceExhausted)
    }

    fn collect_sorted(&self, filter: &StudyLogFilter) -> Vec<StudyLog> {
        let records = self.records.read();
        let mut matched: Vec<StudyLog> = records
            .values()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        drop(records);

        matched.sort_by(canonical_order);
        matched
    }

    fn count_matching(&self, filter: &StudyLogFilter) -> u64 {
        self.records
            .read()
            .values()
            .filter(|log| filter.matches(log))
            .count() as u64
    }

    fn page_matching(
        &self,
        filter: &StudyLogFilter,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        ensure_page_size(request)?;
        Ok(paginate(self.collect_sorted(filter), request))
    }
}

impl StudyLogStore for MemoryStudyLogStore {
    fn save(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        log.validate()?;

        let now = now_epoch_ms();
        let mut records = self.records.write();
        let mut stored = log.clone();

        let id = match log.id {
            Some(id) => {
                // Generated ids must stay ahead of every explicit one.
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.allocate_id()?,
        };
        stored.id = Some(id);

        match records.get(&id) {
            Some(existing) => {
                stored.created_at = existing.created_at;
                stored.updated_at = Some(next_updated_at(
                    existing.updated_at.unwrap_or(now),
                    now,
                ));
            }
            None => {
                stored.created_at = Some(now);
                stored.updated_at = Some(now);
            }
        }

        records.insert(id, stored.clone());
        drop(records);

        debug!("event=study_log_save module=store backend=memory status=ok id={id}");
        Ok(stored)
    }

    fn update(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        let id = log.id.ok_or_else(|| {
            StoreError::InvalidArgument("study log to update has no id".to_string())
        })?;
        log.validate()?;

        let now = now_epoch_ms();
        let mut records = self.records.write();
        let existing = records.get(&id).ok_or(StoreError::NotFound(id))?;

        let mut stored = log.clone();
        stored.created_at = existing.created_at;
        stored.updated_at = Some(next_updated_at(existing.updated_at.unwrap_or(now), now));
        records.insert(id, stored.clone());
        drop(records);

        debug!("event=study_log_update module=store backend=memory status=ok id={id}");
        Ok(stored)
    }

    fn find_by_id(&self, id: StudyLogId) -> StoreResult<Option<StudyLog>> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn exists_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        Ok(self.records.read().contains_key(&id))
    }

    fn delete_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        let removed = self.records.write().remove(&id).is_some();
        debug!(
            "event=study_log_delete module=store backend=memory status=ok id={id} removed={removed}"
        );
        Ok(removed)
    }

    fn delete_all(&self) -> StoreResult<()> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        if self.config.reset_sequence_on_clear {
            self.last_id.store(NO_ID_ISSUED, Ordering::SeqCst);
        }
        drop(records);

        info!(
            "event=study_log_clear module=store backend=memory status=ok removed={} sequence_reset={}",
            removed, self.config.reset_sequence_on_clear
        );
        Ok(())
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.records.read().len() as u64)
    }

    fn count_by_category(&self, category: Category) -> StoreResult<u64> {
        Ok(self.count_matching(&StudyLogFilter::by_category(category)))
    }

    fn find_all(&self) -> StoreResult<Vec<StudyLog>> {
        Ok(self.collect_sorted(&StudyLogFilter::default()))
    }

    fn find_by_study_date(&self, date: NaiveDate) -> StoreResult<Vec<StudyLog>> {
        Ok(self.collect_sorted(&StudyLogFilter::on_date(date)))
    }

    fn find_by_category(&self, category: Category) -> StoreResult<Vec<StudyLog>> {
        Ok(self.collect_sorted(&StudyLogFilter::by_category(category)))
    }

    fn find_all_with_paging(&self, request: PageRequest) -> StoreResult<Page<StudyLog>> {
        self.page_matching(&StudyLogFilter::default(), request)
    }

    fn find_by_category_with_paging(
        &self,
        category: Category,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        self.page_matching(&StudyLogFilter::by_category(category), request)
    }

    fn search_with_paging(
        &self,
        filter: &StudyLogFilter,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        self.page_matching(filter, request)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStoreConfig, MemoryStudyLogStore};
    use crate::model::study_log::{Category, StudyLog, Understanding};
    use crate::store::StudyLogStore;
    use chrono::NaiveDate;

    fn draft(title: &str) -> StudyLog {
        StudyLog::new(
            title,
            "notes",
            Category::Algorithm,
            Understanding::Normal,
            60,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
    }

    #[test]
    fn explicit_id_upsert_advances_sequence() {
        let store = MemoryStudyLogStore::new();
        let mut explicit = draft("explicit");
        explicit.id = Some(10);
        store.save(&explicit).unwrap();

        let generated = store.save(&draft("generated")).unwrap();
        assert_eq!(generated.id, Some(11));
    }

    #[test]
    fn delete_all_keeps_sequence_by_default() {
        let store = MemoryStudyLogStore::new();
        store.save(&draft("a")).unwrap();
        store.save(&draft("b")).unwrap();
        store.delete_all().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.save(&draft("c")).unwrap().id, Some(3));
    }

    #[test]
    fn delete_all_resets_sequence_when_opted_in() {
        let store = MemoryStudyLogStore::with_config(MemoryStoreConfig {
            reset_sequence_on_clear: true,
        });
        store.save(&draft("a")).unwrap();
        store.delete_all().unwrap();
        assert_eq!(store.next_id(), Some(1));
        assert_eq!(store.save(&draft("b")).unwrap().id, Some(1));
    }

    #[test]
    fn returned_copies_are_independent_of_stored_state() {
        let store = MemoryStudyLogStore::new();
        let mut saved = store.save(&draft("original")).unwrap();
        saved.title = "mutated locally".to_string();

        let reloaded = store.find_by_id(saved.id.unwrap()).unwrap().unwrap();
        assert_eq!(reloaded.title, "original");
    }

    #[test]
    fn upsert_of_existing_id_keeps_created_at() {
        let store = MemoryStudyLogStore::new();
        let first = store.save(&draft("v1")).unwrap();

        let mut second = first.clone();
        second.title = "v2".to_string();
        let resaved = store.save(&second).unwrap();

        assert_eq!(resaved.created_at, first.created_at);
        assert!(resaved.updated_at > first.updated_at);
        assert_eq!(store.count().unwrap(), 1);
    }
}
