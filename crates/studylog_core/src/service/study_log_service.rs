//! Study log query service.
//!
//! # Responsibility
//! - Clamp paging input and resolve enum text before calling the store.
//! - Merge partial updates onto the stored record.
//! - Translate stored records into response shapes.
//!
//! # Invariants
//! - Depends only on `StudyLogStore`; backends are interchangeable.
//! - `page >= 0` and `1 <= size <= 100` for every store call.
//! - Non-positive ids are rejected before reaching the store.

use crate::model::filter::StudyLogFilter;
use crate::model::page::{Page, PageRequest};
use crate::model::study_log::{Category, StudyLog, StudyLogId, Understanding};
use crate::service::dto::{
    CreateStudyLogRequest, SearchStudyLogsRequest, StudyLogDeleteResponse, StudyLogResponse,
    UpdateStudyLogRequest,
};
use crate::store::{StoreError, StudyLogStore};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error surfaced to the API layer.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(StudyLogId),
    InvalidArgument(String),
    Conflict(String),
    /// Infrastructure failure from the store.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "study log not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::InvalidArgument(message) => Self::InvalidArgument(message),
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Store(other),
        }
    }
}

/// Clamps raw paging input: page to `>= 0`, size to `1..=100`.
///
/// Missing values fall back to page 0 and `DEFAULT_PAGE_SIZE`.
pub fn normalize_page_request(page: Option<i64>, size: Option<i64>) -> PageRequest {
    let page = page.unwrap_or(0).clamp(0, i64::from(u32::MAX));
    let size = size
        .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
        .clamp(1, i64::from(MAX_PAGE_SIZE));
    // Both values are clamped into u32 range above.
    PageRequest::new(page as u32, size as u32)
}

/// Use-case facade over any `StudyLogStore` backend.
pub struct StudyLogService<S: StudyLogStore> {
    store: S,
    today: fn() -> NaiveDate,
}

impl<S: StudyLogStore> StudyLogService<S> {
    /// Creates a service that uses the local calendar for "today".
    pub fn new(store: S) -> Self {
        Self::with_clock(store, local_today)
    }

    /// Creates a service with an injected "today" source.
    pub fn with_clock(store: S, today: fn() -> NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_study_log(
        &self,
        request: &CreateStudyLogRequest,
    ) -> ServiceResult<StudyLogResponse> {
        let category = parse_category(&request.category)?;
        let understanding = parse_understanding(&request.understanding)?;
        let study_date = request.study_date.unwrap_or_else(self.today);
        self.ensure_not_future(study_date)?;

        let log = StudyLog::new(
            request.title.clone(),
            request.content.clone(),
            category,
            understanding,
            request.study_time_minutes,
            study_date,
        );
        let saved = self.store.save(&log)?;

        info!(
            "event=study_log_create module=service status=ok id={} category={}",
            saved.id.unwrap_or_default(),
            category
        );
        Ok(saved.into())
    }

    pub fn get_all_study_logs(&self) -> ServiceResult<Vec<StudyLogResponse>> {
        Ok(into_responses(self.store.find_all()?))
    }

    pub fn get_study_log(&self, id: StudyLogId) -> ServiceResult<StudyLogResponse> {
        ensure_positive_id(id)?;
        self.store
            .find_by_id(id)?
            .map(StudyLogResponse::from)
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn get_study_logs_by_date(&self, date: NaiveDate) -> ServiceResult<Vec<StudyLogResponse>> {
        Ok(into_responses(self.store.find_by_study_date(date)?))
    }

    pub fn get_study_logs_by_category(
        &self,
        category: &str,
    ) -> ServiceResult<Vec<StudyLogResponse>> {
        let category = parse_category(category)?;
        Ok(into_responses(self.store.find_by_category(category)?))
    }

    pub fn count_study_logs(&self) -> ServiceResult<u64> {
        Ok(self.store.count()?)
    }

    /// Counts logs in one category; blank text counts nothing.
    pub fn count_study_logs_by_category(&self, category: &str) -> ServiceResult<u64> {
        match parse_optional_category(Some(category))? {
            Some(category) => Ok(self.store.count_by_category(category)?),
            None => Ok(0),
        }
    }

    pub fn get_study_logs_with_paging(
        &self,
        page: Option<i64>,
        size: Option<i64>,
    ) -> ServiceResult<Page<StudyLogResponse>> {
        let request = normalize_page_request(page, size);
        let page = self.store.find_all_with_paging(request)?;
        Ok(page.map(StudyLogResponse::from))
    }

    /// Pages through one category; blank text yields an empty page.
    pub fn get_study_logs_by_category_with_paging(
        &self,
        category: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> ServiceResult<Page<StudyLogResponse>> {
        let request = normalize_page_request(page, size);
        let Some(category) = parse_optional_category(Some(category))? else {
            return Ok(Page::empty(request));
        };
        let page = self.store.find_by_category_with_paging(category, request)?;
        Ok(page.map(StudyLogResponse::from))
    }

    pub fn search_study_logs_with_paging(
        &self,
        search: &SearchStudyLogsRequest,
        page: Option<i64>,
        size: Option<i64>,
    ) -> ServiceResult<Page<StudyLogResponse>> {
        let request = normalize_page_request(page, size);
        let filter = StudyLogFilter {
            title_keyword: search.title_keyword.clone(),
            category: parse_optional_category(search.category.as_deref())?,
            start_date: search.start_date,
            end_date: search.end_date,
        };
        let page = self.store.search_with_paging(&filter, request)?;
        Ok(page.map(StudyLogResponse::from))
    }

    /// Applies the non-`None` fields of `request` to an existing log.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `InvalidArgument` when the request carries no fields, names an
    ///   unknown enum member, or moves the study date into the future.
    pub fn update_study_log(
        &self,
        id: StudyLogId,
        request: &UpdateStudyLogRequest,
    ) -> ServiceResult<StudyLogResponse> {
        ensure_positive_id(id)?;
        let Some(existing) = self.store.find_by_id(id)? else {
            warn!("event=study_log_update module=service status=error id={id} error_code=not_found");
            return Err(ServiceError::NotFound(id));
        };

        if request.has_no_updates() {
            return Err(ServiceError::InvalidArgument(
                "update request has no fields to change".to_string(),
            ));
        }

        let category = request.category.as_deref().map(parse_category).transpose()?;
        let understanding = request
            .understanding
            .as_deref()
            .map(parse_understanding)
            .transpose()?;
        if let Some(study_date) = request.study_date {
            self.ensure_not_future(study_date)?;
        }

        let merged = merge_update(existing, request, category, understanding);
        let updated = self.store.update(&merged)?;

        info!("event=study_log_update module=service status=ok id={id}");
        Ok(updated.into())
    }

    pub fn delete_study_log(&self, id: StudyLogId) -> ServiceResult<StudyLogDeleteResponse> {
        ensure_positive_id(id)?;
        if !self.store.delete_by_id(id)? {
            warn!("event=study_log_delete module=service status=error id={id} error_code=not_found");
            return Err(ServiceError::NotFound(id));
        }

        info!("event=study_log_delete module=service status=ok id={id}");
        Ok(StudyLogDeleteResponse::of(id))
    }

    fn ensure_not_future(&self, study_date: NaiveDate) -> ServiceResult<()> {
        let today = (self.today)();
        if study_date > today {
            return Err(ServiceError::InvalidArgument(format!(
                "study date {study_date} is in the future (today is {today})"
            )));
        }
        Ok(())
    }
}

fn merge_update(
    mut log: StudyLog,
    request: &UpdateStudyLogRequest,
    category: Option<Category>,
    understanding: Option<Understanding>,
) -> StudyLog {
    if let Some(title) = &request.title {
        log.title = title.clone();
    }
    if let Some(content) = &request.content {
        log.content = content.clone();
    }
    if let Some(category) = category {
        log.category = category;
    }
    if let Some(understanding) = understanding {
        log.understanding = understanding;
    }
    if let Some(minutes) = request.study_time_minutes {
        log.study_time_minutes = minutes;
    }
    if let Some(study_date) = request.study_date {
        log.study_date = study_date;
    }
    log
}

fn into_responses(logs: Vec<StudyLog>) -> Vec<StudyLogResponse> {
    logs.into_iter().map(StudyLogResponse::from).collect()
}

fn parse_category(value: &str) -> ServiceResult<Category> {
    value
        .parse::<Category>()
        .map_err(|err| ServiceError::InvalidArgument(err.to_string()))
}

fn parse_optional_category(value: Option<&str>) -> ServiceResult<Option<Category>> {
    match value {
        Some(text) if !text.trim().is_empty() => parse_category(text).map(Some),
        _ => Ok(None),
    }
}

fn parse_understanding(value: &str) -> ServiceResult<Understanding> {
    value
        .parse::<Understanding>()
        .map_err(|err| ServiceError::InvalidArgument(err.to_string()))
}

fn ensure_positive_id(id: StudyLogId) -> ServiceResult<()> {
    if id <= 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "study log id must be positive, got {id}"
        )));
    }
    Ok(())
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_request, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
    use crate::model::page::PageRequest;

    #[test]
    fn page_request_defaults_when_missing() {
        assert_eq!(
            normalize_page_request(None, None),
            PageRequest::new(0, DEFAULT_PAGE_SIZE)
        );
    }

    #[test]
    fn page_request_clamps_out_of_range_values() {
        assert_eq!(normalize_page_request(Some(-3), Some(0)), PageRequest::new(0, 1));
        assert_eq!(
            normalize_page_request(Some(2), Some(1_000)),
            PageRequest::new(2, MAX_PAGE_SIZE)
        );
        assert_eq!(
            normalize_page_request(Some(i64::MAX), Some(-1)),
            PageRequest::new(u32::MAX, 1)
        );
    }
}
