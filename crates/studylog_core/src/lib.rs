//! Core domain logic for the study log record store.
//! This crate is the single source of truth for record invariants,
//! listing order and paging semantics across every backend.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{open_store, BackendConfig, LogConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::filter::StudyLogFilter;
pub use model::page::{Page, PageRequest};
pub use model::study_log::{
    Category, ParseEnumError, StudyLog, StudyLogId, StudyLogValidationError, Understanding,
};
pub use service::dto::{
    CreateStudyLogRequest, SearchStudyLogsRequest, StudyLogDeleteResponse, StudyLogResponse,
    UpdateStudyLogRequest,
};
pub use service::study_log_service::{
    normalize_page_request, ServiceError, ServiceResult, StudyLogService,
};
pub use store::{
    MemoryStoreConfig, MemoryStudyLogStore, SqliteStudyLogStore, StoreError, StoreResult,
    StudyLogStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
