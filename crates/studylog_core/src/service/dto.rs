//! Request and response shapes exchanged with the (external) API layer.
//!
//! Requests carry enum values as text; the service resolves them.
//! Responses flatten enum display metadata for presentation.

use crate::model::study_log::{StudyLog, StudyLogId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DELETE_SUCCESS_MESSAGE: &str = "Study log deleted successfully.";

/// Input for creating one study log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyLogRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub understanding: String,
    #[serde(rename = "studyTime")]
    pub study_time_minutes: u32,
    /// Defaults to today when absent.
    #[serde(default)]
    pub study_date: Option<NaiveDate>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStudyLogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub understanding: Option<String>,
    #[serde(rename = "studyTime")]
    pub study_time_minutes: Option<u32>,
    pub study_date: Option<NaiveDate>,
}

impl UpdateStudyLogRequest {
    pub fn has_no_updates(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.understanding.is_none()
            && self.study_time_minutes.is_none()
            && self.study_date.is_none()
    }
}

/// Search criteria in text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchStudyLogsRequest {
    pub title_keyword: Option<String>,
    /// Case-insensitive category name; blank means "any".
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogResponse {
    pub id: StudyLogId,
    pub title: String,
    pub content: String,
    pub category: &'static str,
    pub category_icon: &'static str,
    pub understanding: &'static str,
    pub understanding_emoji: &'static str,
    #[serde(rename = "studyTime")]
    pub study_time_minutes: u32,
    pub study_date: NaiveDate,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<StudyLog> for StudyLogResponse {
    /// Expects a persisted record; unset id/timestamps map to zero.
    fn from(log: StudyLog) -> Self {
        Self {
            id: log.id.unwrap_or_default(),
            title: log.title,
            content: log.content,
            category: log.category.name(),
            category_icon: log.category.icon(),
            understanding: log.understanding.name(),
            understanding_emoji: log.understanding.emoji(),
            study_time_minutes: log.study_time_minutes,
            study_date: log.study_date,
            created_at: log.created_at.unwrap_or_default(),
            updated_at: log.updated_at.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogDeleteResponse {
    pub message: &'static str,
    pub deleted_id: StudyLogId,
}

impl StudyLogDeleteResponse {
    pub fn of(deleted_id: StudyLogId) -> Self {
        Self {
            message: DELETE_SUCCESS_MESSAGE,
            deleted_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StudyLogDeleteResponse, StudyLogResponse, UpdateStudyLogRequest};
    use crate::model::study_log::{Category, StudyLog, Understanding};
    use chrono::NaiveDate;

    #[test]
    fn update_request_detects_empty_payload() {
        assert!(UpdateStudyLogRequest::default().has_no_updates());
        let request: UpdateStudyLogRequest =
            serde_json::from_str(r#"{"studyTime": 30}"#).unwrap();
        assert!(!request.has_no_updates());
        assert_eq!(request.study_time_minutes, Some(30));
    }

    #[test]
    fn response_flattens_enum_metadata() {
        let mut log = StudyLog::new(
            "Lambdas",
            "Functional interfaces",
            Category::Java,
            Understanding::VeryGood,
            90,
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        );
        log.id = Some(7);
        log.created_at = Some(1_000);
        log.updated_at = Some(2_000);

        let json = serde_json::to_value(StudyLogResponse::from(log)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["category"], "JAVA");
        assert_eq!(json["categoryIcon"], Category::Java.icon());
        assert_eq!(json["understandingEmoji"], "😎");
        assert_eq!(json["studyTime"], 90);
        assert_eq!(json["studyDate"], "2025-01-03");
        assert_eq!(json["updatedAt"], 2_000);
    }

    #[test]
    fn delete_response_carries_id() {
        let json = serde_json::to_value(StudyLogDeleteResponse::of(4)).unwrap();
        assert_eq!(json["deletedId"], 4);
        assert!(json["message"].as_str().unwrap().contains("deleted"));
    }
}
