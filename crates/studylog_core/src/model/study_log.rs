//! Study log domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted by every store backend.
//! - Own the fixed `Category` / `Understanding` enumerations and their
//!   display metadata.
//!
//! # Invariants
//! - `id` is `None` until the first save and never changes afterwards.
//! - `created_at` / `updated_at` are written by stores only.
//! - `updated_at >= created_at` for every persisted record.
//! - `study_date` years stay within `MIN_STUDY_YEAR..=MAX_STUDY_YEAR`, so
//!   its four-digit `%Y-%m-%d` text sorts chronologically.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned identifier. Always positive once persisted.
pub type StudyLogId = i64;

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MAX_CHARS: usize = 5000;
pub const STUDY_TIME_MAX_MINUTES: u32 = 1440;
pub const MIN_STUDY_YEAR: i32 = 0;
pub const MAX_STUDY_YEAR: i32 = 9999;

/// Whether `date` falls in the storable year range.
pub fn is_storable_study_date(date: NaiveDate) -> bool {
    (MIN_STUDY_YEAR..=MAX_STUDY_YEAR).contains(&date.year())
}

/// Subject area of a study log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Java,
    Spring,
    Jpa,
    Database,
    Algorithm,
    Cs,
    Network,
    Git,
    Etc,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Java,
        Category::Spring,
        Category::Jpa,
        Category::Database,
        Category::Algorithm,
        Category::Cs,
        Category::Network,
        Category::Git,
        Category::Etc,
    ];

    /// Canonical upper-case name, also used as the persisted column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Java => "JAVA",
            Self::Spring => "SPRING",
            Self::Jpa => "JPA",
            Self::Database => "DATABASE",
            Self::Algorithm => "ALGORITHM",
            Self::Cs => "CS",
            Self::Network => "NETWORK",
            Self::Git => "GIT",
            Self::Etc => "ETC",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Java => "☕",
            Self::Spring => "🌱",
            Self::Jpa => "🗂️",
            Self::Database => "💾",
            Self::Algorithm => "🧮",
            Self::Cs => "💻",
            Self::Network => "🌐",
            Self::Git => "🔀",
            Self::Etc => "📝",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    /// Case-insensitive lookup by canonical name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEnumError::new("category", value))
    }
}

/// Self-rated understanding, ordered from fully understood to not understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Understanding {
    VeryGood,
    Good,
    Normal,
    Bad,
    VeryBad,
}

impl Understanding {
    pub const ALL: [Understanding; 5] = [
        Understanding::VeryGood,
        Understanding::Good,
        Understanding::Normal,
        Understanding::Bad,
        Understanding::VeryBad,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::VeryGood => "VERY_GOOD",
            Self::Good => "GOOD",
            Self::Normal => "NORMAL",
            Self::Bad => "BAD",
            Self::VeryBad => "VERY_BAD",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::VeryGood => "😎",
            Self::Good => "😊",
            Self::Normal => "😐",
            Self::Bad => "😥",
            Self::VeryBad => "😵",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::VeryGood => "Fully understood",
            Self::Good => "Understood well",
            Self::Normal => "Partly understood",
            Self::Bad => "Found it difficult",
            Self::VeryBad => "Not understood",
        }
    }
}

impl Display for Understanding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Understanding {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEnumError::new("understanding", value))
    }
}

/// Text did not match any member of a fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl Display for ParseEnumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: `{}`", self.kind, self.value)
    }
}

impl Error for ParseEnumError {}

/// Structural violation that must never reach persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyLogValidationError {
    NonPositiveId(StudyLogId),
    EmptyTitle,
    TitleTooLong { chars: usize },
    EmptyContent,
    ContentTooLong { chars: usize },
    StudyTimeOutOfRange(u32),
    StudyDateOutOfRange(NaiveDate),
}

impl Display for StudyLogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "study log id must be positive, got {id}"),
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::TitleTooLong { chars } => write!(
                f,
                "title has {chars} characters; at most {TITLE_MAX_CHARS} allowed"
            ),
            Self::EmptyContent => write!(f, "content must not be blank"),
            Self::ContentTooLong { chars } => write!(
                f,
                "content has {chars} characters; at most {CONTENT_MAX_CHARS} allowed"
            ),
            Self::StudyTimeOutOfRange(minutes) => write!(
                f,
                "study time must be within 1..={STUDY_TIME_MAX_MINUTES} minutes, got {minutes}"
            ),
            Self::StudyDateOutOfRange(date) => write!(
                f,
                "study date year must be within {MIN_STUDY_YEAR}..={MAX_STUDY_YEAR}, got {date}"
            ),
        }
    }
}

impl Error for StudyLogValidationError {}

/// Canonical study log record.
///
/// Stores hand out clones; mutating a returned value never touches stored
/// state until it is passed back through `save` or `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyLog {
    /// `None` until the store assigns one.
    pub id: Option<StudyLogId>,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub understanding: Understanding,
    pub study_time_minutes: u32,
    pub study_date: NaiveDate,
    /// Unix epoch milliseconds, fixed at first save.
    pub created_at: Option<i64>,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: Option<i64>,
}

impl StudyLog {
    /// Creates an unsaved record. Timestamps and id stay unset.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        understanding: Understanding,
        study_time_minutes: u32,
        study_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            category,
            understanding,
            study_time_minutes,
            study_date,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether a store has assigned this record an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks structural invariants required before any write.
    ///
    /// Date-in-the-future is a request concern and is checked by the service.
    pub fn validate(&self) -> Result<(), StudyLogValidationError> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(StudyLogValidationError::NonPositiveId(id));
            }
        }

        if self.title.trim().is_empty() {
            return Err(StudyLogValidationError::EmptyTitle);
        }
        let title_chars = self.title.chars().count();
        if title_chars > TITLE_MAX_CHARS {
            return Err(StudyLogValidationError::TitleTooLong { chars: title_chars });
        }

        if self.content.trim().is_empty() {
            return Err(StudyLogValidationError::EmptyContent);
        }
        let content_chars = self.content.chars().count();
        if content_chars > CONTENT_MAX_CHARS {
            return Err(StudyLogValidationError::ContentTooLong {
                chars: content_chars,
            });
        }

        if self.study_time_minutes == 0 || self.study_time_minutes > STUDY_TIME_MAX_MINUTES {
            return Err(StudyLogValidationError::StudyTimeOutOfRange(
                self.study_time_minutes,
            ));
        }

        if !is_storable_study_date(self.study_date) {
            return Err(StudyLogValidationError::StudyDateOutOfRange(
                self.study_date,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StudyLog {
        StudyLog::new(
            "Ownership",
            "Moves and borrows",
            Category::Java,
            Understanding::Good,
            45,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("java".parse::<Category>().unwrap(), Category::Java);
        assert_eq!(" Spring ".parse::<Category>().unwrap(), Category::Spring);
        let err = "rust".parse::<Category>().unwrap_err();
        assert_eq!(err.kind, "category");
        assert_eq!(err.value, "rust");
    }

    #[test]
    fn understanding_parse_accepts_snake_case_names() {
        assert_eq!(
            "very_good".parse::<Understanding>().unwrap(),
            Understanding::VeryGood
        );
        assert!("great".parse::<Understanding>().is_err());
    }

    #[test]
    fn understanding_is_ordered_from_best_to_worst() {
        assert!(Understanding::VeryGood < Understanding::VeryBad);
        assert_eq!(Understanding::ALL.first(), Some(&Understanding::VeryGood));
    }

    #[test]
    fn validate_rejects_blank_and_out_of_range_fields() {
        let mut log = sample();
        assert!(log.validate().is_ok());

        log.title = "   ".to_string();
        assert_eq!(log.validate(), Err(StudyLogValidationError::EmptyTitle));

        let mut log = sample();
        log.study_time_minutes = 1441;
        assert_eq!(
            log.validate(),
            Err(StudyLogValidationError::StudyTimeOutOfRange(1441))
        );

        let mut log = sample();
        log.id = Some(0);
        assert_eq!(log.validate(), Err(StudyLogValidationError::NonPositiveId(0)));
    }

    #[test]
    fn validate_rejects_years_outside_four_digits() {
        let mut log = sample();
        for (year, ok) in [(-1, false), (0, true), (9999, true), (10000, false)] {
            log.study_date = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
            assert_eq!(log.validate().is_ok(), ok, "year {year}");
        }
        log.study_date = NaiveDate::from_ymd_opt(-100, 1, 1).unwrap();
        assert!(matches!(
            log.validate(),
            Err(StudyLogValidationError::StudyDateOutOfRange(_))
        ));
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let mut log = sample();
        log.title = "한".repeat(TITLE_MAX_CHARS);
        assert!(log.validate().is_ok());
        log.title.push('글');
        assert!(matches!(
            log.validate(),
            Err(StudyLogValidationError::TitleTooLong { .. })
        ));
    }
}
