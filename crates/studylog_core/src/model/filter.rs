//! Search criteria shared by both store backends.
//!
//! The in-memory store evaluates `StudyLogFilter::matches` directly; the
//! SQLite store compiles the same fields into one WHERE predicate. Keeping
//! the field semantics here lets both sides agree.

use crate::model::study_log::{Category, StudyLog};
use chrono::NaiveDate;

/// Conjunctive, all-optional filter over study logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyLogFilter {
    /// Case-sensitive substring of `title`. Ignored when blank.
    pub title_keyword: Option<String>,
    pub category: Option<Category>,
    /// Inclusive lower bound on `study_date`.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `study_date`.
    pub end_date: Option<NaiveDate>,
}

impl StudyLogFilter {
    pub fn by_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            start_date: Some(date),
            end_date: Some(date),
            ..Self::default()
        }
    }

    /// Keyword that actually participates in matching.
    pub fn effective_title_keyword(&self) -> Option<&str> {
        self.title_keyword
            .as_deref()
            .filter(|keyword| !keyword.trim().is_empty())
    }

    /// True when no criterion restricts the result.
    pub fn is_unrestricted(&self) -> bool {
        self.effective_title_keyword().is_none()
            && self.category.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    pub fn matches(&self, log: &StudyLog) -> bool {
        if let Some(keyword) = self.effective_title_keyword() {
            if !log.title.contains(keyword) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if log.category != category {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if log.study_date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if log.study_date > end {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::StudyLogFilter;
    use crate::model::study_log::{Category, StudyLog, Understanding};
    use chrono::NaiveDate;

    fn log(title: &str, category: Category, day: u32) -> StudyLog {
        StudyLog::new(
            title,
            "body",
            category,
            Understanding::Normal,
            30,
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        )
    }

    #[test]
    fn blank_keyword_is_ignored() {
        let filter = StudyLogFilter {
            title_keyword: Some("  ".to_string()),
            ..StudyLogFilter::default()
        };
        assert!(filter.is_unrestricted());
        assert!(filter.matches(&log("anything", Category::Git, 1)));
    }

    #[test]
    fn keyword_match_is_case_sensitive_substring() {
        let filter = StudyLogFilter {
            title_keyword: Some("Bean".to_string()),
            ..StudyLogFilter::default()
        };
        assert!(filter.matches(&log("Spring Bean scopes", Category::Spring, 1)));
        assert!(!filter.matches(&log("spring bean scopes", Category::Spring, 1)));
    }

    #[test]
    fn date_bounds_are_inclusive_and_independent() {
        let from_second = StudyLogFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 3, 2),
            ..StudyLogFilter::default()
        };
        assert!(!from_second.matches(&log("a", Category::Cs, 1)));
        assert!(from_second.matches(&log("a", Category::Cs, 2)));

        let until_second = StudyLogFilter {
            end_date: NaiveDate::from_ymd_opt(2025, 3, 2),
            ..StudyLogFilter::default()
        };
        assert!(until_second.matches(&log("a", Category::Cs, 2)));
        assert!(!until_second.matches(&log("a", Category::Cs, 3)));
    }

    #[test]
    fn criteria_are_conjunctive() {
        let filter = StudyLogFilter {
            title_keyword: Some("JPA".to_string()),
            category: Some(Category::Jpa),
            ..StudyLogFilter::on_date(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        };
        assert!(filter.matches(&log("JPA fetch joins", Category::Jpa, 5)));
        assert!(!filter.matches(&log("JPA fetch joins", Category::Database, 5)));
        assert!(!filter.matches(&log("JPA fetch joins", Category::Jpa, 6)));
    }
}
