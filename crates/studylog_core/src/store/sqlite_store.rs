//! SQLite-backed study log store.
//!
//! # Responsibility
//! - Provide the `StudyLogStore` contract over the `study_logs` table.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Paginated reads build one `Predicate` and reuse it for both the COUNT
//!   query and the LIMIT/OFFSET data query.
//! - Ids come from `AUTOINCREMENT` and are read back before returning.
//! - An exhausted id sequence is reported as `IdSequenceExhausted` before
//!   any insert is attempted.
//! - Title matching uses `instr`, which is case-sensitive and treats `%`/`_`
//!   literally, matching the in-memory backend.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory};
use crate::model::filter::StudyLogFilter;
use crate::model::page::{Page, PageRequest};
use crate::model::study_log::{
    Category, StudyLog, StudyLogId, Understanding, MAX_STUDY_YEAR, MIN_STUDY_YEAR,
};
use crate::store::{ensure_page_size, now_epoch_ms, StoreError, StoreResult, StudyLogStore};
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

const STUDY_LOG_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    category,
    understanding,
    study_time_minutes,
    study_date,
    created_at,
    updated_at
FROM study_logs";

const CANONICAL_ORDER_SQL: &str = " ORDER BY study_date DESC, id DESC";

const REQUIRED_COLUMNS: [&str; 9] = [
    "id",
    "title",
    "content",
    "category",
    "understanding",
    "study_time_minutes",
    "study_date",
    "created_at",
    "updated_at",
];

/// ISO-8601 calendar date. Text order matches date order only for
/// four-digit years, which `StudyLog::validate` enforces on every write.
const STUDY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Condition that matches no row.
const NO_MATCH_SQL: &str = "0 = 1";

/// `StudyLogStore` over one SQLite connection.
///
/// The connection is serialized behind a mutex, so the store is `Sync` and
/// a paginated count + data pair always observes the same snapshot.
pub struct SqliteStudyLogStore {
    conn: Mutex<Connection>,
}

impl SqliteStudyLogStore {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not have the expected shape.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database and wraps it.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn.into_inner()
    }

    fn page_matching(
        &self,
        filter: &StudyLogFilter,
        request: PageRequest,
    ) -> StoreResult<Page<StudyLog>> {
        ensure_page_size(request)?;
        let predicate = Predicate::from_filter(filter);

        let conn = self.conn.lock();
        let total = count_matching(&conn, &predicate)?;
        if request.offset() >= total {
            return Ok(Page::new(Vec::new(), request, total));
        }

        let content = select_matching(&conn, &predicate, Some(request))?;
        Ok(Page::new(content, request, total))
    }

    fn list_matching(&self, filter: &StudyLogFilter) -> StoreResult<Vec<StudyLog>> {
        let predicate = Predicate::from_filter(filter);
        let conn = self.conn.lock();
        select_matching(&conn, &predicate, None)
    }
}

impl StudyLogStore for SqliteStudyLogStore {
    fn save(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        log.validate()?;

        let now = now_epoch_ms();
        let conn = self.conn.lock();
        let id = match log.id {
            None => {
                ensure_sequence_available(&conn)?;
                conn.execute(
                    "INSERT INTO study_logs (
                        title,
                        content,
                        category,
                        understanding,
                        study_time_minutes,
                        study_date,
                        created_at,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
                    params![
                        log.title.as_str(),
                        log.content.as_str(),
                        log.category.name(),
                        log.understanding.name(),
                        log.study_time_minutes,
                        date_to_db(log.study_date),
                        now,
                    ],
                )?;
                conn.last_insert_rowid()
            }
            Some(id) => {
                conn.execute(
                    "INSERT INTO study_logs (
                        id,
                        title,
                        content,
                        category,
                        understanding,
                        study_time_minutes,
                        study_date,
                        created_at,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                    ON CONFLICT(id) DO UPDATE SET
                        title = excluded.title,
                        content = excluded.content,
                        category = excluded.category,
                        understanding = excluded.understanding,
                        study_time_minutes = excluded.study_time_minutes,
                        study_date = excluded.study_date,
                        updated_at = MAX(excluded.updated_at, study_logs.updated_at + 1);",
                    params![
                        id,
                        log.title.as_str(),
                        log.content.as_str(),
                        log.category.name(),
                        log.understanding.name(),
                        log.study_time_minutes,
                        date_to_db(log.study_date),
                        now,
                    ],
                )?;
                id
            }
        };

        let stored = load_by_id(&conn, id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("study log {id} missing after save"))
        })?;
        drop(conn);

        debug!("event=study_log_save module=store backend=sqlite status=ok id={id}");
        Ok(stored)
    }

    fn update(&self, log: &StudyLog) -> StoreResult<StudyLog> {
        let id = log.id.ok_or_else(|| {
            StoreError::InvalidArgument("study log to update has no id".to_string())
        })?;
        log.validate()?;

        let now = now_epoch_ms();
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE study_logs
             SET
                title = ?1,
                content = ?2,
                category = ?3,
                understanding = ?4,
                study_time_minutes = ?5,
                study_date = ?6,
                updated_at = MAX(?7, updated_at + 1)
             WHERE id = ?8;",
            params![
                log.title.as_str(),
                log.content.as_str(),
                log.category.name(),
                log.understanding.name(),
                log.study_time_minutes,
                date_to_db(log.study_date),
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        let stored = load_by_id(&conn, id)?.ok_or(StoreError::NotFound(id))?;
        drop(conn);

        debug!("event=study_log_update module=store backend=sqlite status=ok id={id}");
        Ok(stored)
    }

    fn find_by_id(&self, id: StudyLogId) -> StoreResult<Option<StudyLog>> {
        let conn = self.conn.lock();
        load_by_id(&conn, id)
    }

    fn exists_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM study_logs WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_by_id(&self, id: StudyLogId) -> StoreResult<bool> {
        let changed = self
            .conn
            .lock()
            .execute("DELETE FROM study_logs WHERE id = ?1;", [id])?;
        let removed = changed > 0;
        debug!(
            "event=study_log_delete module=store backend=sqlite status=ok id={id} removed={removed}"
        );
        Ok(removed)
    }

    fn delete_all(&self) -> StoreResult<()> {
        // `sqlite_sequence` survives DELETE, so ids stay monotonic.
        let removed = self.conn.lock().execute("DELETE FROM study_logs;", [])?;
        info!("event=study_log_clear module=store backend=sqlite status=ok removed={removed}");
        Ok(())
    }

    fn count(&self) -> StoreResult<u64> {
        let conn = self.conn.lock();
        count_matching(&conn, &Predicate::default())
    }

    fn count_by_category(&self, category: Category) -> StoreResult<u64> {
        let predicate = Predicate::from_filter(&StudyLogFilter::by_category(category));
        let conn = self.conn.lock();
        count_matching(&conn, &predicate)
    }

    fn find_all(&self) -> StoreResult<Vec<StudyLog>> {
        self.list_matching(&StudyLogFilter::default())
    }

    fn find_by_study_date(&self, date: NaiveDate) -> StoreResult<Vec<StudyLog>> {
        self.list_matching(&StudyLogFilter::on_date(date))
    }

    fn find_by_category(&self, category: Category) -> StoreResult<Vec<StudyLog>> {
        self.list_matching(&StudyLogFilter::by_category(category))
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

/// WHERE clause and its bound values, compiled once from a filter.
#[derive(Debug, Clone, Default, PartialEq)]
struct Predicate {
    /// Empty, or ` WHERE ...` with one `?` per entry in `binds`.
    clause: String,
    binds: Vec<Value>,
}

impl Predicate {
    fn from_filter(filter: &StudyLogFilter) -> Self {
        let mut conditions: Vec<&'static str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        if let Some(keyword) = filter.effective_title_keyword() {
            conditions.push("instr(title, ?) > 0");
            binds.push(Value::Text(keyword.to_string()));
        }

        if let Some(category) = filter.category {
            conditions.push("category = ?");
            binds.push(Value::Text(category.name().to_string()));
        }

        // Stored years are four-digit; bounds outside that range either
        // admit every stored date or none, and must not be compared as text.
        if let Some(start) = filter.start_date {
            if start.year() > MAX_STUDY_YEAR {
                conditions.push(NO_MATCH_SQL);
            } else if start.year() >= MIN_STUDY_YEAR {
                conditions.push("study_date >= ?");
                binds.push(Value::Text(date_to_db(start)));
            }
        }

        if let Some(end) = filter.end_date {
            if end.year() < MIN_STUDY_YEAR {
                conditions.push(NO_MATCH_SQL);
            } else if end.year() <= MAX_STUDY_YEAR {
                conditions.push("study_date <= ?");
                binds.push(Value::Text(date_to_db(end)));
            }
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        Self { clause, binds }
    }
}

fn count_matching(conn: &Connection, predicate: &Predicate) -> StoreResult<u64> {
    let sql = format!("SELECT COUNT(*) FROM study_logs{};", predicate.clause);
    let count: i64 = conn.query_row(&sql, params_from_iter(predicate.binds.iter()), |row| {
        row.get(0)
    })?;
    u64::try_from(count)
        .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
}

fn select_matching(
    conn: &Connection,
    predicate: &Predicate,
    window: Option<PageRequest>,
) -> StoreResult<Vec<StudyLog>> {
    let mut sql = format!(
        "{STUDY_LOG_SELECT_SQL}{}{CANONICAL_ORDER_SQL}",
        predicate.clause
    );
    let mut bind_values = predicate.binds.clone();

    if let Some(request) = window {
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(request.size)));
        bind_values.push(Value::Integer(
            i64::try_from(request.offset()).unwrap_or(i64::MAX),
        ));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut logs = Vec::new();
    while let Some(row) = rows.next()? {
        logs.push(parse_study_log_row(row)?);
    }

    Ok(logs)
}

fn load_by_id(conn: &Connection, id: StudyLogId) -> StoreResult<Option<StudyLog>> {
    let mut stmt = conn.prepare(&format!("{STUDY_LOG_SELECT_SQL} WHERE id = ?1;"))?;
    let row_result = stmt
        .query_row([id], |row| Ok(parse_study_log_row(row)))
        .optional()?;
    row_result.transpose()
}

fn parse_study_log_row(row: &Row<'_>) -> StoreResult<StudyLog> {
    let id: StudyLogId = row.get("id")?;

    let category_text: String = row.get("category")?;
    let category = parse_category(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in study_logs.category (id {id})"
        ))
    })?;

    let understanding_text: String = row.get("understanding")?;
    let understanding = parse_understanding(&understanding_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid understanding `{understanding_text}` in study_logs.understanding (id {id})"
        ))
    })?;

    let date_text: String = row.get("study_date")?;
    let study_date = NaiveDate::parse_from_str(&date_text, STUDY_DATE_FORMAT).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid date `{date_text}` in study_logs.study_date (id {id})"
        ))
    })?;

    let log = StudyLog {
        id: Some(id),
        title: row.get("title")?,
        content: row.get("content")?,
        category,
        understanding,
        study_time_minutes: row.get("study_time_minutes")?,
        study_date,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
    };
    log.validate().map_err(|err| {
        StoreError::InvalidData(format!("study log {id} failed validation: {err}"))
    })?;
    Ok(log)
}

/// `AUTOINCREMENT` refuses to allocate past `i64::MAX` with a generic
/// `SQLITE_FULL`; report it as the same typed error the memory store uses.
fn ensure_sequence_available(conn: &Connection) -> StoreResult<()> {
    let last_id: Option<i64> = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = 'study_logs';",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if last_id == Some(i64::MAX) {
        return Err(StoreError::IdSequenceExhausted);
    }
    Ok(())
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(STUDY_DATE_FORMAT).to_string()
}

/// Persisted names are exact; case folding happens only at the service.
fn parse_category(value: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| category.name() == value)
}

fn parse_understanding(value: &str) -> Option<Understanding> {
    Understanding::ALL
        .into_iter()
        .find(|level| level.name() == value)
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "study_logs")? {
        return Err(StoreError::MissingRequiredTable("study_logs"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "study_logs", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "study_logs",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
