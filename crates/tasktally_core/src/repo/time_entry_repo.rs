//! Time entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist time entries and answer range/task filters.
//! - Sum stopped durations per task and per project in SQL.
//!
//! # Invariants
//! - Write paths call `TimeEntry::validate()`, so a stored duration always
//!   equals `end_time - start_time`.
//! - Running entries (`end_time IS NULL`) never contribute to totals.
//! - Totals are integer millisecond sums; an empty set sums to zero.

use crate::model::detail::TimeEntryDetails;
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::model::time_entry::{TimeEntry, TimeEntryId, TimerState};
use crate::model::EntityKind;
use crate::repo::rows::{
    collect_rows, parse_time_entry_row, row_exists, uuid_column, TIME_ENTRY_ORDER_SQL,
    TIME_ENTRY_SELECT_SQL,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;

/// Filter options for listing time entries. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeEntryListQuery {
    pub task_id: Option<TaskId>,
    /// Inclusive lower bound on `start_time`.
    pub started_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `start_time`.
    pub started_to: Option<DateTime<Utc>>,
    pub state: Option<TimerState>,
}

/// Stopped-time total for one task of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTimeTotal {
    pub task_id: TaskId,
    pub task_title: String,
    pub total_ms: i64,
}

impl TaskTimeTotal {
    pub fn total(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.total_ms)
    }
}

/// Repository interface for time entry persistence and aggregation.
pub trait TimeEntryRepository {
    fn create_entry(&self, entry: &TimeEntry) -> RepoResult<TimeEntryId>;
    fn update_entry(&self, entry: &TimeEntry) -> RepoResult<()>;
    /// Writes the stop transition only if the entry is still running.
    ///
    /// Returns `false` when no running row matched.
    fn stop_entry(&self, entry: &TimeEntry) -> RepoResult<bool>;
    fn get_entry(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntry>>;
    fn get_entry_details(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntryDetails>>;
    fn list_entries(&self, query: &TimeEntryListQuery) -> RepoResult<Vec<TimeEntry>>;
    fn list_entry_details(&self, query: &TimeEntryListQuery)
        -> RepoResult<Vec<TimeEntryDetails>>;
    fn delete_entry(&self, id: TimeEntryId) -> RepoResult<bool>;
    fn task_exists(&self, id: TaskId) -> RepoResult<bool>;
    /// Sum of stopped durations owned by one task.
    fn total_for_task(&self, task_id: TaskId) -> RepoResult<TimeDelta>;
    /// Sum of stopped durations owned by tasks of one project.
    fn total_for_project(&self, project_id: ProjectId) -> RepoResult<TimeDelta>;
    /// Per-task stopped totals for one project, including tasks with zero.
    fn task_totals_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<TaskTimeTotal>>;
}

/// SQLite-backed time entry repository.
pub struct SqliteTimeEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimeEntryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, query: &TimeEntryListQuery) -> RepoResult<Vec<(TimeEntry, String)>> {
        let (sql, bind_values) = build_list_sql(query);
        collect_rows(
            self.conn,
            &sql,
            params_from_iter(bind_values),
            parse_time_entry_row,
        )
    }

    fn sum_millis(&self, sql: &str, id: String) -> RepoResult<TimeDelta> {
        let total_ms: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        Ok(TimeDelta::milliseconds(total_ms))
    }
}

impl TimeEntryRepository for SqliteTimeEntryRepository<'_> {
    fn create_entry(&self, entry: &TimeEntry) -> RepoResult<TimeEntryId> {
        entry.validate()?;

        self.conn.execute(
            "INSERT INTO time_entries (
                id,
                task_id,
                description,
                start_time,
                end_time,
                duration_ms,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.id.to_string(),
                entry.task_id.to_string(),
                entry.description.as_str(),
                entry.start_time.timestamp_millis(),
                entry.end_time.map(|value| value.timestamp_millis()),
                entry.duration_ms,
                entry.created_at.timestamp_millis(),
            ],
        )?;

        Ok(entry.id)
    }

    fn update_entry(&self, entry: &TimeEntry) -> RepoResult<()> {
        entry.validate()?;

        let changed = self.conn.execute(
            "UPDATE time_entries
             SET
                task_id = ?1,
                description = ?2,
                start_time = ?3,
                end_time = ?4,
                duration_ms = ?5
             WHERE id = ?6;",
            params![
                entry.task_id.to_string(),
                entry.description.as_str(),
                entry.start_time.timestamp_millis(),
                entry.end_time.map(|value| value.timestamp_millis()),
                entry.duration_ms,
                entry.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::TimeEntry,
                id: entry.id,
            });
        }

        Ok(())
    }

    fn stop_entry(&self, entry: &TimeEntry) -> RepoResult<bool> {
        entry.validate()?;
        let Some(end_time) = entry.end_time else {
            return Err(RepoError::InvalidData(format!(
                "stop requested without end time for time entry {}",
                entry.id
            )));
        };

        let changed = self.conn.execute(
            "UPDATE time_entries
             SET
                end_time = ?1,
                duration_ms = ?2
             WHERE id = ?3
               AND end_time IS NULL;",
            params![
                end_time.timestamp_millis(),
                entry.duration_ms,
                entry.id.to_string(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn get_entry(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntry>> {
        Ok(self.get_entry_details(id)?.map(|details| details.entry))
    }

    fn get_entry_details(&self, id: TimeEntryId) -> RepoResult<Option<TimeEntryDetails>> {
        let mut entries = collect_rows(
            self.conn,
            &format!("{TIME_ENTRY_SELECT_SQL} WHERE e.id = ?1;"),
            [id.to_string()],
            parse_time_entry_row,
        )?;
        Ok(entries
            .pop()
            .map(|(entry, task_title)| TimeEntryDetails { entry, task_title }))
    }

    fn list_entries(&self, query: &TimeEntryListQuery) -> RepoResult<Vec<TimeEntry>> {
        Ok(self
            .query_entries(query)?
            .into_iter()
            .map(|(entry, _)| entry)
            .collect())
    }

    fn list_entry_details(
        &self,
        query: &TimeEntryListQuery,
    ) -> RepoResult<Vec<TimeEntryDetails>> {
        Ok(self
            .query_entries(query)?
            .into_iter()
            .map(|(entry, task_title)| TimeEntryDetails { entry, task_title })
            .collect())
    }

    fn delete_entry(&self, id: TimeEntryId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM time_entries WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn task_exists(&self, id: TaskId) -> RepoResult<bool> {
        row_exists(self.conn, "tasks", id)
    }

    fn total_for_task(&self, task_id: TaskId) -> RepoResult<TimeDelta> {
        self.sum_millis(
            "SELECT COALESCE(SUM(duration_ms), 0)
             FROM time_entries
             WHERE task_id = ?1
               AND end_time IS NOT NULL;",
            task_id.to_string(),
        )
    }

    fn total_for_project(&self, project_id: ProjectId) -> RepoResult<TimeDelta> {
        self.sum_millis(
            "SELECT COALESCE(SUM(e.duration_ms), 0)
             FROM time_entries e
             INNER JOIN tasks t ON t.id = e.task_id
             WHERE t.project_id = ?1
               AND e.end_time IS NOT NULL;",
            project_id.to_string(),
        )
    }

    fn task_totals_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<TaskTimeTotal>> {
        collect_rows(
            self.conn,
            "SELECT
                t.id AS task_id,
                t.title AS task_title,
                COALESCE(SUM(e.duration_ms), 0) AS total_ms
             FROM tasks t
             LEFT JOIN time_entries e
               ON e.task_id = t.id
              AND e.end_time IS NOT NULL
             WHERE t.project_id = ?1
             GROUP BY t.id, t.title, t.created_at
             ORDER BY t.created_at ASC, t.id ASC;",
            [project_id.to_string()],
            |row| {
                Ok(TaskTimeTotal {
                    task_id: uuid_column(row, "task_id", "tasks.id")?,
                    task_title: row.get("task_title")?,
                    total_ms: row.get("total_ms")?,
                })
            },
        )
    }
}

fn build_list_sql(query: &TimeEntryListQuery) -> (String, Vec<Value>) {
    let mut sql = format!("{TIME_ENTRY_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(task_id) = query.task_id {
        sql.push_str(" AND e.task_id = ?");
        bind_values.push(Value::Text(task_id.to_string()));
    }

    if let Some(from) = query.started_from {
        // Round a sub-millisecond bound up so the range stays inclusive-exact.
        let has_sub_millis = from.timestamp_subsec_nanos() % 1_000_000 != 0;
        sql.push_str(" AND e.start_time >= ?");
        bind_values.push(Value::Integer(
            from.timestamp_millis() + i64::from(has_sub_millis),
        ));
    }

    if let Some(to) = query.started_to {
        sql.push_str(" AND e.start_time <= ?");
        bind_values.push(Value::Integer(to.timestamp_millis()));
    }

    match query.state {
        Some(TimerState::Running) => sql.push_str(" AND e.end_time IS NULL"),
        Some(TimerState::Stopped) => sql.push_str(" AND e.end_time IS NOT NULL"),
        None => {}
    }

    sql.push_str(TIME_ENTRY_ORDER_SQL);
    (sql, bind_values)
}
