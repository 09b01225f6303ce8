//! Shared SELECT shapes, row parsing and relation loading.

use crate::clock::from_epoch_millis;
use crate::model::detail::{ProjectDetails, TaskDetails};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::model::time_entry::TimeEntry;
use crate::model::validation::ValidationError;
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection, Params, Row};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Ids bound per `IN (...)` batch, kept well under SQLite's variable limit.
const ID_BATCH_SIZE: usize = 500;

pub(crate) const PROJECT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.name AS name,
    p.description AS description,
    p.status AS status,
    p.start_date AS start_date,
    p.end_date AS end_date,
    p.created_at AS created_at,
    p.updated_at AS updated_at
FROM projects p";

pub(crate) const TASK_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.project_id AS project_id,
    t.title AS title,
    t.description AS description,
    t.status AS status,
    t.priority AS priority,
    t.due_date AS due_date,
    t.created_at AS created_at,
    t.updated_at AS updated_at,
    p.name AS project_name
FROM tasks t
INNER JOIN projects p ON p.id = t.project_id";

pub(crate) const TIME_ENTRY_SELECT_SQL: &str = "SELECT
    e.id AS id,
    e.task_id AS task_id,
    e.description AS description,
    e.start_time AS start_time,
    e.end_time AS end_time,
    e.duration_ms AS duration_ms,
    e.created_at AS created_at,
    t.title AS task_title
FROM time_entries e
INNER JOIN tasks t ON t.id = e.task_id";

pub(crate) const PROJECT_ORDER_SQL: &str = " ORDER BY p.created_at ASC, p.id ASC";
pub(crate) const TASK_ORDER_SQL: &str = " ORDER BY t.created_at ASC, t.id ASC";
pub(crate) const TIME_ENTRY_ORDER_SQL: &str = " ORDER BY e.start_time ASC, e.id ASC";

pub(crate) fn collect_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    parse: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

pub(crate) fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let project = Project {
        id: uuid_column(row, "id", "projects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: symbolic_column(row, "status", "projects.status")?,
        start_date: instant_column(row, "start_date", "projects.start_date")?,
        end_date: optional_instant_column(row, "end_date", "projects.end_date")?,
        created_at: instant_column(row, "created_at", "projects.created_at")?,
        updated_at: instant_column(row, "updated_at", "projects.updated_at")?,
    };
    ensure_persisted_valid(project.validate(), "projects")?;
    Ok(project)
}

/// Parses a task row together with its joined project name.
pub(crate) fn parse_task_row(row: &Row<'_>) -> RepoResult<(Task, String)> {
    let task = Task {
        id: uuid_column(row, "id", "tasks.id")?,
        project_id: uuid_column(row, "project_id", "tasks.project_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: symbolic_column(row, "status", "tasks.status")?,
        priority: symbolic_column(row, "priority", "tasks.priority")?,
        due_date: optional_instant_column(row, "due_date", "tasks.due_date")?,
        created_at: instant_column(row, "created_at", "tasks.created_at")?,
        updated_at: instant_column(row, "updated_at", "tasks.updated_at")?,
    };
    ensure_persisted_valid(task.validate(), "tasks")?;
    Ok((task, row.get("project_name")?))
}

/// Parses a time entry row together with its joined task title.
pub(crate) fn parse_time_entry_row(row: &Row<'_>) -> RepoResult<(TimeEntry, String)> {
    let entry = TimeEntry {
        id: uuid_column(row, "id", "time_entries.id")?,
        task_id: uuid_column(row, "task_id", "time_entries.task_id")?,
        description: row.get("description")?,
        start_time: instant_column(row, "start_time", "time_entries.start_time")?,
        end_time: optional_instant_column(row, "end_time", "time_entries.end_time")?,
        duration_ms: row.get("duration_ms")?,
        created_at: instant_column(row, "created_at", "time_entries.created_at")?,
    };
    ensure_persisted_valid(entry.validate(), "time_entries")?;
    Ok((entry, row.get("task_title")?))
}

/// Loads the time entries of every task and pairs them up.
pub(crate) fn attach_time_entries(
    conn: &Connection,
    tasks: Vec<(Task, String)>,
) -> RepoResult<Vec<TaskDetails>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_task: HashMap<TaskId, Vec<TimeEntry>> = HashMap::new();
    for batch in tasks.chunks(ID_BATCH_SIZE) {
        let sql = format!(
            "{TIME_ENTRY_SELECT_SQL} WHERE e.task_id IN ({}){TIME_ENTRY_ORDER_SQL}",
            placeholders(batch.len())
        );
        let entries = collect_rows(
            conn,
            &sql,
            params_from_iter(batch.iter().map(|(task, _)| task.id.to_string())),
            |row| parse_time_entry_row(row).map(|(entry, _)| entry),
        )?;
        for entry in entries {
            by_task.entry(entry.task_id).or_default().push(entry);
        }
    }

    Ok(tasks
        .into_iter()
        .map(|(task, project_name)| {
            let time_entries = by_task.remove(&task.id).unwrap_or_default();
            TaskDetails {
                task,
                project_name,
                time_entries,
            }
        })
        .collect())
}

/// Loads tasks (with entries) of every project and pairs them up.
pub(crate) fn attach_tasks(
    conn: &Connection,
    projects: Vec<Project>,
) -> RepoResult<Vec<ProjectDetails>> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    let mut tasks = Vec::new();
    for batch in projects.chunks(ID_BATCH_SIZE) {
        let sql = format!(
            "{TASK_SELECT_SQL} WHERE t.project_id IN ({}){TASK_ORDER_SQL}",
            placeholders(batch.len())
        );
        tasks.extend(collect_rows(
            conn,
            &sql,
            params_from_iter(batch.iter().map(|project| project.id.to_string())),
            parse_task_row,
        )?);
    }

    let mut by_project: HashMap<ProjectId, Vec<TaskDetails>> = HashMap::new();
    for details in attach_time_entries(conn, tasks)? {
        by_project
            .entry(details.task.project_id)
            .or_default()
            .push(details);
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let tasks = by_project.remove(&project.id).unwrap_or_default();
            ProjectDetails { project, tasks }
        })
        .collect())
}

pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Stored rows that fail model validation are corrupt, not rejected input.
fn ensure_persisted_valid(
    result: Result<(), ValidationError>,
    table: &'static str,
) -> RepoResult<()> {
    result.map_err(|err| RepoError::InvalidData(format!("{table} row failed validation: {err}")))
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub(crate) fn uuid_column(row: &Row<'_>, name: &str, column: &'static str) -> RepoResult<Uuid> {
    let value: String = row.get(name)?;
    Uuid::parse_str(&value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn symbolic_column<T: FromStr>(row: &Row<'_>, name: &str, column: &'static str) -> RepoResult<T> {
    let value: String = row.get(name)?;
    value
        .parse::<T>()
        .map_err(|_| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

fn instant_column(row: &Row<'_>, name: &str, column: &'static str) -> RepoResult<DateTime<Utc>> {
    let value: i64 = row.get(name)?;
    epoch_to_instant(value, column)
}

fn optional_instant_column(
    row: &Row<'_>,
    name: &str,
    column: &'static str,
) -> RepoResult<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(name)?
        .map(|value| epoch_to_instant(value, column))
        .transpose()
}

fn epoch_to_instant(value: i64, column: &'static str) -> RepoResult<DateTime<Utc>> {
    from_epoch_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}
