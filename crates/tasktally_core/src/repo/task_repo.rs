//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - `project_id` is a foreign key; callers check existence first so a
//!   missing parent surfaces as a validation failure, not a SQL fault.
//! - Overdue filtering mirrors `Task::is_overdue_at`.

use crate::model::detail::TaskDetails;
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::EntityKind;
use crate::repo::rows::{
    attach_time_entries, collect_rows, parse_task_row, row_exists, TASK_ORDER_SQL,
    TASK_SELECT_SQL,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Filter options for listing tasks. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Keep only tasks overdue at this instant.
    pub overdue_at: Option<DateTime<Utc>>,
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Loads one task with its project name and time entries.
    fn get_task_details(&self, id: TaskId) -> RepoResult<Option<TaskDetails>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn list_task_details(&self, query: &TaskListQuery) -> RepoResult<Vec<TaskDetails>>;
    /// Deletes a task and its time entries. Returns whether a row existed.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    fn project_exists(&self, id: ProjectId) -> RepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<(Task, String)>> {
        let (sql, bind_values) = build_list_sql(query);
        collect_rows(self.conn, &sql, params_from_iter(bind_values), parse_task_row)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                project_id,
                title,
                description,
                status,
                priority,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(|value| value.timestamp_millis()),
                task.created_at.timestamp_millis(),
                task.updated_at.timestamp_millis(),
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                project_id = ?1,
                title = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                due_date = ?6,
                updated_at = ?7
             WHERE id = ?8;",
            params![
                task.project_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(|value| value.timestamp_millis()),
                task.updated_at.timestamp_millis(),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id: task.id,
            });
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut tasks = collect_rows(
            self.conn,
            &format!("{TASK_SELECT_SQL} WHERE t.id = ?1;"),
            [id.to_string()],
            parse_task_row,
        )?;
        Ok(tasks.pop().map(|(task, _)| task))
    }

    fn get_task_details(&self, id: TaskId) -> RepoResult<Option<TaskDetails>> {
        let tasks = collect_rows(
            self.conn,
            &format!("{TASK_SELECT_SQL} WHERE t.id = ?1;"),
            [id.to_string()],
            parse_task_row,
        )?;
        let mut details = attach_time_entries(self.conn, tasks)?;
        Ok(details.pop())
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        Ok(self
            .query_tasks(query)?
            .into_iter()
            .map(|(task, _)| task)
            .collect())
    }

    fn list_task_details(&self, query: &TaskListQuery) -> RepoResult<Vec<TaskDetails>> {
        let tasks = self.query_tasks(query)?;
        attach_time_entries(self.conn, tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn project_exists(&self, id: ProjectId) -> RepoResult<bool> {
        row_exists(self.conn, "projects", id)
    }
}

fn build_list_sql(query: &TaskListQuery) -> (String, Vec<Value>) {
    let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(project_id) = query.project_id {
        sql.push_str(" AND t.project_id = ?");
        bind_values.push(Value::Text(project_id.to_string()));
    }

    if let Some(status) = query.status {
        sql.push_str(" AND t.status = ?");
        bind_values.push(Value::Text(status.as_str().to_string()));
    }

    if let Some(priority) = query.priority {
        sql.push_str(" AND t.priority = ?");
        bind_values.push(Value::Text(priority.as_str().to_string()));
    }

    if let Some(now) = query.overdue_at {
        sql.push_str(" AND t.due_date IS NOT NULL AND t.due_date < ? AND t.status <> ?");
        bind_values.push(Value::Integer(now.timestamp_millis()));
        bind_values.push(Value::Text(TaskStatus::Completed.as_str().to_string()));
    }

    sql.push_str(TASK_ORDER_SQL);
    (sql, bind_values)
}

#[cfg(test)]
mod tests {
    use super::{build_list_sql, TaskListQuery};
    use crate::model::task::{TaskPriority, TaskStatus};

    #[test]
    fn list_sql_binds_one_value_per_filter() {
        let (sql, values) = build_list_sql(&TaskListQuery {
            status: Some(TaskStatus::InReview),
            priority: Some(TaskPriority::Critical),
            ..TaskListQuery::default()
        });
        assert!(sql.contains("t.status = ?"));
        assert!(sql.contains("t.priority = ?"));
        assert!(!sql.contains("t.project_id = ?"));
        assert_eq!(values.len(), 2);
    }
}
