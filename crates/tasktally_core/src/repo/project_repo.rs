//! Project repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - Deleting a project cascades to its tasks and their time entries through
//!   `ON DELETE CASCADE` foreign keys.
//! - Listing is deterministic: `created_at ASC, id ASC`.

use crate::model::detail::ProjectDetails;
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::EntityKind;
use crate::repo::rows::{
    attach_tasks, collect_rows, parse_project_row, PROJECT_ORDER_SQL, PROJECT_SELECT_SQL,
};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Filter options for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
}

/// Repository interface for project persistence.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Loads one project with tasks and their time entries.
    fn get_project_details(&self, id: ProjectId) -> RepoResult<Option<ProjectDetails>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn list_project_details(&self, query: &ProjectListQuery) -> RepoResult<Vec<ProjectDetails>>;
    /// Deletes a project and everything it owns. Returns whether a row existed.
    fn delete_project(&self, id: ProjectId) -> RepoResult<bool>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                status,
                start_date,
                end_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_str(),
                project.status.as_str(),
                project.start_date.timestamp_millis(),
                project.end_date.map(|value| value.timestamp_millis()),
                project.created_at.timestamp_millis(),
                project.updated_at.timestamp_millis(),
            ],
        )?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?1,
                description = ?2,
                status = ?3,
                start_date = ?4,
                end_date = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.status.as_str(),
                project.start_date.timestamp_millis(),
                project.end_date.map(|value| value.timestamp_millis()),
                project.updated_at.timestamp_millis(),
                project.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Project,
                id: project.id,
            });
        }

        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut projects = collect_rows(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} WHERE p.id = ?1;"),
            [id.to_string()],
            parse_project_row,
        )?;
        Ok(projects.pop())
    }

    fn get_project_details(&self, id: ProjectId) -> RepoResult<Option<ProjectDetails>> {
        let project = self.get_project(id)?;
        let mut details = attach_tasks(self.conn, project.into_iter().collect())?;
        Ok(details.pop())
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let (sql, bind_values) = build_list_sql(query);
        collect_rows(
            self.conn,
            &sql,
            params_from_iter(bind_values),
            parse_project_row,
        )
    }

    fn list_project_details(&self, query: &ProjectListQuery) -> RepoResult<Vec<ProjectDetails>> {
        let projects = self.list_projects(query)?;
        attach_tasks(self.conn, projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn build_list_sql(query: &ProjectListQuery) -> (String, Vec<Value>) {
    let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(status) = query.status {
        sql.push_str(" AND p.status = ?");
        bind_values.push(Value::Text(status.as_str().to_string()));
    }

    sql.push_str(PROJECT_ORDER_SQL);
    (sql, bind_values)
}
