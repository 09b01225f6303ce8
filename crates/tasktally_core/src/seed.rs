//! Demo data for a fresh database.
//!
//! Seeds three projects, four tasks and three stopped time entries, dated
//! relative to the supplied clock. A database that already holds any project
//! is left untouched.

use crate::clock::Clock;
use crate::model::project::{NewProject, Project, ProjectStatus};
use crate::model::task::{NewTask, Task, TaskPriority, TaskStatus};
use crate::model::time_entry::NewTimeEntry;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::time_entry_repo::{SqliteTimeEntryRepository, TimeEntryRepository};
use crate::repo::RepoResult;
use chrono::{DateTime, TimeDelta, Utc};
use log::info;
use rusqlite::Connection;

/// Inserts the demo data set when no project exists yet.
///
/// Returns whether anything was inserted. All rows commit together.
pub fn seed_demo_data<C: Clock + ?Sized>(conn: &Connection, clock: &C) -> RepoResult<bool> {
    let has_projects: bool =
        conn.query_row("SELECT EXISTS(SELECT 1 FROM projects);", [], |row| row.get(0))?;
    if has_projects {
        info!("event=seed module=seed status=skipped reason=not_empty");
        return Ok(false);
    }

    let now = clock.now();
    let tx = conn.unchecked_transaction()?;
    let projects = SqliteProjectRepository::try_new(&tx)?;
    let tasks = SqliteTaskRepository::try_new(&tx)?;
    let entries = SqliteTimeEntryRepository::try_new(&tx)?;

    let website = insert_project(
        &projects,
        now,
        NewProject::new("Website Redesign", ProjectStatus::InProgress, now - days(30))
            .with_description("Complete redesign of company website")
            .with_end_date(now + days(30)),
    )?;
    let mobile = insert_project(
        &projects,
        now,
        NewProject::new("Mobile App", ProjectStatus::Planning, now + days(10))
            .with_description("Development of mobile application")
            .with_end_date(now + days(90)),
    )?;
    let migration = insert_project(
        &projects,
        now,
        NewProject::new("Database Migration", ProjectStatus::Completed, now - days(60))
            .with_description("Migrate to new database system")
            .with_end_date(now - days(10)),
    )?;

    let homepage = insert_task(
        &tasks,
        now,
        NewTask::new(website.id, "Design Homepage", TaskStatus::InProgress, TaskPriority::High)
            .with_description("Create new homepage design")
            .with_due_date(now + days(7)),
    )?;
    let database = insert_task(
        &tasks,
        now,
        NewTask::new(website.id, "Setup Database", TaskStatus::Completed, TaskPriority::Medium)
            .with_description("Configure database for new project")
            .with_due_date(now - days(5)),
    )?;
    insert_task(
        &tasks,
        now,
        NewTask::new(mobile.id, "Create Wireframes", TaskStatus::ToDo, TaskPriority::High)
            .with_description("Design app wireframes")
            .with_due_date(now + days(14)),
    )?;
    insert_task(
        &tasks,
        now,
        NewTask::new(migration.id, "Data Backup", TaskStatus::Completed, TaskPriority::Critical)
            .with_description("Backup existing data")
            .with_due_date(now - days(15)),
    )?;

    let seeded_entries = [
        (
            homepage.id,
            "Working on homepage layout",
            now - hours(3),
            now - hours(1),
        ),
        (
            database.id,
            "Database configuration",
            now - days(1) - hours(4),
            now - days(1) - hours(1),
        ),
        (
            homepage.id,
            "Homepage styling",
            now - days(2) - hours(2),
            now - days(2),
        ),
    ];
    for (task_id, description, start, end) in seeded_entries {
        let entry = NewTimeEntry::new(task_id, description, start)
            .with_end_time(end)
            .into_entry(now)?;
        entries.create_entry(&entry)?;
    }

    tx.commit()?;
    info!("event=seed module=seed status=ok projects=3 tasks=4 time_entries=3");
    Ok(true)
}

fn insert_project(
    repo: &impl ProjectRepository,
    now: DateTime<Utc>,
    input: NewProject,
) -> RepoResult<Project> {
    let project = input.into_project(now);
    repo.create_project(&project)?;
    Ok(project)
}

fn insert_task(repo: &impl TaskRepository, now: DateTime<Utc>, input: NewTask) -> RepoResult<Task> {
    let task = input.into_task(now);
    repo.create_task(&task)?;
    Ok(task)
}

fn days(count: i64) -> TimeDelta {
    TimeDelta::days(count)
}

fn hours(count: i64) -> TimeDelta {
    TimeDelta::hours(count)
}
