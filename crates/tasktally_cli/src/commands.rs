//! Dispatches parsed commands to core services and renders JSON.

use crate::args::{
    clearable, Command, EntryCommand, EntryCreateArgs, EntryUpdateArgs, ProjectCommand,
    ProjectCreateArgs, ProjectUpdateArgs, TaskCommand, TaskCreateArgs, TaskUpdateArgs,
    TimerCommand, TotalCommand,
};
use crate::error::CliError;
use chrono::{TimeDelta, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tasktally_core::{
    seed_demo_data, AggregationService, EntityKind, NewProject, NewTask, NewTimeEntry,
    ProjectPatch, ProjectService, SqliteProjectRepository, SqliteTaskRepository,
    SqliteTimeEntryRepository, SystemClock, TaskPatch, TaskService, TimeEntry, TimeEntryPatch,
    TimeEntryService, TimerService,
};
use uuid::Uuid;

/// A duration as ISO-8601 text plus integer milliseconds.
#[derive(Debug, Serialize)]
struct DurationView {
    iso: String,
    ms: i64,
}

impl From<TimeDelta> for DurationView {
    fn from(value: TimeDelta) -> Self {
        Self {
            iso: value.to_string(),
            ms: value.num_milliseconds(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EntryView {
    #[serde(flatten)]
    entry: TimeEntry,
    elapsed: DurationView,
}

#[derive(Debug, Serialize)]
struct DeleteView {
    id: Uuid,
    deleted: bool,
}

pub fn run(conn: &Connection, command: Command) -> Result<(), CliError> {
    match command {
        Command::Project(command) => project(conn, command),
        Command::Task(command) => task(conn, command),
        Command::Entry(command) => entry(conn, command),
        Command::Timer(command) => timer(conn, command),
        Command::Total(command) => total(conn, command),
        Command::Seed => {
            let seeded = seed_demo_data(conn, &SystemClock)?;
            print_json(&serde_json::json!({ "seeded": seeded }))
        }
    }
}

fn project(conn: &Connection, command: ProjectCommand) -> Result<(), CliError> {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn)?);
    match command {
        ProjectCommand::Create(ProjectCreateArgs {
            name,
            description,
            status,
            start_date,
            end_date,
        }) => {
            let mut input = NewProject::new(name, status, start_date.unwrap_or_else(Utc::now))
                .with_description(description);
            input.end_date = end_date;
            print_json(&service.create(input)?)
        }
        ProjectCommand::Get { id } => {
            let details = service.get_details(id)?.ok_or(CliError::NotFound {
                entity: EntityKind::Project,
                id,
            })?;
            print_json(&details)
        }
        ProjectCommand::List => print_json(&service.list_details()?),
        ProjectCommand::Update(ProjectUpdateArgs {
            id,
            name,
            description,
            status,
            start_date,
            end_date,
            clear_end_date,
        }) => {
            let patch = ProjectPatch {
                name,
                description,
                status,
                start_date,
                end_date: clearable(end_date, clear_end_date),
            };
            print_json(&service.update(id, patch)?)
        }
        ProjectCommand::Delete { id } => print_json(&DeleteView {
            id,
            deleted: service.delete(id)?,
        }),
        ProjectCommand::ByStatus { status } => print_json(&service.list_by_status(status)?),
    }
}

fn task(conn: &Connection, command: TaskCommand) -> Result<(), CliError> {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
    match command {
        TaskCommand::Create(TaskCreateArgs {
            project,
            title,
            description,
            status,
            priority,
            due_date,
        }) => {
            let mut input =
                NewTask::new(project, title, status, priority).with_description(description);
            input.due_date = due_date;
            print_json(&service.create(input)?)
        }
        TaskCommand::Get { id } => {
            let details = service.get_details(id)?.ok_or(CliError::NotFound {
                entity: EntityKind::Task,
                id,
            })?;
            print_json(&details)
        }
        TaskCommand::List => print_json(&service.list()?),
        TaskCommand::Update(TaskUpdateArgs {
            id,
            project,
            title,
            description,
            status,
            priority,
            due_date,
            clear_due_date,
        }) => {
            let patch = TaskPatch {
                project_id: project,
                title,
                description,
                status,
                priority,
                due_date: clearable(due_date, clear_due_date),
            };
            print_json(&service.update(id, patch)?)
        }
        TaskCommand::Delete { id } => print_json(&DeleteView {
            id,
            deleted: service.delete(id)?,
        }),
        TaskCommand::ByProject { project_id } => {
            print_json(&service.list_by_project(project_id)?)
        }
        TaskCommand::ByStatus { status } => print_json(&service.list_by_status(status)?),
        TaskCommand::ByPriority { priority } => print_json(&service.list_by_priority(priority)?),
        TaskCommand::Overdue => print_json(&service.list_overdue()?),
    }
}

fn entry(conn: &Connection, command: EntryCommand) -> Result<(), CliError> {
    let service = TimeEntryService::new(SqliteTimeEntryRepository::try_new(conn)?);
    match command {
        EntryCommand::Create(EntryCreateArgs {
            task,
            description,
            start_time,
            end_time,
        }) => {
            let mut input = NewTimeEntry::new(task, description, start_time);
            input.end_time = end_time;
            print_json(&service.create(input)?)
        }
        EntryCommand::Get { id } => {
            let details = service.get_details(id)?.ok_or(CliError::NotFound {
                entity: EntityKind::TimeEntry,
                id,
            })?;
            print_json(&details)
        }
        EntryCommand::List => print_json(&service.list()?),
        EntryCommand::Update(EntryUpdateArgs {
            id,
            task,
            description,
            start_time,
            end_time,
            clear_end_time,
        }) => {
            let patch = TimeEntryPatch {
                task_id: task,
                description,
                start_time,
                end_time: clearable(end_time, clear_end_time),
            };
            print_json(&service.update(id, patch)?)
        }
        EntryCommand::Delete { id } => print_json(&DeleteView {
            id,
            deleted: service.delete(id)?,
        }),
        EntryCommand::ByTask { task_id } => print_json(&service.list_by_task(task_id)?),
        EntryCommand::ByRange { from, to } => {
            print_json(&service.list_by_date_range(from, to)?)
        }
    }
}

fn timer(conn: &Connection, command: TimerCommand) -> Result<(), CliError> {
    let service = TimerService::new(SqliteTimeEntryRepository::try_new(conn)?);
    match command {
        TimerCommand::Start {
            task_id,
            description,
        } => print_json(&service.start_timer(task_id, description)?),
        TimerCommand::Stop { entry_id } => {
            let entry = service.stop_timer(entry_id)?;
            let elapsed = entry.duration().into();
            print_json(&EntryView { entry, elapsed })
        }
        TimerCommand::Elapsed { entry_id } => {
            let elapsed: DurationView = service.elapsed(entry_id)?.into();
            print_json(&serde_json::json!({ "id": entry_id, "elapsed": elapsed }))
        }
    }
}

fn total(conn: &Connection, command: TotalCommand) -> Result<(), CliError> {
    let service = AggregationService::new(SqliteTimeEntryRepository::try_new(conn)?);
    match command {
        TotalCommand::Task { task_id } => {
            let total: DurationView = service.total_for_task(task_id)?.into();
            print_json(&serde_json::json!({ "task_id": task_id, "total": total }))
        }
        TotalCommand::Project { project_id } => {
            let breakdown = service.project_breakdown(project_id)?;
            let total: DurationView = breakdown.total().into();
            print_json(&serde_json::json!({
                "project_id": project_id,
                "total": total,
                "tasks": breakdown.tasks,
            }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
