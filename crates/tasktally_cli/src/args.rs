//! Command-line surface.
//!
//! Status and priority arguments take exact symbolic names (`InProgress`).
//! Instants are RFC 3339 (`2024-03-01T09:00:00Z`).

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tasktally_core::{ProjectStatus, TaskPriority, TaskStatus};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "tasktally")]
#[command(about = "Track time spent on projects and tasks", version)]
pub struct Cli {
    /// SQLite database file (env: TASKTALLY_DB)
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (env: TASKTALLY_LOG_LEVEL)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files (env: TASKTALLY_LOG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage time entries
    #[command(subcommand)]
    Entry(EntryCommand),
    /// Start and stop running timers
    #[command(subcommand)]
    Timer(TimerCommand),
    /// Sum recorded time
    #[command(subcommand)]
    Total(TotalCommand),
    /// Insert demo data into an empty database
    Seed,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    Create(ProjectCreateArgs),
    Get { id: Uuid },
    /// List every project with its tasks and time entries
    List,
    Update(ProjectUpdateArgs),
    /// Delete a project with all of its tasks and time entries
    Delete { id: Uuid },
    ByStatus { status: ProjectStatus },
}

#[derive(Debug, Args)]
pub struct ProjectCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "Planning")]
    pub status: ProjectStatus,
    /// Defaults to now
    #[arg(long)]
    pub start_date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct ProjectUpdateArgs {
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<ProjectStatus>,
    #[arg(long)]
    pub start_date: Option<DateTime<Utc>>,
    #[arg(long, conflicts_with = "clear_end_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub clear_end_date: bool,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    Create(TaskCreateArgs),
    Get { id: Uuid },
    List,
    Update(TaskUpdateArgs),
    /// Delete a task with all of its time entries
    Delete { id: Uuid },
    ByProject { project_id: Uuid },
    ByStatus { status: TaskStatus },
    ByPriority { priority: TaskPriority },
    /// Tasks past their due date that are not completed
    Overdue,
}

#[derive(Debug, Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub project: Uuid,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "ToDo")]
    pub status: TaskStatus,
    #[arg(long, default_value = "Medium")]
    pub priority: TaskPriority,
    #[arg(long)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct TaskUpdateArgs {
    pub id: Uuid,
    /// Move the task to another project
    #[arg(long)]
    pub project: Option<Uuid>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long, conflicts_with = "clear_due_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub clear_due_date: bool,
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    Create(EntryCreateArgs),
    Get { id: Uuid },
    List,
    Update(EntryUpdateArgs),
    Delete { id: Uuid },
    ByTask { task_id: Uuid },
    /// Entries starting within [FROM, TO], inclusive
    ByRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

#[derive(Debug, Args)]
pub struct EntryCreateArgs {
    #[arg(long)]
    pub task: Uuid,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub start_time: DateTime<Utc>,
    /// Leave unset to record a running entry
    #[arg(long)]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Args)]
pub struct EntryUpdateArgs {
    pub id: Uuid,
    #[arg(long)]
    pub task: Option<Uuid>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub start_time: Option<DateTime<Utc>>,
    #[arg(long, conflicts_with = "clear_end_time")]
    pub end_time: Option<DateTime<Utc>>,
    /// Return the entry to running
    #[arg(long)]
    pub clear_end_time: bool,
}

#[derive(Debug, Subcommand)]
pub enum TimerCommand {
    Start {
        task_id: Uuid,
        #[arg(long)]
        description: String,
    },
    Stop { entry_id: Uuid },
    /// Elapsed time of an entry, live for running ones
    Elapsed { entry_id: Uuid },
}

#[derive(Debug, Subcommand)]
pub enum TotalCommand {
    Task { task_id: Uuid },
    /// Project total with a per-task breakdown
    Project { project_id: Uuid },
}

/// Turns a value flag plus a `--clear-*` flag into a patch field.
pub fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}
