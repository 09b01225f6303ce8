//! Read models with eagerly loaded relations.
//!
//! Shapes match what request layers render: a project with its tasks and
//! their entries, a task with its project name and entries, an entry with
//! its task title.

use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::time_entry::TimeEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<TaskDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub project_name: String,
    pub time_entries: Vec<TimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntryDetails {
    #[serde(flatten)]
    pub entry: TimeEntry,
    pub task_title: String,
}
