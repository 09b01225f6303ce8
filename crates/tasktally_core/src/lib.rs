//! Core domain logic for TaskTally.
//! Projects own tasks, tasks accumulate time entries; this crate holds the
//! invariants, the timer state machine and the time aggregation queries.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigOverrides, TrackerConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::detail::{ProjectDetails, TaskDetails, TimeEntryDetails};
pub use model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectStatus};
pub use model::task::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
pub use model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryId, TimeEntryPatch, TimerState};
pub use model::validation::ValidationError;
pub use model::EntityKind;
pub use repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::time_entry_repo::{
    SqliteTimeEntryRepository, TaskTimeTotal, TimeEntryListQuery, TimeEntryRepository,
};
pub use repo::{RepoError, RepoResult};
pub use seed::seed_demo_data;
pub use service::aggregation_service::{AggregationService, ProjectTimeBreakdown};
pub use service::project_service::ProjectService;
pub use service::task_service::TaskService;
pub use service::time_entry_service::TimeEntryService;
pub use service::timer_service::TimerService;
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
