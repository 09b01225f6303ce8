use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rusqlite::Connection;
use std::collections::HashSet;
use tasktally_core::db::open_db_in_memory;
use tasktally_core::{
    Clock, EntityKind, ErrorKind, ManualClock, NewProject, NewTask, NewTimeEntry, Project,
    ProjectService, ProjectStatus, ServiceError, SqliteProjectRepository, SqliteTaskRepository,
    SqliteTimeEntryRepository, TaskPatch, TaskPriority, TaskService, TaskStatus,
    TimeEntryService, ValidationError,
};
use uuid::Uuid;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn seed_project(conn: &Connection, name: &str) -> Project {
    ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap())
        .create(NewProject::new(name, ProjectStatus::InProgress, noon()))
        .unwrap()
}

#[test]
fn create_requires_existing_project() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = service
        .create(NewTask::new(
            missing,
            "orphan",
            TaskStatus::ToDo,
            TaskPriority::Low,
        ))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        err,
        ServiceError::ParentNotFound {
            entity: EntityKind::Project,
            id
        } if id == missing
    ));
}

#[test]
fn details_include_project_name_and_entries() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Website Redesign");
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service
        .create(
            NewTask::new(
                project.id,
                "Design Homepage",
                TaskStatus::InProgress,
                TaskPriority::High,
            )
            .with_description("Create new homepage design"),
        )
        .unwrap();

    let details = service.get_details(task.id).unwrap().unwrap();
    assert_eq!(details.task, task);
    assert_eq!(details.project_name, "Website Redesign");
    assert!(details.time_entries.is_empty());
}

#[test]
fn update_can_move_task_and_clear_due_date() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_project(&conn, "First");
    let second = seed_project(&conn, "Second");
    let clock = ManualClock::new(noon());
    let service = TaskService::with_clock(SqliteTaskRepository::try_new(&conn).unwrap(), &clock);

    let task = service
        .create(
            NewTask::new(first.id, "T", TaskStatus::ToDo, TaskPriority::Medium)
                .with_due_date(noon() + TimeDelta::days(1)),
        )
        .unwrap();

    let err = service
        .update(
            task.id,
            TaskPatch {
                project_id: Some(Uuid::new_v4()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    clock.advance(TimeDelta::seconds(1));
    let moved = service
        .update(
            task.id,
            TaskPatch {
                project_id: Some(second.id),
                due_date: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.project_id, second.id);
    assert_eq!(moved.due_date, None);
    assert_eq!(moved.updated_at, clock.now());
    assert_eq!(moved.created_at, task.created_at);

    assert!(service.list_by_project(first.id).unwrap().is_empty());
    assert_eq!(service.list_by_project(second.id).unwrap().len(), 1);
}

#[test]
fn update_rejects_blank_title_and_keeps_row() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "P");
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service
        .create(NewTask::new(
            project.id,
            "T",
            TaskStatus::ToDo,
            TaskPriority::Low,
        ))
        .unwrap();

    let err = service
        .update(
            task.id,
            TaskPatch {
                title: Some(String::new()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::Required { field: "title" })
    ));
    assert_eq!(service.get(task.id).unwrap().unwrap().title, "T");
}

#[test]
fn status_and_priority_filters_match_exactly() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "P");
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let review = service
        .create(NewTask::new(
            project.id,
            "review",
            TaskStatus::InReview,
            TaskPriority::Critical,
        ))
        .unwrap();
    service
        .create(NewTask::new(
            project.id,
            "todo",
            TaskStatus::ToDo,
            TaskPriority::Low,
        ))
        .unwrap();

    let by_status = service.list_by_status(TaskStatus::InReview).unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].task.id, review.id);

    let by_priority = service.list_by_priority(TaskPriority::Critical).unwrap();
    assert_eq!(by_priority.len(), 1);
    assert_eq!(by_priority[0].task.id, review.id);

    assert!(service.list_by_status(TaskStatus::Completed).unwrap().is_empty());

    let err = "critical".parse::<TaskPriority>().unwrap_err();
    assert!(matches!(err, ValidationError::UnknownValue { .. }));
    assert!("Todo".parse::<TaskStatus>().is_err());
}

#[test]
fn overdue_excludes_completed_but_keeps_cancelled() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "P");
    let clock = ManualClock::new(noon());
    let service = TaskService::with_clock(SqliteTaskRepository::try_new(&conn).unwrap(), &clock);

    let yesterday = noon() - TimeDelta::days(1);
    let create = |title: &str, status: TaskStatus, due: Option<DateTime<Utc>>| {
        let mut input = NewTask::new(project.id, title, status, TaskPriority::Medium);
        input.due_date = due;
        service.create(input).unwrap()
    };

    let late = create("late", TaskStatus::InProgress, Some(yesterday));
    let cancelled = create("cancelled", TaskStatus::Cancelled, Some(yesterday));
    create("done", TaskStatus::Completed, Some(yesterday));
    create("undated", TaskStatus::ToDo, None);
    create("future", TaskStatus::ToDo, Some(noon() + TimeDelta::days(1)));
    create("due now", TaskStatus::ToDo, Some(noon()));

    let overdue: HashSet<Uuid> = service
        .list_overdue()
        .unwrap()
        .into_iter()
        .map(|details| details.task.id)
        .collect();
    assert_eq!(overdue, HashSet::from([late.id, cancelled.id]));

    // Time passing makes the future task overdue too.
    clock.advance(TimeDelta::days(2));
    assert_eq!(service.list_overdue().unwrap().len(), 4);
}

#[test]
fn delete_removes_task_and_its_entries() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "P");
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let entries = TimeEntryService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap());

    let doomed = tasks
        .create(NewTask::new(
            project.id,
            "doomed",
            TaskStatus::ToDo,
            TaskPriority::Low,
        ))
        .unwrap();
    let kept = tasks
        .create(NewTask::new(
            project.id,
            "kept",
            TaskStatus::ToDo,
            TaskPriority::Low,
        ))
        .unwrap();
    let doomed_entry = entries
        .create(
            NewTimeEntry::new(doomed.id, "work", noon())
                .with_end_time(noon() + TimeDelta::hours(1)),
        )
        .unwrap();
    let kept_entry = entries
        .create(NewTimeEntry::new(kept.id, "work", noon()))
        .unwrap();

    assert!(tasks.delete(doomed.id).unwrap());
    assert!(!tasks.delete(doomed.id).unwrap());

    assert!(tasks.get(doomed.id).unwrap().is_none());
    assert!(entries.get(doomed_entry.id).unwrap().is_none());
    assert!(entries.get(kept_entry.id).unwrap().is_some());

    let details = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap())
        .get_details(project.id)
        .unwrap()
        .unwrap();
    assert_eq!(details.tasks.len(), 1);
    assert_eq!(details.tasks[0].task.id, kept.id);
}

#[test]
fn list_attaches_entries_across_many_tasks() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn, "Bulk");
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let entries = TimeEntryService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap());

    let created: Vec<_> = (0..1_200)
        .map(|index| {
            tasks
                .create(NewTask::new(
                    project.id,
                    format!("T{index}"),
                    TaskStatus::ToDo,
                    TaskPriority::Low,
                ))
                .unwrap()
        })
        .collect();
    let first = &created[0];
    let last = &created[created.len() - 1];
    for task in [first, last] {
        entries
            .create(NewTimeEntry::new(task.id, "work", noon()))
            .unwrap();
    }

    let listed = tasks.list().unwrap();
    assert_eq!(listed.len(), created.len());
    let with_entries: HashSet<_> = listed
        .iter()
        .filter(|details| details.time_entries.len() == 1)
        .map(|details| details.task.id)
        .collect();
    assert_eq!(with_entries, HashSet::from([first.id, last.id]));
}
