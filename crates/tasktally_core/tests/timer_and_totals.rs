use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rusqlite::Connection;
use std::thread::sleep;
use std::time::Duration;
use tasktally_core::db::open_db_in_memory;
use tasktally_core::{
    AggregationService, EntityKind, ErrorKind, ManualClock, NewProject, NewTask, NewTimeEntry,
    Project, ProjectService, ProjectStatus, ServiceError, SqliteProjectRepository,
    SqliteTaskRepository, SqliteTimeEntryRepository, Task, TaskPriority, TaskService, TaskStatus,
    TimeEntryService, TimerService,
};
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn seed_project(conn: &Connection) -> Project {
    ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap())
        .create(NewProject::new("P1", ProjectStatus::InProgress, start()))
        .unwrap()
}

fn seed_task(conn: &Connection, project: &Project, title: &str) -> Task {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
        .create(NewTask::new(
            project.id,
            title,
            TaskStatus::InProgress,
            TaskPriority::High,
        ))
        .unwrap()
}

fn record(conn: &Connection, task: &Task, from: DateTime<Utc>, minutes: i64) {
    TimeEntryService::new(SqliteTimeEntryRepository::try_new(conn).unwrap())
        .create(
            NewTimeEntry::new(task.id, "work", from)
                .with_end_time(from + TimeDelta::minutes(minutes)),
        )
        .unwrap();
}

fn totals(conn: &Connection) -> AggregationService<SqliteTimeEntryRepository<'_>> {
    AggregationService::new(SqliteTimeEntryRepository::try_new(conn).unwrap())
}

#[test]
fn start_then_stop_fixes_duration() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let task = seed_task(&conn, &project, "T1");
    let clock = ManualClock::new(start());
    let timer = TimerService::with_clock(SqliteTimeEntryRepository::try_new(&conn).unwrap(), &clock);

    let running = timer.start_timer(task.id, "focus").unwrap();
    assert!(running.is_running());
    assert_eq!(running.start_time, start());
    assert_eq!(running.duration_ms, 0);

    clock.advance(TimeDelta::minutes(25));
    assert_eq!(timer.elapsed(running.id).unwrap(), TimeDelta::minutes(25));
    assert_eq!(totals(&conn).total_for_task(task.id).unwrap(), TimeDelta::zero());

    let stopped = timer.stop_timer(running.id).unwrap();
    assert_eq!(stopped.end_time, Some(start() + TimeDelta::minutes(25)));
    assert_eq!(stopped.duration(), TimeDelta::minutes(25));

    clock.advance(TimeDelta::hours(1));
    assert_eq!(timer.elapsed(running.id).unwrap(), TimeDelta::minutes(25));
}

#[test]
fn start_timer_for_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let timer = TimerService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap());

    let err = timer.start_timer(Uuid::new_v4(), "focus").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Task,
            ..
        }
    ));
}

#[test]
fn start_timer_validates_description() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let task = seed_task(&conn, &project, "T1");
    let timer = TimerService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap());

    let err = timer.start_timer(task.id, "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = timer.start_timer(task.id, "x".repeat(501)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn second_stop_is_not_found_and_total_is_not_double_counted() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let task = seed_task(&conn, &project, "T1");
    let clock = ManualClock::new(start());
    let timer = TimerService::with_clock(SqliteTimeEntryRepository::try_new(&conn).unwrap(), &clock);

    let entry = timer.start_timer(task.id, "focus").unwrap();
    clock.advance(TimeDelta::minutes(10));
    timer.stop_timer(entry.id).unwrap();

    clock.advance(TimeDelta::minutes(10));
    let err = timer.stop_timer(entry.id).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyStopped(id) if id == entry.id));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = timer.stop_timer(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(
        totals(&conn).total_for_task(task.id).unwrap(),
        TimeDelta::minutes(10)
    );
}

#[test]
fn several_timers_may_run_on_one_task() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let task = seed_task(&conn, &project, "T1");
    let clock = ManualClock::new(start());
    let timer = TimerService::with_clock(SqliteTimeEntryRepository::try_new(&conn).unwrap(), &clock);

    let first = timer.start_timer(task.id, "one").unwrap();
    clock.advance(TimeDelta::minutes(1));
    let second = timer.start_timer(task.id, "two").unwrap();

    let running: Vec<Uuid> = timer
        .running(Some(task.id))
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(running, vec![first.id, second.id]);

    clock.advance(TimeDelta::minutes(4));
    timer.stop_timer(first.id).unwrap();
    timer.stop_timer(second.id).unwrap();

    assert!(timer.running(None).unwrap().is_empty());
    assert_eq!(
        totals(&conn).total_for_task(task.id).unwrap(),
        TimeDelta::minutes(9)
    );
}

#[test]
fn running_entries_do_not_count_toward_totals() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let task = seed_task(&conn, &project, "T1");
    record(&conn, &task, start(), 90);

    let before = totals(&conn).total_for_task(task.id).unwrap();
    TimerService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap())
        .start_timer(task.id, "still going")
        .unwrap();
    let after = totals(&conn).total_for_task(task.id).unwrap();

    assert_eq!(before, TimeDelta::minutes(90));
    assert_eq!(after, before);
    assert_eq!(
        totals(&conn).total_for_project(project.id).unwrap(),
        TimeDelta::minutes(90)
    );
}

#[test]
fn project_total_is_sum_of_task_totals() {
    let conn = open_db_in_memory().unwrap();
    let project = seed_project(&conn);
    let design = seed_task(&conn, &project, "Design Homepage");
    let setup = seed_task(&conn, &project, "Setup Database");
    let idle = seed_task(&conn, &project, "Idle");

    record(&conn, &design, start(), 120);
    record(&conn, &design, start() + TimeDelta::days(1), 120);
    record(&conn, &setup, start(), 180);

    let service = totals(&conn);
    let design_total = service.total_for_task(design.id).unwrap();
    let setup_total = service.total_for_task(setup.id).unwrap();
    assert_eq!(design_total, TimeDelta::hours(4));
    assert_eq!(setup_total, TimeDelta::hours(3));
    assert_eq!(service.total_for_task(idle.id).unwrap(), TimeDelta::zero());

    let project_total = service.total_for_project(project.id).unwrap();
    assert_eq!(project_total, design_total + setup_total);

    let breakdown = service.project_breakdown(project.id).unwrap();
    assert_eq!(breakdown.total(), project_total);
    assert_eq!(breakdown.tasks.len(), 3);
    let summed: i64 = breakdown.tasks.iter().map(|task| task.total_ms).sum();
    assert_eq!(summed, project_total.num_milliseconds());
}

#[test]
fn unknown_ids_total_zero() {
    let conn = open_db_in_memory().unwrap();
    let service = totals(&conn);

    assert_eq!(
        service.total_for_project(Uuid::new_v4()).unwrap(),
        TimeDelta::zero()
    );
    assert_eq!(
        service.total_for_task(Uuid::new_v4()).unwrap(),
        TimeDelta::zero()
    );
    assert!(service
        .project_breakdown(Uuid::new_v4())
        .unwrap()
        .tasks
        .is_empty());
}

#[test]
fn wall_clock_timer_matches_elapsed_time() {
    let conn = open_db_in_memory().unwrap();
    let project = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap())
        .create(NewProject::new("P1", ProjectStatus::Planning, Utc::now()))
        .unwrap();
    let task = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap())
        .create(NewTask::new(
            project.id,
            "T1",
            TaskStatus::ToDo,
            TaskPriority::Medium,
        ))
        .unwrap();
    let timer = TimerService::new(SqliteTimeEntryRepository::try_new(&conn).unwrap());

    let entry = timer.start_timer(task.id, "real time").unwrap();
    sleep(Duration::from_millis(200));
    let stopped = timer.stop_timer(entry.id).unwrap();

    let recorded = stopped.duration().num_milliseconds();
    assert!(
        (190..5_000).contains(&recorded),
        "recorded {recorded}ms for a 200ms sleep"
    );
    assert_eq!(
        totals(&conn).total_for_project(project.id).unwrap(),
        stopped.duration()
    );
}
