//! Running-timer state machine.
//!
//! # Responsibility
//! - Start a running entry for an existing task at "now".
//! - Stop a running entry exactly once, fixing its duration.
//!
//! # Invariants
//! - Running is a data state (`end_time` unset); nothing ticks in memory.
//! - Stopped is terminal. A second stop reports `AlreadyStopped`, whose
//!   kind is `NotFound`, and never changes the recorded duration.
//! - A task may have several running entries at once.

use crate::clock::{Clock, SystemClock};
use crate::model::task::TaskId;
use crate::model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryId, TimerState};
use crate::model::EntityKind;
use crate::repo::time_entry_repo::{TimeEntryListQuery, TimeEntryRepository};
use crate::service::{ServiceError, ServiceResult};
use chrono::TimeDelta;
use log::{info, warn};

pub struct TimerService<R: TimeEntryRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: TimeEntryRepository> TimerService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: TimeEntryRepository, C: Clock> TimerService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Starts a running entry for `task_id`.
    ///
    /// Returns `NotFound` when the task does not exist.
    pub fn start_timer(
        &self,
        task_id: TaskId,
        description: impl Into<String>,
    ) -> ServiceResult<TimeEntry> {
        if !self.repo.task_exists(task_id)? {
            return Err(ServiceError::not_found(EntityKind::Task, task_id));
        }

        let now = self.clock.now();
        let entry = NewTimeEntry::new(task_id, description, now).into_entry(now)?;
        self.repo.create_entry(&entry)?;

        info!(
            "event=timer_start module=timer status=ok entry_id={} task_id={task_id}",
            entry.id
        );
        Ok(entry)
    }

    /// Stops a running entry at the current instant.
    pub fn stop_timer(&self, id: TimeEntryId) -> ServiceResult<TimeEntry> {
        let mut entry = self
            .repo
            .get_entry(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TimeEntry, id))?;

        if entry.state() == TimerState::Stopped {
            warn!("event=timer_stop module=timer status=rejected entry_id={id} reason=already_stopped");
            return Err(ServiceError::AlreadyStopped(id));
        }

        entry.stop_at(self.clock.now())?;
        if !self.repo.stop_entry(&entry)? {
            // Stopped (or deleted) by another caller between read and write.
            warn!("event=timer_stop module=timer status=rejected entry_id={id} reason=lost_race");
            return Err(ServiceError::AlreadyStopped(id));
        }

        info!(
            "event=timer_stop module=timer status=ok entry_id={id} duration_ms={}",
            entry.duration_ms
        );
        Ok(entry)
    }

    /// Elapsed time of one entry, computed on demand for running entries.
    pub fn elapsed(&self, id: TimeEntryId) -> ServiceResult<TimeDelta> {
        let entry = self
            .repo
            .get_entry(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TimeEntry, id))?;
        Ok(entry.elapsed_at(self.clock.now()))
    }

    /// Running entries, optionally restricted to one task.
    pub fn running(&self, task_id: Option<TaskId>) -> ServiceResult<Vec<TimeEntry>> {
        Ok(self.repo.list_entries(&TimeEntryListQuery {
            task_id,
            state: Some(TimerState::Running),
            ..TimeEntryListQuery::default()
        })?)
    }
}
