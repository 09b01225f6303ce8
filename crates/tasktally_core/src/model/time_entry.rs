//! Time entry domain model and timer state.
//!
//! # Responsibility
//! - Define one recorded (or in-progress) span of work against a task.
//! - Derive `duration_ms` from start/end times; callers never supply it.
//!
//! # Invariants
//! - `end_time`, when set, is not earlier than `start_time`.
//! - `duration_ms == end_time - start_time` when stopped, `0` while running.
//! - Stopped is terminal; there is no restart.

use crate::clock::truncate_to_millis;
use crate::model::task::TaskId;
use crate::model::validation::{require_text, ValidationError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TimeEntryId = Uuid;

pub const TIME_ENTRY_DESCRIPTION_MAX_CHARS: usize = 500;

/// Timer lifecycle state, derived from `end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub task_id: TaskId,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed milliseconds; zero while running.
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(
            "description",
            &self.description,
            TIME_ENTRY_DESCRIPTION_MAX_CHARS,
        )?;
        let expected_ms = span_millis(self.start_time, self.end_time)?;
        if expected_ms != self.duration_ms {
            return Err(ValidationError::DurationMismatch {
                expected_ms,
                actual_ms: self.duration_ms,
            });
        }
        Ok(())
    }

    pub fn state(&self) -> TimerState {
        if self.end_time.is_some() {
            TimerState::Stopped
        } else {
            TimerState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == TimerState::Running
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.duration_ms)
    }

    /// Elapsed time as of `now`.
    ///
    /// Running entries report `now - start_time` (never negative); stopped
    /// entries report their fixed duration.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.end_time {
            Some(_) => self.duration(),
            None => (now - self.start_time).max(TimeDelta::zero()),
        }
    }

    /// Re-derives `duration_ms` from the current start/end times.
    pub fn recompute_duration(&mut self) -> Result<(), ValidationError> {
        self.duration_ms = span_millis(self.start_time, self.end_time)?;
        Ok(())
    }

    /// Transitions Running -> Stopped at `at`.
    ///
    /// The caller is responsible for rejecting already-stopped entries; this
    /// only guards the time ordering.
    pub fn stop_at(&mut self, at: DateTime<Utc>) -> Result<(), ValidationError> {
        let at = truncate_to_millis(at);
        self.duration_ms = span_millis(self.start_time, Some(at))?;
        self.end_time = Some(at);
        Ok(())
    }
}

/// Creation input for a time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub task_id: TaskId,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl NewTimeEntry {
    pub fn new(task_id: TaskId, description: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            task_id,
            description: description.into(),
            start_time,
            end_time: None,
        }
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Materializes a record with a derived duration.
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<TimeEntry, ValidationError> {
        let mut entry = TimeEntry {
            id: Uuid::new_v4(),
            task_id: self.task_id,
            description: self.description,
            start_time: truncate_to_millis(self.start_time),
            end_time: self.end_time.map(truncate_to_millis),
            duration_ms: 0,
            created_at: now,
        };
        entry.recompute_duration()?;
        Ok(entry)
    }
}

/// Partial update for a time entry.
///
/// `end_time: Some(None)` clears the end time, returning the entry to
/// running with a zero duration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeEntryPatch {
    pub task_id: Option<TaskId>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
}

impl TimeEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.task_id.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }

    /// Applies present fields and re-derives the duration.
    pub fn apply_to(self, entry: &mut TimeEntry) -> Result<(), ValidationError> {
        if let Some(task_id) = self.task_id {
            entry.task_id = task_id;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        if let Some(start_time) = self.start_time {
            entry.start_time = truncate_to_millis(start_time);
        }
        if let Some(end_time) = self.end_time {
            entry.end_time = end_time.map(truncate_to_millis);
        }
        entry.recompute_duration()
    }
}

fn span_millis(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<i64, ValidationError> {
    match end {
        None => Ok(0),
        Some(end) if end < start => Err(ValidationError::EndBeforeStart { start, end }),
        Some(end) => Ok(end.timestamp_millis() - start.timestamp_millis()),
    }
}
