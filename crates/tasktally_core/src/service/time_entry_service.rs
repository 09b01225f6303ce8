//! Time entry CRUD and read-side filters.
//!
//! Direct create/update paths re-derive the duration from start/end times on
//! every write. Timer transitions live in `timer_service`.

use crate::clock::{Clock, SystemClock};
use crate::model::detail::TimeEntryDetails;
use crate::model::task::TaskId;
use crate::model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryId, TimeEntryPatch};
use crate::model::EntityKind;
use crate::repo::time_entry_repo::{TimeEntryListQuery, TimeEntryRepository};
use crate::service::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use log::info;

pub struct TimeEntryService<R: TimeEntryRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: TimeEntryRepository> TimeEntryService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: TimeEntryRepository, C: Clock> TimeEntryService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Records an entry with explicit times. Without an end time the entry
    /// is created running.
    pub fn create(&self, input: NewTimeEntry) -> ServiceResult<TimeEntry> {
        self.ensure_task_exists(input.task_id)?;
        let entry = input.into_entry(self.clock.now())?;
        self.repo.create_entry(&entry)?;
        info!(
            "event=time_entry_create module=service status=ok entry_id={} task_id={} duration_ms={}",
            entry.id, entry.task_id, entry.duration_ms
        );
        Ok(entry)
    }

    pub fn get(&self, id: TimeEntryId) -> ServiceResult<Option<TimeEntry>> {
        Ok(self.repo.get_entry(id)?)
    }

    pub fn get_details(&self, id: TimeEntryId) -> ServiceResult<Option<TimeEntryDetails>> {
        Ok(self.repo.get_entry_details(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<TimeEntryDetails>> {
        self.filter(TimeEntryListQuery::default())
    }

    pub fn list_by_task(&self, task_id: TaskId) -> ServiceResult<Vec<TimeEntryDetails>> {
        self.filter(TimeEntryListQuery {
            task_id: Some(task_id),
            ..TimeEntryListQuery::default()
        })
    }

    /// Entries whose start time lies in `[start, end]`. An inverted range
    /// matches nothing.
    pub fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<TimeEntryDetails>> {
        if start > end {
            return Ok(Vec::new());
        }
        self.filter(TimeEntryListQuery {
            started_from: Some(start),
            started_to: Some(end),
            ..TimeEntryListQuery::default()
        })
    }

    pub fn filter(&self, query: TimeEntryListQuery) -> ServiceResult<Vec<TimeEntryDetails>> {
        Ok(self.repo.list_entry_details(&query)?)
    }

    /// Applies a partial update and re-derives the duration.
    pub fn update(&self, id: TimeEntryId, patch: TimeEntryPatch) -> ServiceResult<TimeEntry> {
        let mut entry = self
            .repo
            .get_entry(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TimeEntry, id))?;

        if let Some(task_id) = patch.task_id {
            self.ensure_task_exists(task_id)?;
        }

        patch.apply_to(&mut entry)?;
        self.repo.update_entry(&entry)?;

        info!(
            "event=time_entry_update module=service status=ok entry_id={id} duration_ms={}",
            entry.duration_ms
        );
        Ok(entry)
    }

    pub fn delete(&self, id: TimeEntryId) -> ServiceResult<bool> {
        let existed = self.repo.delete_entry(id)?;
        info!("event=time_entry_delete module=service status=ok entry_id={id} existed={existed}");
        Ok(existed)
    }

    fn ensure_task_exists(&self, task_id: TaskId) -> ServiceResult<()> {
        if self.repo.task_exists(task_id)? {
            return Ok(());
        }
        Err(ServiceError::ParentNotFound {
            entity: EntityKind::Task,
            id: task_id,
        })
    }
}
