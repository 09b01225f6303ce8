//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce cross-entity rules (parent existence, timer transitions).
//! - Keep request layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Errors keep their kind end to end; nothing is retried or swallowed.

use crate::model::validation::ValidationError;
use crate::model::EntityKind;
use crate::repo::RepoError;
use thiserror::Error;
use uuid::Uuid;

pub mod aggregation_service;
pub mod project_service;
pub mod task_service;
pub mod time_entry_service;
pub mod timer_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error classification for request layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Id does not resolve, or the entity is in the wrong state.
    NotFound,
    /// Input rejected: missing/oversized field, unknown enum name, missing parent.
    Validation,
    /// Persistence failure, propagated unchanged.
    Storage,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },
    #[error("time entry already stopped: {0}")]
    AlreadyStopped(Uuid),
    /// A referenced parent does not exist.
    #[error("referenced {entity} does not exist: {id}")]
    ParentNotFound { entity: EntityKind, id: Uuid },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::AlreadyStopped(_) => ErrorKind::NotFound,
            Self::ParentNotFound { .. } | Self::Validation(_) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}
