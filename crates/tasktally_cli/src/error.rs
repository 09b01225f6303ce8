use tasktally_core::{
    ConfigError, DbError, EntityKind, ErrorKind, LoggingError, RepoError, ServiceError,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl CliError {
    /// 2 for rejected input, 3 for missing entities, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Service(err) => match err.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::NotFound => 3,
                ErrorKind::Storage => 1,
            },
            Self::Logging(_) | Self::Db(_) | Self::Output(_) => 1,
        }
    }
}
