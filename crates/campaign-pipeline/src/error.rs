use std::time::Duration;

use campaign_clients::{GenerationError, UploadError};
use thiserror::Error;

/// Failure of a persistence collaborator call.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Db(#[from] campaign_db::DbError),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single external call made on behalf of one stage.
///
/// Inside a run these are downgraded at the call site; only planning and the
/// final bulk write turn them into a [`PipelineError`].
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("{call} timed out after {limit:?}")]
    Timeout { call: &'static str, limit: Duration },

    #[error("cancelled")]
    Cancelled,
}

/// The only failures a caller of a run observes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("text plan generation failed: {0}")]
    Planning(#[source] StageError),

    #[error("bulk post insert failed: {0}")]
    Persistence(#[source] StageError),

    #[error("campaign run cancelled")]
    Cancelled,
}
