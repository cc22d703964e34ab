// Domain-level errors for trail configuration.
use crate::domain::trail::TargetId;
use crate::domain::tuning::OptionsError;
use thiserror::Error;

/// Setup-time trail failures. These are programmer errors and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrailError {
    #[error("a trail with the id {0} already exists")]
    DuplicateEmitter(String),
    #[error("no trail with the id {0}")]
    UnknownEmitter(String),
    #[error("target {0} has no transform to emit from")]
    UnknownTarget(TargetId),
    #[error(transparent)]
    InvalidOptions(#[from] OptionsError),
}
