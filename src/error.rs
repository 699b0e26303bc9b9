// src/error.rs
//! Fatal error taxonomy for the curation pipeline.
//!
//! Everything else travels as a plain `anyhow::Error` and is treated as a
//! per-branch failure: logged, counted, and replaced by an empty
//! contribution. A fatal [`CurateError`] anywhere in the chain terminates the
//! run; [`CurateError::InvalidModelOutput`] is typed but stays per-item.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurateError {
    /// Required run configuration is absent (e.g. the Slack channel id).
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// A configured value is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A credential the client needs was not provided by the environment.
    #[error("missing credential: {0} environment variable is required")]
    MissingCredential(&'static str),

    /// Upstream state required by a step is absent or empty.
    #[error("missing required state: {0}")]
    MissingState(&'static str),

    /// A generation response did not contain a delimited final section.
    #[error("malformed generation: {0}")]
    MalformedGeneration(String),

    /// A structured model response failed shape validation.
    #[error("invalid model output: {0}")]
    InvalidModelOutput(String),
}

impl CurateError {
    /// True when `err` (or anything it wraps) must terminate the run.
    pub fn is_fatal(err: &anyhow::Error) -> bool {
        matches!(
            Self::find(err),
            Some(
                CurateError::MissingConfig(_)
                    | CurateError::InvalidConfig(_)
                    | CurateError::MissingCredential(_)
                    | CurateError::MissingState(_)
                    | CurateError::MalformedGeneration(_)
            )
        )
    }

    /// Returns the first [`CurateError`] found in the chain, if any.
    pub fn find(err: &anyhow::Error) -> Option<&CurateError> {
        err.chain().find_map(|e| e.downcast_ref::<CurateError>())
    }
}
