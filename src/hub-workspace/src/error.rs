use thiserror::Error;

use hub_metadata_client::api_status;
use hub_types::MetaStatus;

use crate::ProvisionStep;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("cluster request failed: {0}")]
    Upstream(#[source] anyhow::Error),
    #[error("creating {step} failed: {source}")]
    Provision {
        step: ProvisionStep,
        #[source]
        source: anyhow::Error,
    },
}

impl WorkspaceError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn already_exists(name: &str) -> Self {
        Self::Conflict(format!("{} already exists", name))
    }

    /// classify a failed step, a lost create race is still a conflict
    pub(crate) fn provision(step: ProvisionStep, name: &str, err: anyhow::Error) -> Self {
        match api_status(&err) {
            Some(status) if status.is_conflict() => Self::already_exists(name),
            _ => Self::Provision { step, source: err },
        }
    }
}

impl From<anyhow::Error> for WorkspaceError {
    fn from(err: anyhow::Error) -> Self {
        match api_status(&err) {
            Some(status) if status.is_not_found() => Self::NotFound(status_message(status)),
            Some(status) if status.is_conflict() => Self::Conflict(status_message(status)),
            _ => Self::Upstream(err),
        }
    }
}

fn status_message(status: &MetaStatus) -> String {
    status
        .message
        .clone()
        .unwrap_or_else(|| status.to_string())
}
