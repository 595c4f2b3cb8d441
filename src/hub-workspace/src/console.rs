use std::fmt;

use serde::Serialize;
use tracing::error;

use hub_metadata_client::MetadataClient;

use crate::{
    identity_from_email, ResourceSpec, WorkspaceDescriptor, WorkspaceError, WorkspaceManager,
};

pub const NOT_READY_MESSAGE: &str = "Workspace is not ready yet. Try again in a minute.";
const EMAIL_REQUIRED: &str = "Error: The email field is required.";
const CREATED: &str = "Workspace created. Wait 5 minutes and refresh.";

/// What the console shows for `list`
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceListing {
    pub workspaces: Vec<WorkspaceDescriptor>,
    pub summary: String,
}

impl fmt::Display for WorkspaceListing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for workspace in &self.workspaces {
            writeln!(
                f,
                "{}\tcpu={}\tmemory={}\tgpu={}\t{}",
                workspace.name,
                display_or_dash(&workspace.cpu_limit),
                display_or_dash(&workspace.memory_limit),
                display_or_dash(&workspace.gpu_limit),
                workspace.status
            )?;
        }
        write!(f, "{}", self.summary)
    }
}

fn display_or_dash<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_owned())
}

/// Text boundary in front of the manager: every outcome, failures included, is rendered
pub struct HubConsole<C> {
    manager: WorkspaceManager<C>,
}

impl<C> HubConsole<C>
where
    C: MetadataClient,
{
    pub fn new(manager: WorkspaceManager<C>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &WorkspaceManager<C> {
        &self.manager
    }

    pub async fn create(&self, spec: &ResourceSpec, raw_email: &str) -> String {
        if raw_email.trim().is_empty() {
            return EMAIL_REQUIRED.to_owned();
        }

        let identity = identity_from_email(raw_email);
        match self.manager.create(&identity, spec).await {
            Ok(_) => CREATED.to_owned(),
            Err(err) => render_error(&identity, err),
        }
    }

    pub async fn start(&self, identity: &str) -> String {
        match self.manager.start(identity).await {
            Ok(()) => format!("Workspace {} started.", identity),
            Err(err) => render_error(identity, err),
        }
    }

    pub async fn stop(&self, identity: &str) -> String {
        match self.manager.stop(identity).await {
            Ok(()) => format!("Workspace {} stopped.", identity),
            Err(err) => render_error(identity, err),
        }
    }

    pub async fn delete(&self, identity: &str) -> String {
        match self.manager.delete(identity).await {
            Ok(()) => format!("Workspace {} deleted.", identity),
            Err(err) => render_error(identity, err),
        }
    }

    pub async fn inspect(&self, identity: &str) -> String {
        match self.manager.inspect(identity).await {
            Ok(phase) => format!("{}: {}", identity, phase),
            Err(err) => render_error(identity, err),
        }
    }

    pub async fn list(&self) -> WorkspaceListing {
        match self.manager.list().await {
            Ok(workspaces) => WorkspaceListing {
                summary: format!("The cluster is running {} workspaces.", workspaces.len()),
                workspaces,
            },
            Err(err) => {
                error!("listing workspaces failed: {}", err);
                WorkspaceListing {
                    workspaces: vec![],
                    summary: format!("Error: {}", err),
                }
            }
        }
    }

    pub async fn connection_token(&self, identity: &str) -> String {
        match self.manager.connection_token(identity).await {
            Ok(Some(token)) => token,
            Ok(None) => NOT_READY_MESSAGE.to_owned(),
            Err(err) => render_error(identity, err),
        }
    }
}

fn render_error(identity: &str, err: WorkspaceError) -> String {
    error!(%identity, "{}", err);
    format!("Error: {}", err)
}
