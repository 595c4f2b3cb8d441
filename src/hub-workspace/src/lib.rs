mod console;
mod credentials;
mod error;
mod manager;
mod model;
mod naming;
mod status;
mod template;

pub use console::{HubConsole, WorkspaceListing};
pub use console::NOT_READY_MESSAGE;
pub use credentials::{CredentialSource, LogScrapeCredentials};
pub use error::WorkspaceError;
pub use manager::WorkspaceManager;
pub use model::*;
pub use naming::{identity_from_email, validate_identity, ResourceSet};
pub use status::StatusResolver;
