use crate::{ResourceKind, WorkspaceError};

const IDENTITY_PREFIX: &str = "workspace-";

/// longest child suffix is `-ingress`, names must stay within a 63 char label
pub const MAX_IDENTITY_LEN: usize = 63 - "-ingress".len();
const MIN_IDENTITY_LEN: usize = 6;

/// `jane.doe@example.com` becomes `workspace-jane-doe`
pub fn identity_from_email(raw: &str) -> String {
    let local_part = raw.split('@').next().unwrap_or_default();
    format!("{}{}", IDENTITY_PREFIX, local_part.trim().replace('.', "-"))
}

/// identity must be a DNS-1123 label short enough for every derived name
pub fn validate_identity(identity: &str) -> Result<(), WorkspaceError> {
    if identity.len() < MIN_IDENTITY_LEN {
        return Err(WorkspaceError::validation(format!(
            "workspace name '{}' is too short",
            identity
        )));
    }
    if identity.len() > MAX_IDENTITY_LEN {
        return Err(WorkspaceError::validation(format!(
            "workspace name '{}' is longer than {} characters",
            identity, MAX_IDENTITY_LEN
        )));
    }

    let valid_chars = identity
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let alphanumeric_ends = identity
        .chars()
        .next()
        .zip(identity.chars().last())
        .map(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric())
        .unwrap_or(false);

    if valid_chars && alphanumeric_ends {
        Ok(())
    } else {
        Err(WorkspaceError::validation(format!(
            "workspace name '{}' must contain only lowercase letters, digits and '-', \
             and start and end with a letter or digit",
            identity
        )))
    }
}

/// Names of the cluster resources of one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    pub identity: String,
    pub storage_claim: String,
    pub service: String,
    pub route: String,
    pub workload: String,
}

impl ResourceSet {
    pub fn derive(identity: &str) -> Self {
        Self {
            identity: identity.to_owned(),
            storage_claim: format!("{}-pvc", identity),
            service: format!("{}-service", identity),
            route: format!("{}-ingress", identity),
            workload: identity.to_owned(),
        }
    }

    pub fn name_of(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::StorageClaim => &self.storage_claim,
            ResourceKind::Workload => &self.workload,
            ResourceKind::Service => &self.service,
            ResourceKind::Route => &self.route,
        }
    }

    /// `app=<identity>`, shared by the workload, its pods and the service
    pub fn app_selector(&self) -> String {
        format!("app={}", self.identity)
    }
}
