use std::fs::File;
use std::path::Path;

use dirs::home_dir;
use serde::Deserialize;
use tracing::trace;

use crate::ConfigError;

pub const KUBECONFIG: &str = "KUBECONFIG";

/// Entry of one of the kubeconfig lists, the payload sits under
/// `cluster:`, `context:` or `user:` depending on the list
#[derive(Debug, Deserialize)]
pub struct Named<T> {
    pub name: String,
    #[serde(alias = "cluster", alias = "context", alias = "user")]
    pub item: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClusterDetail {
    pub server: String,
    pub certificate_authority: Option<String>,
    pub certificate_authority_data: Option<String>,
    pub insecure_skip_tls_verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContextDetail {
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

/// only the credentials the hub client can use: certificates or a bearer token
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserDetail {
    pub client_certificate: Option<String>,
    pub client_key: Option<String>,
    pub client_certificate_data: Option<String>,
    pub client_key_data: Option<String>,
    pub token: Option<String>,
}

/// The subset of `~/.kube/config` needed to reach one cluster
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct KubeConfig {
    pub current_context: String,
    pub clusters: Vec<Named<ClusterDetail>>,
    pub contexts: Vec<Named<ContextDetail>>,
    pub users: Vec<Named<UserDetail>>,
}

/// current context with its cluster and user resolved
#[derive(Debug)]
pub struct CurrentContext<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
    pub cluster: &'a ClusterDetail,
    pub user: &'a UserDetail,
}

fn lookup<'a, T>(
    entries: &'a [Named<T>],
    kind: &'static str,
    name: &str,
) -> Result<&'a T, ConfigError> {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| &entry.item)
        .ok_or_else(|| ConfigError::MissingEntry {
            kind,
            name: name.to_owned(),
        })
}

impl KubeConfig {
    /// `~/.kube/config`
    pub fn from_home() -> Result<Self, ConfigError> {
        let home = home_dir().ok_or(ConfigError::NoHomeDir)?;
        Self::from_file(home.join(".kube").join("config"))
    }

    pub fn from_env_or_home() -> Result<Self, ConfigError> {
        match std::env::var(KUBECONFIG) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_home(),
        }
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        trace!(path = %path.as_ref().display(), "reading kubeconfig");
        Ok(serde_yaml::from_reader(File::open(path)?)?)
    }

    pub fn current(&self) -> Result<CurrentContext<'_>, ConfigError> {
        if self.current_context.is_empty() {
            return Err(ConfigError::NoCurrentContext);
        }
        let context = lookup(&self.contexts, "context", &self.current_context)?;

        Ok(CurrentContext {
            name: &self.current_context,
            namespace: context.namespace.as_deref().unwrap_or("default"),
            cluster: lookup(&self.clusters, "cluster", &context.cluster)?,
            user: lookup(&self.users, "user", &context.user)?,
        })
    }
}
