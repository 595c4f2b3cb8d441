use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::trace;

use crate::ConfigError;
use crate::KubeConfig;

const BASE_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const API_SERVER: &str = "https://kubernetes.default.svc";

/// Configuration as Pod
#[derive(Debug, Default, Clone)]
pub struct PodConfig {
    pub namespace: String,
    pub token: String,
}

impl PodConfig {
    /// service account mounted into the pod, none when running outside a cluster
    pub fn load() -> Option<Self> {
        Self::load_from(BASE_DIR)
    }

    fn load_from<P: AsRef<Path>>(dir: P) -> Option<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            trace!("no service account directory at {}", dir.display());
            return None;
        }

        let namespace = read_to_string(dir.join("namespace")).ok()?;
        let token = read_to_string(dir.join("token")).ok()?;

        Some(Self {
            namespace: namespace.trim().to_owned(),
            token: token.trim().to_owned(),
        })
    }

    pub fn api_path(&self) -> &'static str {
        API_SERVER
    }

    /// path to the cluster CA
    pub fn ca_path(&self) -> String {
        format!("{}/ca.crt", BASE_DIR)
    }
}

/// kubeconfig with the current context resolved
#[derive(Debug)]
pub struct KubeContext {
    pub namespace: String,
    pub api_path: String,
    pub config: KubeConfig,
}

impl KubeContext {
    fn from_config(config: KubeConfig) -> Result<Self, ConfigError> {
        let current = config.current()?;
        let namespace = current.namespace.to_owned();
        let api_path = current.cluster.server.clone();

        Ok(Self {
            namespace,
            api_path,
            config,
        })
    }
}

#[derive(Debug)]
pub enum K8Config {
    Pod(PodConfig),
    KubeConfig(KubeContext),
}

impl Default for K8Config {
    fn default() -> Self {
        Self::Pod(PodConfig::default())
    }
}

impl K8Config {
    /// in-cluster service account first, then `KUBECONFIG` or `~/.kube/config`
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(pod_config) = PodConfig::load() {
            debug!(namespace = %pod_config.namespace, "using in-cluster service account");
            return Ok(Self::Pod(pod_config));
        }

        debug!("no service account found, loading kubeconfig");
        let config = KubeConfig::from_env_or_home()?;
        Ok(Self::KubeConfig(KubeContext::from_config(config)?))
    }

    /// explicit kubeconfig file
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        debug!(path = %path.display(), "loading kubeconfig");
        let config = KubeConfig::from_file(path)?;
        Ok(Self::KubeConfig(KubeContext::from_config(config)?))
    }

    pub fn api_path(&self) -> &str {
        match self {
            Self::Pod(pod) => pod.api_path(),
            Self::KubeConfig(config) => &config.api_path,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Pod(pod) => &pod.namespace,
            Self::KubeConfig(config) => &config.namespace,
        }
    }
}

#[cfg(test)]
mod test {

    use super::{K8Config, PodConfig};

    #[test]
    fn test_load_explicit_kubeconfig() {
        let config = K8Config::load_from("data/k8config.yaml").expect("load");
        assert_eq!(config.api_path(), "https://127.0.0.1:16443");
        assert_eq!(config.namespace(), "default");
        assert!(matches!(config, K8Config::KubeConfig(_)));
    }

    #[test]
    fn test_missing_service_account() {
        assert!(PodConfig::load_from("data/no-service-account").is_none());
    }

    #[test]
    fn test_pod_api_path() {
        let pod = PodConfig {
            namespace: "hub".to_owned(),
            token: "abc".to_owned(),
        };
        assert_eq!(pod.api_path(), "https://kubernetes.default.svc");
        assert!(pod.ca_path().ends_with("serviceaccount/ca.crt"));
        assert_eq!(K8Config::Pod(pod).namespace(), "hub");
    }
}
