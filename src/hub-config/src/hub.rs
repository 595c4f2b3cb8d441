use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::ConfigError;

pub const HUB_CONFIG: &str = "HUB_CONFIG";
pub const HUB_NAMESPACE: &str = "HUB_NAMESPACE";

/// Settings for the workspace orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubConfig {
    /// namespace all workspaces live in
    pub namespace: String,
    /// kubeconfig to use instead of the default lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
    pub workspace: WorkspaceTemplate,
    pub route: RouteConfig,
    /// marker preceding the access token in the workspace log
    pub token_marker: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_owned(),
            kubeconfig: None,
            workspace: WorkspaceTemplate::default(),
            route: RouteConfig::default(),
            token_marker: "8888/lab?token=".to_owned(),
        }
    }
}

impl HubConfig {
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// `HUB_CONFIG` file if set, defaults otherwise; `HUB_NAMESPACE` overrides the namespace
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(HUB_CONFIG) {
            Ok(path) => {
                debug!(%path, "loading hub config");
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(namespace) = std::env::var(HUB_NAMESPACE) {
            debug!(%namespace, "namespace override");
            config.namespace = namespace;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "namespace",
                value: self.namespace.clone(),
            });
        }
        if self.workspace.container_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "workspace.containerPort",
                value: "0".to_owned(),
            });
        }
        if self.token_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tokenMarker",
                value: String::new(),
            });
        }
        Ok(())
    }
}

/// How every workspace workload is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceTemplate {
    pub image: String,
    pub container_port: u16,
    pub mount_path: String,
    /// extended resource name for accelerators
    pub accelerator_resource: String,
    /// node label matched against the accelerator type
    pub accelerator_node_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl Default for WorkspaceTemplate {
    fn default() -> Self {
        Self {
            image: "localhost:32000/k40:latest".to_owned(),
            container_port: 8888,
            mount_path: "/home/jovyan/work".to_owned(),
            accelerator_resource: "nvidia.com/gpu".to_owned(),
            accelerator_node_label: "gpu-type".to_owned(),
            storage_class: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_class: Option<String>,
}

#[cfg(test)]
mod test {

    use super::HubConfig;
    use crate::ConfigError;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.namespace, "default");
        assert_eq!(config.workspace.container_port, 8888);
        assert_eq!(config.workspace.image, "localhost:32000/k40:latest");
        assert_eq!(config.token_marker, "8888/lab?token=");
        assert!(config.route.host.is_none());
    }

    #[test]
    fn test_read_partial_file() {
        let config = HubConfig::from_file("data/hub.yaml").expect("read");
        assert_eq!(config.namespace, "lab");
        assert_eq!(config.workspace.image, "registry.local/notebook:1.2");
        assert_eq!(config.workspace.storage_class.as_deref(), Some("microk8s-hostpath"));
        // untouched fields keep their defaults
        assert_eq!(config.workspace.container_port, 8888);
        assert_eq!(config.workspace.accelerator_resource, "nvidia.com/gpu");
        assert_eq!(config.route.ingress_class.as_deref(), Some("public"));
        assert_eq!(config.token_marker, "8888/lab?token=");
    }

    #[test]
    fn test_reject_empty_namespace() {
        let config = HubConfig {
            namespace: " ".to_owned(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "namespace", .. })
        ));
    }

    #[test]
    fn test_yaml_round_keys() {
        let yaml = serde_yaml::to_string(&HubConfig::default()).expect("serialize");
        assert!(yaml.contains("containerPort: 8888"));
        assert!(yaml.contains("tokenMarker:"));
        assert!(!yaml.contains("kubeconfig"));
    }
}
