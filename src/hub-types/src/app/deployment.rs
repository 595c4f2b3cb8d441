use serde::Deserialize;
use serde::Serialize;

use crate::core::pod::{ContainerSpec, PodSpec};
use crate::{LabelSelector, TemplateSpec};

crate::spec_resource!(
    DeploymentSpec,
    DeploymentStatus,
    crate::ApiResource::grouped("apps", "Deployment", "deployments")
);

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    pub replicas: Option<i32>,
    pub selector: LabelSelector,
    pub template: TemplateSpec<PodSpec>,
}

impl DeploymentSpec {
    /// replicas the controller converges to, api default is 1
    pub fn desired_replicas(&self) -> i32 {
        self.replicas.unwrap_or(1)
    }

    /// first container of the pod template
    pub fn primary_container(&self) -> Option<&ContainerSpec> {
        self.template.spec.containers.first()
    }
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub available_replicas: Option<i32>,
    pub observed_generation: Option<i64>,
    pub ready_replicas: Option<i32>,
    pub replicas: Option<i32>,
    pub unavailable_replicas: Option<i32>,
    pub updated_replicas: Option<i32>,
}

#[cfg(test)]
mod test {

    use crate::K8Obj;

    use super::DeploymentSpec;

    #[test]
    fn test_decode_scaled_down_deployment() {
        let data = r#"
        {
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "workspace-jdoe", "namespace": "default" },
            "spec": {
                "replicas": 0,
                "selector": { "matchLabels": { "app": "workspace-jdoe" } },
                "template": {
                    "metadata": { "labels": { "app": "workspace-jdoe" } },
                    "spec": {
                        "containers": [
                            {
                                "name": "workspace-jdoe",
                                "resources": { "limits": { "cpu": "12", "memory": "24Gi" } }
                            }
                        ]
                    }
                }
            },
            "status": { "observedGeneration": 2 }
        }"#;

        let deployment: K8Obj<DeploymentSpec> = serde_json::from_str(data).expect("deployment");
        assert_eq!(deployment.spec.desired_replicas(), 0);
        assert_eq!(deployment.status.ready_replicas, None);
        let limits = deployment
            .spec
            .primary_container()
            .and_then(|container| container.resources.as_ref())
            .expect("resources");
        assert_eq!(limits.limit("memory"), Some("24Gi"));
        assert_eq!(limits.limit("nvidia.com/gpu"), None);
    }

    #[test]
    fn test_replicas_default_to_one() {
        assert_eq!(DeploymentSpec::default().desired_replicas(), 1);
    }
}
