use serde::Deserialize;
use serde::Serialize;

use crate::core::service::LoadBalancerStatus;

crate::spec_resource!(
    IngressSpec,
    IngressStatus,
    crate::ApiResource::grouped("networking.k8s.io", "Ingress", "ingresses")
);

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,
    pub rules: Vec<IngressRule>,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub http: Option<HttpIngressRuleValue>,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpIngressRuleValue {
    pub paths: Vec<HttpIngressPath>,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpIngressPath {
    pub path: Option<String>,
    pub path_type: PathType,
    pub backend: IngressBackend,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Clone)]
pub enum PathType {
    Exact,
    Prefix,
    ImplementationSpecific,
}

impl Default for PathType {
    fn default() -> Self {
        Self::Prefix
    }
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressBackend {
    pub service: Option<IngressServiceBackend>,
}

impl IngressBackend {
    pub fn service<N: Into<String>>(name: N, port: u16) -> Self {
        Self {
            service: Some(IngressServiceBackend {
                name: name.into(),
                port: ServiceBackendPort {
                    number: Some(port),
                    name: None,
                },
            }),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressServiceBackend {
    pub name: String,
    pub port: ServiceBackendPort,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceBackendPort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct IngressStatus {
    pub load_balancer: LoadBalancerStatus,
}

#[cfg(test)]
mod test {

    use crate::Spec;

    use super::{HttpIngressPath, HttpIngressRuleValue, IngressBackend, IngressRule, IngressSpec};

    #[test]
    fn test_ingress_api_version() {
        assert_eq!(IngressSpec::api_version(), "networking.k8s.io/v1");
        assert_eq!(IngressSpec::kind(), "Ingress");
    }

    #[test]
    fn test_encode_prefix_rule() {
        let spec = IngressSpec {
            rules: vec![IngressRule {
                host: None,
                http: Some(HttpIngressRuleValue {
                    paths: vec![HttpIngressPath {
                        path: Some("/workspace-jdoe".to_owned()),
                        backend: IngressBackend::service("workspace-jdoe-service", 8888),
                        ..Default::default()
                    }],
                }),
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(&spec).expect("json");
        let path = &value["rules"][0]["http"]["paths"][0];
        assert_eq!(path["pathType"], "Prefix");
        assert_eq!(path["backend"]["service"]["port"]["number"], 8888);
        assert!(value["rules"][0].get("host").is_none());
    }
}
