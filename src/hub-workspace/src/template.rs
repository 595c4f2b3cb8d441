// cluster objects making up one workspace
use std::collections::BTreeMap;
use std::collections::HashMap;

use hub_config::HubConfig;
use hub_types::app::deployment::DeploymentSpec;
use hub_types::core::persistent_volume_claim::{
    AccessMode, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use hub_types::core::pod::{
    ContainerPortSpec, ContainerSpec, PersistentVolumeClaimVolumeSource, PodSpec,
    ResourceRequirements, VolumeMount, VolumeSpec,
};
use hub_types::core::service::{ServicePort, ServiceSpec, ServiceType};
use hub_types::networking::ingress::{
    HttpIngressPath, HttpIngressRuleValue, IngressBackend, IngressRule, IngressSpec, PathType,
};
use hub_types::{InputK8Obj, InputObjectMeta, LabelProvider, LabelSelector, TemplateMeta, TemplateSpec};

use crate::{ResourceSet, ResourceSpec};

const APP_LABEL: &str = "app";
const DATA_VOLUME: &str = "workspace-data";

fn labeled_meta(name: &str, set: &ResourceSet, namespace: &str) -> InputObjectMeta {
    InputObjectMeta::named(name, namespace).set_labels(vec![(APP_LABEL, set.identity.as_str())])
}

fn app_labels(set: &ResourceSet) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(APP_LABEL.to_owned(), set.identity.clone());
    labels
}

pub(crate) fn storage_claim(
    set: &ResourceSet,
    spec: &ResourceSpec,
    config: &HubConfig,
) -> InputK8Obj<PersistentVolumeClaimSpec> {
    InputK8Obj::new(
        PersistentVolumeClaimSpec {
            access_modes: vec![AccessMode::ReadWriteOnce],
            resources: VolumeResourceRequirements::storage(spec.storage_quantity()),
            storage_class_name: config.workspace.storage_class.clone(),
            ..Default::default()
        },
        labeled_meta(&set.storage_claim, set, &config.namespace),
    )
}

pub(crate) fn workload(
    set: &ResourceSet,
    spec: &ResourceSpec,
    config: &HubConfig,
) -> InputK8Obj<DeploymentSpec> {
    let template = &config.workspace;

    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_owned(), spec.cpu_quantity());
    limits.insert("memory".to_owned(), spec.memory_quantity());
    // written even when zero so the listing can still report the accelerator type
    limits.insert(
        template.accelerator_resource.clone(),
        spec.accelerator_count.to_string(),
    );

    let mut node_selector = HashMap::new();
    node_selector.insert(
        template.accelerator_node_label.clone(),
        spec.accelerator.node_label().to_owned(),
    );

    let container = ContainerSpec {
        name: set.identity.clone(),
        image: Some(template.image.clone()),
        ports: vec![ContainerPortSpec::new(template.container_port, "http")],
        volume_mounts: vec![VolumeMount {
            mount_path: template.mount_path.clone(),
            name: DATA_VOLUME.to_owned(),
            ..Default::default()
        }],
        resources: Some(ResourceRequirements {
            limits,
            ..Default::default()
        }),
        ..Default::default()
    };

    let pod = PodSpec {
        volumes: vec![VolumeSpec {
            name: DATA_VOLUME.to_owned(),
            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                claim_name: set.storage_claim.clone(),
                read_only: None,
            }),
        }],
        containers: vec![container],
        node_selector: Some(node_selector),
        ..Default::default()
    };

    InputK8Obj::new(
        DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector::new_labels(vec![(APP_LABEL, set.identity.as_str())]),
            template: TemplateSpec {
                metadata: Some(
                    TemplateMeta::default().set_labels(vec![(APP_LABEL, set.identity.as_str())]),
                ),
                spec: pod,
            },
            ..Default::default()
        },
        labeled_meta(&set.workload, set, &config.namespace),
    )
}

pub(crate) fn service(set: &ResourceSet, config: &HubConfig) -> InputK8Obj<ServiceSpec> {
    let port = config.workspace.container_port;
    InputK8Obj::new(
        ServiceSpec {
            service_type: Some(ServiceType::ClusterIp),
            ports: vec![ServicePort {
                name: Some("http".to_owned()),
                port,
                target_port: Some(port),
            }],
            selector: app_labels(set),
        },
        labeled_meta(&set.service, set, &config.namespace),
    )
}

pub(crate) fn route(set: &ResourceSet, config: &HubConfig) -> InputK8Obj<IngressSpec> {
    let path = HttpIngressPath {
        path: Some(format!("/{}", set.identity)),
        path_type: PathType::Prefix,
        backend: IngressBackend::service(set.service.clone(), config.workspace.container_port),
    };

    InputK8Obj::new(
        IngressSpec {
            ingress_class_name: config.route.ingress_class.clone(),
            rules: vec![IngressRule {
                host: config.route.host.clone(),
                http: Some(HttpIngressRuleValue { paths: vec![path] }),
            }],
        },
        labeled_meta(&set.route, set, &config.namespace),
    )
}
