use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use hub_config::HubConfig;
use hub_metadata_client::{api_status, is_not_found, ListArg, MetadataClient, SharedClient};
use hub_types::app::deployment::DeploymentSpec;
use hub_types::core::persistent_volume_claim::PersistentVolumeClaimSpec;
use hub_types::core::pod::PodSpec;
use hub_types::core::service::ServiceSpec;
use hub_types::networking::ingress::IngressSpec;
use hub_types::options::DeleteOptions;
use hub_types::{ItemMeta, K8Obj, Spec};

use crate::template;
use crate::{
    validate_identity, AcceleratorLimit, AcceleratorType, CredentialSource, LifecycleStatus,
    LogScrapeCredentials, ProvisionStep, ResourceKind, ResourceSet, ResourceSpec, StatusResolver,
    WorkspaceDescriptor, WorkspaceError, WorkspacePhase,
};

/// Creates, scales, inspects and tears down workspaces as a unit
pub struct WorkspaceManager<C> {
    client: SharedClient<C>,
    config: HubConfig,
    resolver: StatusResolver<C>,
    credentials: Arc<dyn CredentialSource>,
}

impl<C> WorkspaceManager<C>
where
    C: MetadataClient,
{
    pub fn new(client: SharedClient<C>, config: HubConfig) -> Self {
        let credentials = Arc::new(LogScrapeCredentials::new(config.token_marker.clone()));
        Self {
            resolver: StatusResolver::new(client.clone()),
            client,
            config,
            credentials,
        }
    }

    pub fn with_credentials<T>(mut self, credentials: T) -> Self
    where
        T: CredentialSource + 'static,
    {
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    fn item(&self, name: &str) -> ItemMeta {
        ItemMeta::new(name, self.namespace())
    }

    /// provision all resources in order, resuming a partially created workspace.
    /// a failed step leaves the earlier resources in place
    #[instrument(skip(self, spec))]
    pub async fn create(
        &self,
        identity: &str,
        spec: &ResourceSpec,
    ) -> Result<String, WorkspaceError> {
        validate_identity(identity)?;
        spec.validate()?;

        let missing = match self.inspect(identity).await? {
            WorkspacePhase::Absent => ResourceKind::PROVISION_ORDER.to_vec(),
            WorkspacePhase::Degraded { missing } => {
                info!(?missing, "resuming partially provisioned workspace");
                missing
            }
            phase => {
                debug!(%phase, "workspace exists");
                return Err(WorkspaceError::already_exists(identity));
            }
        };

        let set = ResourceSet::derive(identity);
        for step in ResourceKind::PROVISION_ORDER {
            if !missing.contains(&step) {
                debug!(%step, "already present, skipping");
                continue;
            }
            self.provision(step, &set, spec)
                .await
                .map_err(|err| WorkspaceError::provision(step, identity, err))?;
            info!(%step, name = set.name_of(step), "created");
        }

        Ok(identity.to_owned())
    }

    async fn provision(
        &self,
        step: ProvisionStep,
        set: &ResourceSet,
        spec: &ResourceSpec,
    ) -> anyhow::Result<()> {
        match step {
            ResourceKind::StorageClaim => {
                self.client
                    .create_item(template::storage_claim(set, spec, &self.config))
                    .await?;
            }
            ResourceKind::Workload => {
                self.client
                    .create_item(template::workload(set, spec, &self.config))
                    .await?;
            }
            ResourceKind::Service => {
                self.client
                    .create_item(template::service(set, &self.config))
                    .await?;
            }
            ResourceKind::Route => {
                self.client
                    .create_item(template::route(set, &self.config))
                    .await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn start(&self, identity: &str) -> Result<(), WorkspaceError> {
        self.scale(identity, 1).await
    }

    #[instrument(skip(self))]
    pub async fn stop(&self, identity: &str) -> Result<(), WorkspaceError> {
        self.scale(identity, 0).await
    }

    async fn scale(&self, identity: &str, replicas: i32) -> Result<(), WorkspaceError> {
        let set = ResourceSet::derive(identity);
        let patch = json!({ "replicas": replicas });
        self.client
            .patch_spec::<DeploymentSpec, _>(&self.item(&set.workload), &patch)
            .await?;
        info!(replicas, "workload scaled");
        Ok(())
    }

    /// remove route, service, workload and claim; missing resources are skipped
    #[instrument(skip(self))]
    pub async fn delete(&self, identity: &str) -> Result<(), WorkspaceError> {
        let set = ResourceSet::derive(identity);

        for kind in ResourceKind::PROVISION_ORDER.iter().rev() {
            let item = self.item(set.name_of(*kind));
            let result = match kind {
                ResourceKind::Route => self.remove::<IngressSpec>(&item, None).await,
                ResourceKind::Service => self.remove::<ServiceSpec>(&item, None).await,
                ResourceKind::Workload => {
                    self.remove::<DeploymentSpec>(&item, Some(DeleteOptions::foreground_now()))
                        .await
                }
                ResourceKind::StorageClaim => {
                    self.remove::<PersistentVolumeClaimSpec>(&item, None).await
                }
            };

            match result {
                Ok(()) => info!(%kind, name = %item.name, "deleted"),
                Err(err) if is_not_found(&err) => debug!(%kind, name = %item.name, "already absent"),
                Err(err) => return Err(WorkspaceError::Upstream(err)),
            }
        }

        Ok(())
    }

    async fn remove<S>(&self, item: &ItemMeta, option: Option<DeleteOptions>) -> anyhow::Result<()>
    where
        S: Spec,
    {
        self.client
            .delete_item_with_option::<S, _>(item, option)
            .await
            .map(|_| ())
    }

    /// every workload in the namespace with its limits and current status
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WorkspaceDescriptor>, WorkspaceError> {
        let workloads = self
            .client
            .retrieve_items::<DeploymentSpec, _>(self.namespace())
            .await?;
        debug!(count = workloads.items.len(), "workloads retrieved");

        let mut descriptors = Vec::with_capacity(workloads.items.len());
        for workload in &workloads.items {
            descriptors.push(self.describe(workload).await);
        }
        Ok(descriptors)
    }

    async fn describe(&self, workload: &K8Obj<DeploymentSpec>) -> WorkspaceDescriptor {
        let name = &workload.metadata.name;
        let template = &self.config.workspace;
        let resources = workload
            .spec
            .primary_container()
            .and_then(|container| container.resources.as_ref());
        let limit = |key: &str| resources.and_then(|resources| resources.limit(key));

        let gpu_count: Option<u32> = parse_limit(
            name,
            &template.accelerator_resource,
            limit(&template.accelerator_resource),
        );
        let gpu_kind: Option<AcceleratorType> = workload
            .spec
            .template
            .spec
            .node_selector
            .as_ref()
            .and_then(|selector| selector.get(&template.accelerator_node_label))
            .and_then(|value| value.parse().ok());

        WorkspaceDescriptor {
            name: name.clone(),
            cpu_limit: parse_limit(name, "cpu", limit("cpu")),
            memory_limit: parse_limit(name, "memory", limit("memory")),
            gpu_limit: gpu_count.map(|count| AcceleratorLimit {
                count,
                kind: gpu_kind,
            }),
            status: self.resolver.resolve(workload).await,
        }
    }

    /// phase of the workspace as a whole
    #[instrument(skip(self))]
    pub async fn inspect(&self, identity: &str) -> Result<WorkspacePhase, WorkspaceError> {
        let set = ResourceSet::derive(identity);

        let workload = self
            .client
            .retrieve_item::<DeploymentSpec, _>(&self.item(&set.workload))
            .await?;
        if workload
            .as_ref()
            .map(|workload| workload.metadata.is_being_deleted())
            .unwrap_or(false)
        {
            return Ok(WorkspacePhase::Deleting);
        }

        let mut missing = vec![];
        if !self
            .client
            .exists::<PersistentVolumeClaimSpec, _>(&self.item(&set.storage_claim))
            .await?
        {
            missing.push(ResourceKind::StorageClaim);
        }
        if workload.is_none() {
            missing.push(ResourceKind::Workload);
        }
        if !self
            .client
            .exists::<ServiceSpec, _>(&self.item(&set.service))
            .await?
        {
            missing.push(ResourceKind::Service);
        }
        if !self
            .client
            .exists::<IngressSpec, _>(&self.item(&set.route))
            .await?
        {
            missing.push(ResourceKind::Route);
        }

        let workload = match workload {
            Some(workload) if missing.is_empty() => workload,
            _ if missing.len() == ResourceKind::PROVISION_ORDER.len() => {
                return Ok(WorkspacePhase::Absent)
            }
            _ => return Ok(WorkspacePhase::Degraded { missing }),
        };

        if workload.spec.desired_replicas() == 0 {
            return Ok(WorkspacePhase::Stopped);
        }
        match self.resolver.resolve(&workload).await {
            LifecycleStatus::Running => Ok(WorkspacePhase::Running),
            _ => Ok(WorkspacePhase::Provisioning),
        }
    }

    /// credential scraped from the first pod's log, none while the workspace is not ready
    #[instrument(skip(self))]
    pub async fn connection_token(&self, identity: &str) -> Result<Option<String>, WorkspaceError> {
        let set = ResourceSet::derive(identity);
        let pods = self
            .client
            .retrieve_items_with_option::<PodSpec, _>(
                self.namespace(),
                Some(ListArg::with_labels(set.app_selector())),
            )
            .await?;

        let pod = match pods.items.first() {
            Some(pod) => pod,
            None => {
                debug!("no pod yet");
                return Ok(None);
            }
        };

        let log = match self
            .client
            .retrieve_log(self.namespace(), &pod.metadata.name, &set.identity)
            .await
        {
            Ok(log) => log,
            // pod gone or container not started yet
            Err(err) if is_not_found(&err) || is_bad_request(&err) => {
                debug!(pod = %pod.metadata.name, "log not available: {}", err);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        Ok(self.credentials.extract(&log))
    }
}

fn is_bad_request(err: &anyhow::Error) -> bool {
    api_status(err)
        .map(|status| status.code == Some(400))
        .unwrap_or(false)
}

fn parse_limit<T: FromStr>(workload: &str, key: &str, value: Option<&str>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!(%workload, %key, %value, "limit is not a whole quantity");
            None
        }
    }
}

#[cfg(test)]
mod test {

    use std::sync::Arc;

    use anyhow::Result;
    use fluvio_future::test_async;

    use hub_config::HubConfig;
    use hub_metadata_client::{InMemoryClient, MetadataClient, RecordedCall};
    use hub_types::app::deployment::DeploymentSpec;
    use hub_types::core::service::ServiceSpec;
    use hub_types::options::DeleteOptions;
    use hub_types::{ItemMeta, MetaStatus};

    use super::WorkspaceManager;
    use crate::{
        AcceleratorType, CredentialSource, ResourceKind, ResourceSpec, WorkspaceError,
        WorkspacePhase,
    };

    fn spec() -> ResourceSpec {
        ResourceSpec {
            cpu: 2,
            memory: 4,
            storage: 10,
            accelerator: AcceleratorType::K40,
            accelerator_count: 1,
        }
    }

    fn manager() -> (Arc<InMemoryClient>, WorkspaceManager<InMemoryClient>) {
        let client = Arc::new(InMemoryClient::new());
        let manager = WorkspaceManager::new(client.clone(), HubConfig::default());
        (client, manager)
    }

    #[test_async]
    async fn test_create_rejects_invalid_identity() -> Result<()> {
        let (client, manager) = manager();
        let err = manager
            .create("ws", &spec())
            .await
            .expect_err("too short");
        assert!(matches!(err, WorkspaceError::Validation(_)));
        assert!(client
            .retrieve_items::<DeploymentSpec, _>("default")
            .await?
            .items
            .is_empty());
        Ok(())
    }

    #[test_async]
    async fn test_failed_step_is_named_and_resumable() -> Result<()> {
        let (client, manager) = manager();
        client.fail_create::<ServiceSpec>(MetaStatus::failure(500, "InternalError", "etcd timeout"))?;

        let err = manager
            .create("workspace-jdoe", &spec())
            .await
            .expect_err("service step fails");
        assert!(matches!(
            err,
            WorkspaceError::Provision {
                step: ResourceKind::Service,
                ..
            }
        ));
        assert_eq!(
            manager.inspect("workspace-jdoe").await?,
            WorkspacePhase::Degraded {
                missing: vec![ResourceKind::Service, ResourceKind::Route]
            }
        );

        client.clear_failures()?;
        manager.create("workspace-jdoe", &spec()).await?;
        assert!(client
            .retrieve_item::<ServiceSpec, _>(&ItemMeta::new("workspace-jdoe-service", "default"))
            .await?
            .is_some());
        Ok(())
    }

    #[test_async]
    async fn test_create_follows_provision_order() -> Result<()> {
        let (client, manager) = manager();
        manager.create("workspace-jdoe", &spec()).await?;
        assert_eq!(
            client.calls()?,
            vec![
                RecordedCall::create("PersistentVolumeClaim", "workspace-jdoe-pvc"),
                RecordedCall::create("Deployment", "workspace-jdoe"),
                RecordedCall::create("Service", "workspace-jdoe-service"),
                RecordedCall::create("Ingress", "workspace-jdoe-ingress"),
            ]
        );
        Ok(())
    }

    #[test_async]
    async fn test_resume_creates_only_missing() -> Result<()> {
        let (client, manager) = manager();
        client.fail_create::<ServiceSpec>(MetaStatus::failure(500, "InternalError", "etcd timeout"))?;
        manager
            .create("workspace-jdoe", &spec())
            .await
            .expect_err("service step fails");

        client.clear_failures()?;
        client.clear_calls()?;
        manager.create("workspace-jdoe", &spec()).await?;
        assert_eq!(
            client.calls()?,
            vec![
                RecordedCall::create("Service", "workspace-jdoe-service"),
                RecordedCall::create("Ingress", "workspace-jdoe-ingress"),
            ]
        );
        Ok(())
    }

    #[test_async]
    async fn test_delete_reverse_order_foreground_workload() -> Result<()> {
        let (client, manager) = manager();
        manager.create("workspace-jdoe", &spec()).await?;
        client.clear_calls()?;

        manager.delete("workspace-jdoe").await?;
        assert_eq!(
            client.calls()?,
            vec![
                RecordedCall::delete("Ingress", "workspace-jdoe-ingress", None),
                RecordedCall::delete("Service", "workspace-jdoe-service", None),
                RecordedCall::delete(
                    "Deployment",
                    "workspace-jdoe",
                    Some(DeleteOptions::foreground_now())
                ),
                RecordedCall::delete("PersistentVolumeClaim", "workspace-jdoe-pvc", None),
            ]
        );
        Ok(())
    }

    #[test_async]
    async fn test_create_twice_is_conflict() -> Result<()> {
        let (_client, manager) = manager();
        manager.create("workspace-jdoe", &spec()).await?;
        let err = manager
            .create("workspace-jdoe", &spec())
            .await
            .expect_err("already there");
        assert!(matches!(err, WorkspaceError::Conflict(_)));
        Ok(())
    }

    #[test_async]
    async fn test_scale_missing_workload() -> Result<()> {
        let (_client, manager) = manager();
        let err = manager.start("workspace-ghost").await.expect_err("no workload");
        assert!(matches!(err, WorkspaceError::NotFound(_)));
        Ok(())
    }

    struct Fixed;

    impl CredentialSource for Fixed {
        fn extract(&self, _log: &str) -> Option<String> {
            Some("fixed".to_owned())
        }
    }

    #[test_async]
    async fn test_token_without_pod_is_not_ready() -> Result<()> {
        let (_client, manager) = manager();
        let manager = manager.with_credentials(Fixed);
        assert_eq!(manager.connection_token("workspace-jdoe").await?, None);
        Ok(())
    }
}
