use tracing::debug;
use tracing::error;

use hub_metadata_client::{ListArg, MetadataClient, SharedClient};
use hub_types::app::deployment::DeploymentSpec;
use hub_types::core::pod::PodSpec;
use hub_types::K8Obj;

use crate::LifecycleStatus;

/// Derives one lifecycle status from the workload and its pods
pub struct StatusResolver<C> {
    client: SharedClient<C>,
}

impl<C> Clone for StatusResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<C> StatusResolver<C>
where
    C: MetadataClient,
{
    pub fn new(client: SharedClient<C>) -> Self {
        Self { client }
    }

    /// first matching rule wins:
    /// desired replicas 0, no pods, query failure, then the state of the workspace container in the first pod
    pub async fn resolve(&self, workload: &K8Obj<DeploymentSpec>) -> LifecycleStatus {
        let name = &workload.metadata.name;
        if workload.spec.desired_replicas() == 0 {
            debug!(%name, "scaled to zero");
            return LifecycleStatus::Stopped;
        }

        let selector = match workload.spec.selector.as_query() {
            query if query.is_empty() => format!("app={}", name),
            query => query,
        };

        match self
            .client
            .retrieve_items_with_option::<PodSpec, _>(
                workload.metadata.namespace.as_str(),
                Some(ListArg::with_labels(selector)),
            )
            .await
        {
            Ok(pods) => Self::from_pods(
                &pods.items,
                workload
                    .spec
                    .primary_container()
                    .map(|container| container.name.as_str()),
            ),
            Err(err) => {
                error!(%name, "unable to query pods: {:#}", err);
                LifecycleStatus::Undefined
            }
        }
    }

    /// only the first pod is consulted. the status of `container_name` is used when the pod
    /// reports it, sidecars are ignored; otherwise the first reported container counts
    pub fn from_pods(pods: &[K8Obj<PodSpec>], container_name: Option<&str>) -> LifecycleStatus {
        let pod = match pods.first() {
            Some(pod) => pod,
            None => return LifecycleStatus::Stopped,
        };

        let statuses = &pod.status.container_statuses;
        let named = container_name
            .and_then(|name| statuses.iter().find(|status| status.name == name));
        let container = match named.or_else(|| statuses.first()) {
            Some(container) => container,
            // accepted but no container reported yet
            None => return LifecycleStatus::Provisioning,
        };

        match &container.state {
            Some(state) if state.waiting.is_some() => LifecycleStatus::Waiting,
            Some(state) if state.running.is_some() => LifecycleStatus::Running,
            Some(state) if state.terminated.is_some() => LifecycleStatus::Terminated,
            _ => {
                debug!(pod = %pod.metadata.name, "unrecognized container state");
                LifecycleStatus::Undefined
            }
        }
    }
}

#[cfg(test)]
mod test {

    use std::sync::Arc;

    use anyhow::Result;
    use fluvio_future::test_async;

    use hub_metadata_client::InMemoryClient;
    use hub_types::app::deployment::DeploymentSpec;
    use hub_types::core::pod::{
        ContainerSpec, ContainerState, ContainerStateRunning, ContainerStateTerminated,
        ContainerStateWaiting, ContainerStatus, PodSpec, PodStatus,
    };
    use hub_types::{K8Obj, LabelSelector, TemplateSpec};

    use super::StatusResolver;
    use crate::LifecycleStatus;

    const NS: &str = "default";
    const JDOE: Option<&str> = Some("workspace-jdoe");

    fn workload(replicas: i32) -> K8Obj<DeploymentSpec> {
        let mut deployment = K8Obj::new(
            "workspace-jdoe",
            DeploymentSpec {
                replicas: Some(replicas),
                selector: LabelSelector::new_labels(vec![("app", "workspace-jdoe")]),
                template: TemplateSpec {
                    metadata: None,
                    spec: PodSpec {
                        containers: vec![ContainerSpec {
                            name: "workspace-jdoe".to_owned(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    },
                },
            },
        );
        deployment.metadata.namespace = NS.to_owned();
        deployment
    }

    fn pod(state: Option<ContainerState>) -> K8Obj<PodSpec> {
        let mut pod = K8Obj::new("workspace-jdoe-7f9c", PodSpec::default()).set_status(PodStatus {
            container_statuses: vec![ContainerStatus {
                name: "workspace-jdoe".to_owned(),
                state,
                ..Default::default()
            }],
            ..Default::default()
        });
        pod.metadata.namespace = NS.to_owned();
        pod.metadata
            .labels
            .insert("app".to_owned(), "workspace-jdoe".to_owned());
        pod
    }

    fn running() -> Option<ContainerState> {
        Some(ContainerState {
            running: Some(ContainerStateRunning::default()),
            ..Default::default()
        })
    }

    fn waiting() -> Option<ContainerState> {
        Some(ContainerState {
            waiting: Some(ContainerStateWaiting::default()),
            ..Default::default()
        })
    }

    #[test]
    fn test_container_states() {
        let terminated = Some(ContainerState {
            terminated: Some(ContainerStateTerminated::default()),
            ..Default::default()
        });

        type Resolver = StatusResolver<InMemoryClient>;
        assert_eq!(Resolver::from_pods(&[], JDOE), LifecycleStatus::Stopped);
        assert_eq!(Resolver::from_pods(&[pod(waiting())], JDOE), LifecycleStatus::Waiting);
        assert_eq!(Resolver::from_pods(&[pod(running())], JDOE), LifecycleStatus::Running);
        assert_eq!(Resolver::from_pods(&[pod(terminated)], JDOE), LifecycleStatus::Terminated);
        assert_eq!(
            Resolver::from_pods(&[pod(Some(ContainerState::default()))], JDOE),
            LifecycleStatus::Undefined
        );
        assert_eq!(Resolver::from_pods(&[pod(None)], JDOE), LifecycleStatus::Undefined);

        let mut unscheduled = pod(None);
        unscheduled.status.container_statuses.clear();
        assert_eq!(
            Resolver::from_pods(&[unscheduled], JDOE),
            LifecycleStatus::Provisioning
        );
    }

    #[test]
    fn test_sidecar_status_ignored() {
        let mut with_sidecar = pod(waiting());
        with_sidecar.status.container_statuses.insert(
            0,
            ContainerStatus {
                name: "istio-proxy".to_owned(),
                state: running(),
                ..Default::default()
            },
        );

        type Resolver = StatusResolver<InMemoryClient>;
        assert_eq!(
            Resolver::from_pods(&[with_sidecar.clone()], JDOE),
            LifecycleStatus::Waiting
        );
        // no container name known, the first status decides
        assert_eq!(
            Resolver::from_pods(&[with_sidecar], None),
            LifecycleStatus::Running
        );
    }

    #[test_async]
    async fn test_sidecar_ignored_when_resolving() -> Result<()> {
        let client = Arc::new(InMemoryClient::new());
        let mut with_sidecar = pod(waiting());
        with_sidecar.status.container_statuses.insert(
            0,
            ContainerStatus {
                name: "istio-proxy".to_owned(),
                state: running(),
                ..Default::default()
            },
        );
        client.upsert_item(with_sidecar)?;

        let resolver = StatusResolver::new(client);
        assert_eq!(resolver.resolve(&workload(1)).await, LifecycleStatus::Waiting);
        Ok(())
    }

    #[test_async]
    async fn test_zero_replicas_wins_over_running_pod() -> Result<()> {
        let client = Arc::new(InMemoryClient::new());
        client.upsert_item(pod(running()))?;
        let resolver = StatusResolver::new(client);

        assert_eq!(resolver.resolve(&workload(0)).await, LifecycleStatus::Stopped);
        assert_eq!(resolver.resolve(&workload(1)).await, LifecycleStatus::Running);
        Ok(())
    }

    #[test_async]
    async fn test_no_pods_is_stopped() -> Result<()> {
        let resolver = StatusResolver::new(Arc::new(InMemoryClient::new()));
        assert_eq!(resolver.resolve(&workload(1)).await, LifecycleStatus::Stopped);
        Ok(())
    }

    #[test_async]
    async fn test_other_workload_pods_ignored() -> Result<()> {
        let client = Arc::new(InMemoryClient::new());
        let mut other = pod(running());
        other.metadata.name = "workspace-other-1a2b".to_owned();
        other
            .metadata
            .labels
            .insert("app".to_owned(), "workspace-other".to_owned());
        client.upsert_item(other)?;

        let resolver = StatusResolver::new(client);
        assert_eq!(resolver.resolve(&workload(1)).await, LifecycleStatus::Stopped);
        Ok(())
    }
}
