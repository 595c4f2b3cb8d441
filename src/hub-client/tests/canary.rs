#[cfg(feature = "k8")]
mod canary_test {

    use tracing::debug;

    use hub_client::metadata::{MetadataClient, NameSpace};
    use hub_client::K8Client;
    use hub_types::app::deployment::DeploymentSpec;
    use hub_types::core::pod::PodSpec;
    use hub_types::core::service::ServiceSpec;
    use hub_types::ItemMeta;

    // get services to find kubernetes api
    #[tokio::test]
    async fn test_client_get_services() -> anyhow::Result<()> {
        let client = K8Client::try_default().expect("cluster could not be configured");
        let services = client.retrieve_items::<ServiceSpec, _>("default").await?;
        debug!("service: {} has been retrieved", services.items.len());

        let kubernetes_service = services
            .items
            .iter()
            .find(|i| i.metadata.name == "kubernetes");
        assert!(kubernetes_service.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_deployment_is_none() -> anyhow::Result<()> {
        let client = K8Client::try_default().expect("cluster could not be configured");
        let item = client
            .retrieve_item::<DeploymentSpec, _>(&ItemMeta::new("workspace-does-not-exist", "default"))
            .await?;
        assert!(item.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_pods_all_namespaces() -> anyhow::Result<()> {
        let client = K8Client::try_default().expect("cluster could not be configured");
        let pods = client.retrieve_items::<PodSpec, _>(NameSpace::All).await?;
        assert!(pods.items.iter().any(|pod| pod.metadata.namespace == "kube-system"));
        Ok(())
    }
}
