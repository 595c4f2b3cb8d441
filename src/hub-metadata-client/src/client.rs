use std::fmt::Display;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use serde_json::Value;
use tracing::debug;

use hub_types::options::DeleteOptions;
use hub_types::{ApiResource, DeleteStatus, InputK8Obj, K8List, K8Meta, K8Obj, MetaStatus, Spec};

#[derive(Clone, Debug)]
pub enum NameSpace {
    All,
    Named(String),
}

impl NameSpace {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn named(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }
}

impl From<String> for NameSpace {
    fn from(namespace: String) -> Self {
        NameSpace::Named(namespace)
    }
}

impl From<&str> for NameSpace {
    fn from(namespace: &str) -> Self {
        NameSpace::Named(namespace.to_owned())
    }
}

#[derive(Default, Clone, Debug)]
pub struct ListArg {
    pub field_selector: Option<String>,
    pub label_selector: Option<String>,
}

impl ListArg {
    pub fn with_labels<T: Into<String>>(label_selector: T) -> Self {
        Self {
            label_selector: Some(label_selector.into()),
            ..Default::default()
        }
    }
}

pub enum PatchMergeType {
    Json,
    JsonMerge,
    StrategicMerge, // for aggegration API
}

impl PatchMergeType {
    /// built-in kinds understand strategic merge, anything else gets a plain merge patch
    pub fn for_spec(resource: &ApiResource) -> Self {
        if resource.is_core() || resource.group == "apps" {
            PatchMergeType::StrategicMerge
        } else {
            PatchMergeType::JsonMerge
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PatchMergeType::Json => "application/json-patch+json",
            PatchMergeType::JsonMerge => "application/merge-patch+json",
            PatchMergeType::StrategicMerge => "application/strategic-merge-patch+json",
        }
    }
}

/// api server status carried by the error, if the failure came from the api server
pub fn api_status(err: &anyhow::Error) -> Option<&MetaStatus> {
    err.downcast_ref::<MetaStatus>()
}

pub fn is_not_found(err: &anyhow::Error) -> bool {
    api_status(err)
        .map(|status| status.is_not_found())
        .unwrap_or(false)
}

#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// retrieval a single item, none if it doesn't exist
    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<Option<K8Obj<S>>>
    where
        S: Spec,
        M: K8Meta + Send + Sync;

    /// retrieve all items a single chunk
    /// this may cause client to hang if there are too many items
    async fn retrieve_items<S, N>(&self, namespace: N) -> Result<K8List<S>>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        self.retrieve_items_with_option(namespace, None).await
    }

    async fn retrieve_items_with_option<S, N>(
        &self,
        namespace: N,
        option: Option<ListArg>,
    ) -> Result<K8List<S>>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync;

    async fn delete_item_with_option<S, M>(
        &self,
        metadata: &M,
        option: Option<DeleteOptions>,
    ) -> Result<DeleteStatus<S>>
    where
        S: Spec,
        M: K8Meta + Send + Sync;

    async fn delete_item<S, M>(&self, metadata: &M) -> Result<DeleteStatus<S>>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        self.delete_item_with_option::<S, M>(metadata, None).await
    }

    /// create new object
    async fn create_item<S>(&self, value: InputK8Obj<S>) -> Result<K8Obj<S>>
    where
        S: Spec;

    /// patch existing object
    async fn patch<S, M>(
        &self,
        metadata: &M,
        patch: &Value,
        merge_type: PatchMergeType,
    ) -> Result<K8Obj<S>>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync;

    /// patch existing with spec
    async fn patch_spec<S, M>(&self, metadata: &M, patch: &Value) -> Result<K8Obj<S>>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync,
    {
        let spec_patch = json!({ "spec": patch });
        let merge_type = PatchMergeType::for_spec(S::resource());
        self.patch(metadata, &spec_patch, merge_type).await
    }

    /// full log of a container, not followed
    async fn retrieve_log(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
    ) -> Result<String>;

    /// Check if the object exists, return true or false.
    async fn exists<S, M>(&self, metadata: &M) -> Result<bool>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync,
    {
        debug!("check if '{}' exists", metadata);
        Ok(self.retrieve_item::<S, M>(metadata).await?.is_some())
    }
}

#[cfg(test)]
mod test {

    use anyhow::anyhow;

    use hub_types::app::deployment::DeploymentSpec;
    use hub_types::networking::ingress::IngressSpec;
    use hub_types::{MetaStatus, Spec};

    use super::{is_not_found, PatchMergeType};

    #[test]
    fn test_merge_type_for_spec() {
        assert_eq!(
            PatchMergeType::for_spec(DeploymentSpec::resource()).content_type(),
            "application/strategic-merge-patch+json"
        );
        assert_eq!(
            PatchMergeType::for_spec(IngressSpec::resource()).content_type(),
            "application/merge-patch+json"
        );
    }

    #[test]
    fn test_not_found_classification() {
        let err: anyhow::Error = MetaStatus::not_found("Deployment", "workspace-jdoe").into();
        assert!(is_not_found(&err));
        assert!(!is_not_found(&anyhow!("connection refused")));
    }
}
