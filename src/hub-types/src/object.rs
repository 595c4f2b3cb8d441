use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::{InputObjectMeta, MetaStatus, ObjectMeta, Spec};

/// object as returned by the api server
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: DeserializeOwned"))]
pub struct K8Obj<S>
where
    S: Spec,
{
    #[serde(default = "S::api_version")]
    pub api_version: String,
    #[serde(default = "S::kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: S,
    #[serde(default)]
    pub status: S::Status,
}

impl<S> K8Obj<S>
where
    S: Spec,
{
    pub fn new<N: Into<String>>(name: N, spec: S) -> Self {
        Self {
            api_version: S::api_version(),
            kind: S::kind(),
            metadata: ObjectMeta {
                name: name.into(),
                ..Default::default()
            },
            spec,
            status: S::Status::default(),
        }
    }

    pub fn set_status(mut self, status: S::Status) -> Self {
        self.status = status;
        self
    }
}

/// create request body, the server fills in status and bookkeeping metadata
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InputK8Obj<S>
where
    S: Spec,
{
    pub api_version: String,
    pub kind: String,
    pub metadata: InputObjectMeta,
    pub spec: S,
}

impl<S> InputK8Obj<S>
where
    S: Spec,
{
    pub fn new(spec: S, metadata: InputObjectMeta) -> Self {
        Self {
            api_version: S::api_version(),
            kind: S::kind(),
            metadata,
            spec,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: DeserializeOwned"))]
pub struct K8List<S>
where
    S: Spec,
{
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub items: Vec<K8Obj<S>>,
}

impl<S> K8List<S>
where
    S: Spec,
{
    pub fn new() -> Self {
        Self {
            api_version: S::api_version(),
            kind: format!("{}List", S::label()),
            items: vec![],
        }
    }
}

impl<S> Default for K8List<S>
where
    S: Spec,
{
    fn default() -> Self {
        Self::new()
    }
}

/// outcome of a delete: gone right away, or still held by finalizers
#[derive(Debug, Clone)]
pub enum DeleteStatus<S>
where
    S: Spec,
{
    Deleted(MetaStatus),
    ForegroundDelete(K8Obj<S>),
}
