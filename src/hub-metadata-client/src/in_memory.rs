// in-memory implementation of the metadata client
// behaves like the api server for the calls the hub makes, used for testing
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;
use tracing::trace;

use hub_types::options::DeleteOptions;
use hub_types::{
    ApiResource, DeleteStatus, InputK8Obj, K8List, K8Meta, K8Obj, MetaStatus, ObjectMeta, Spec,
};

use crate::ListArg;
use crate::MetadataClient;
use crate::NameSpace;
use crate::PatchMergeType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    resource: &'static ApiResource,
    ns: String,
    name: String,
}

impl ItemKey {
    fn new<S>(metadata: &dyn K8Meta) -> Self
    where
        S: Spec,
    {
        ItemKey {
            resource: S::resource(),
            ns: metadata.namespace().to_owned(),
            name: metadata.name().to_owned(),
        }
    }
}

type ItemMap = HashMap<ItemKey, Value>;

/// mutating request seen by the in-memory client, kept in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create {
        kind: &'static str,
        name: String,
    },
    Delete {
        kind: &'static str,
        name: String,
        options: Option<DeleteOptions>,
    },
    Patch {
        kind: &'static str,
        name: String,
    },
}

impl RecordedCall {
    pub fn create(kind: &'static str, name: &str) -> Self {
        Self::Create {
            kind,
            name: name.to_owned(),
        }
    }

    pub fn delete(kind: &'static str, name: &str, options: Option<DeleteOptions>) -> Self {
        Self::Delete {
            kind,
            name: name.to_owned(),
            options,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryClient {
    store: Arc<RwLock<ItemMap>>,
    logs: RwLock<HashMap<(String, String), String>>,
    create_failures: RwLock<HashMap<&'static str, MetaStatus>>,
    calls: RwLock<Vec<RecordedCall>>,
    version: AtomicU64,
}

fn poisoned<T>(_err: T) -> anyhow::Error {
    anyhow!("lock poison error")
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// insert or replace an object as-is, status included.
    /// stands in for controllers such as the kubelet reporting pod state
    pub fn upsert_item<S>(&self, mut value: K8Obj<S>) -> Result<()>
    where
        S: Spec,
    {
        value.metadata.resource_version = self.next_version().to_string();
        let item_key = ItemKey::new::<S>(&value.metadata);
        let item_value = serde_json::to_value(&value)?;
        self.store.write().map_err(poisoned)?.insert(item_key, item_value);
        Ok(())
    }

    /// set log returned for pod
    pub fn set_log<T: Into<String>>(&self, namespace: &str, pod_name: &str, log: T) -> Result<()> {
        self.logs
            .write()
            .map_err(poisoned)?
            .insert((namespace.to_owned(), pod_name.to_owned()), log.into());
        Ok(())
    }

    /// make every following create of this kind fail with given status
    pub fn fail_create<S>(&self, status: MetaStatus) -> Result<()>
    where
        S: Spec,
    {
        self.create_failures
            .write()
            .map_err(poisoned)?
            .insert(S::label(), status);
        Ok(())
    }

    pub fn clear_failures(&self) -> Result<()> {
        self.create_failures.write().map_err(poisoned)?.clear();
        Ok(())
    }

    /// creates, deletes and patches received so far, failed ones included
    pub fn calls(&self) -> Result<Vec<RecordedCall>> {
        Ok(self.calls.read().map_err(poisoned)?.clone())
    }

    pub fn clear_calls(&self) -> Result<()> {
        self.calls.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        trace!(?call, "recording");
        self.calls.write().map_err(poisoned)?.push(call);
        Ok(())
    }
}

/// `app=foo,tier=lab` style equality selector
fn matches_selector(metadata: &ObjectMeta, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            let (key, value) = match term.split_once("==").or_else(|| term.split_once('=')) {
                Some(pair) => pair,
                None => return metadata.labels.contains_key(term),
            };
            metadata.labels.get(key.trim()).map(String::as_str) == Some(value.trim())
        })
}

/// rfc 7386 merge
fn merge_patch(target: &mut Value, patch: &Value) {
    if let Value::Object(patch_map) = patch {
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Value::Object(target_map) = target {
            for (key, value) in patch_map {
                if value.is_null() {
                    target_map.remove(key);
                } else {
                    merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
    } else {
        *target = patch.clone();
    }
}

#[async_trait]
impl MetadataClient for InMemoryClient {
    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<Option<K8Obj<S>>>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        let store = self.store.read().map_err(poisoned)?;
        let item_key = ItemKey::new::<S>(metadata);
        match store.get(&item_key) {
            Some(item_value) => Ok(Some(serde_json::from_value(item_value.clone())?)),
            None => Ok(None),
        }
    }

    async fn retrieve_items_with_option<S, N>(
        &self,
        namespace: N,
        option: Option<ListArg>,
    ) -> Result<K8List<S>>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        let namespace: NameSpace = namespace.into();
        let selector = option.and_then(|arg| arg.label_selector);
        let store = self.store.read().map_err(poisoned)?;

        let mut items = vec![];
        for (key, value) in store.iter() {
            if key.resource != S::resource() {
                continue;
            }
            if !namespace.is_all() && key.ns != namespace.named() {
                continue;
            }
            let item: K8Obj<S> = serde_json::from_value(value.clone())?;
            if let Some(selector) = &selector {
                if !matches_selector(&item.metadata, selector) {
                    continue;
                }
            }
            items.push(item);
        }
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        trace!("{}: {} items in memory", S::label(), items.len());

        let mut list = K8List::new();
        list.items = items;
        Ok(list)
    }

    async fn delete_item_with_option<S, M>(
        &self,
        metadata: &M,
        option: Option<DeleteOptions>,
    ) -> Result<DeleteStatus<S>>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        self.record(RecordedCall::delete(S::label(), metadata.name(), option.clone()))?;

        let mut store = self.store.write().map_err(poisoned)?;
        let item_key = ItemKey::new::<S>(metadata);
        let item_value = store
            .remove(&item_key)
            .ok_or_else(|| MetaStatus::not_found(S::label(), metadata.name()))?;
        debug!("{}: removed '{}' from memory", S::label(), metadata.name());

        let foreground = option.as_ref().map_or(false, DeleteOptions::is_foreground);
        if foreground {
            let mut item: K8Obj<S> = serde_json::from_value(item_value)?;
            item.metadata.deletion_timestamp = Some("now".to_owned());
            Ok(DeleteStatus::ForegroundDelete(item))
        } else {
            Ok(DeleteStatus::Deleted(MetaStatus::success()))
        }
    }

    async fn create_item<S>(&self, value: InputK8Obj<S>) -> Result<K8Obj<S>>
    where
        S: Spec,
    {
        self.record(RecordedCall::create(S::label(), &value.metadata.name))?;

        if let Some(status) = self
            .create_failures
            .read()
            .map_err(poisoned)?
            .get(S::label())
        {
            return Err(status.clone().into());
        }

        let item_key = ItemKey::new::<S>(&value.metadata);
        let mut store = self.store.write().map_err(poisoned)?;
        if store.contains_key(&item_key) {
            return Err(MetaStatus::conflict(S::label(), &value.metadata.name).into());
        }

        let version = self.next_version();
        let k8_obj = K8Obj {
            api_version: value.api_version,
            kind: value.kind,
            metadata: ObjectMeta {
                name: value.metadata.name,
                namespace: value.metadata.namespace,
                labels: value.metadata.labels,
                uid: format!("uid-{}", version),
                resource_version: version.to_string(),
                generation: Some(1),
                ..Default::default()
            },
            spec: value.spec,
            status: S::Status::default(),
        };

        store.insert(item_key, serde_json::to_value(&k8_obj)?);
        Ok(k8_obj)
    }

    async fn patch<S, M>(
        &self,
        metadata: &M,
        patch: &Value,
        merge_type: PatchMergeType,
    ) -> Result<K8Obj<S>>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync,
    {
        if let PatchMergeType::Json = merge_type {
            return Err(anyhow!("json patch is not supported in memory"));
        }
        self.record(RecordedCall::Patch {
            kind: S::label(),
            name: metadata.name().to_owned(),
        })?;

        let mut store = self.store.write().map_err(poisoned)?;
        let item_key = ItemKey::new::<S>(metadata);
        let item_value = store
            .get_mut(&item_key)
            .ok_or_else(|| MetaStatus::not_found(S::label(), metadata.name()))?;

        merge_patch(item_value, patch);
        let mut k8_obj: K8Obj<S> = serde_json::from_value(item_value.clone())?;
        k8_obj.metadata.resource_version = self.next_version().to_string();
        k8_obj.metadata.generation = k8_obj.metadata.generation.map(|generation| generation + 1);
        *item_value = serde_json::to_value(&k8_obj)?;

        debug!(%metadata, "patched in memory");
        Ok(k8_obj)
    }

    async fn retrieve_log(
        &self,
        namespace: &str,
        pod_name: &str,
        _container_name: &str,
    ) -> Result<String> {
        self.logs
            .read()
            .map_err(poisoned)?
            .get(&(namespace.to_owned(), pod_name.to_owned()))
            .cloned()
            .ok_or_else(|| MetaStatus::not_found("Pod", pod_name).into())
    }
}
