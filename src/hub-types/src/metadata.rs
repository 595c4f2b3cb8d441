use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// name and namespace addressing a single object
pub trait K8Meta {
    fn name(&self) -> &str;

    fn namespace(&self) -> &str;
}

pub trait LabelProvider: Sized {
    fn set_label_map(self, labels: HashMap<String, String>) -> Self;

    fn set_labels<T: ToString>(self, labels: Vec<(T, T)>) -> Self {
        self.set_label_map(
            labels
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }
}

macro_rules! addressable {
    ($meta:ty) => {
        impl K8Meta for $meta {
            fn name(&self) -> &str {
                &self.name
            }

            fn namespace(&self) -> &str {
                &self.namespace
            }
        }

        impl fmt::Display for $meta {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}/{}", self.namespace, self.name)
            }
        }
    };
}

macro_rules! labeled {
    ($meta:ty) => {
        impl LabelProvider for $meta {
            fn set_label_map(mut self, labels: HashMap<String, String>) -> Self {
                self.labels = labels;
                self
            }
        }
    };
}

/// metadata of an object as stored by the api server
#[derive(Deserialize, Serialize, PartialEq, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    pub generation: Option<i64>,
    pub resource_version: String,
    /// set once a delete was accepted and finalizers are still running
    pub deletion_timestamp: Option<String>,
    pub labels: HashMap<String, String>,
}

addressable!(ObjectMeta);
labeled!(ObjectMeta);

impl ObjectMeta {
    pub fn is_being_deleted(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// metadata sent when creating an object
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InputObjectMeta {
    pub name: String,
    pub namespace: String,
    pub labels: HashMap<String, String>,
}

addressable!(InputObjectMeta);
labeled!(InputObjectMeta);

impl InputObjectMeta {
    pub fn named<S: Into<String>>(name: S, namespace: S) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// bare address for retrieving, patching and deleting
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemMeta {
    pub name: String,
    pub namespace: String,
}

addressable!(ItemMeta);

impl ItemMeta {
    pub fn new<N, S>(name: N, namespace: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// labels stamped on pods created from a template
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct TemplateMeta {
    pub labels: HashMap<String, String>,
}

labeled!(TemplateMeta);

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct TemplateSpec<S> {
    pub metadata: Option<TemplateMeta>,
    pub spec: S,
}

/// equality-only selector, `matchExpressions` are never produced by the hub
#[derive(Deserialize, Serialize, Default, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: HashMap<String, String>,
}

impl LabelSelector {
    pub fn new_labels<T: Into<String>>(labels: Vec<(T, T)>) -> Self {
        Self {
            match_labels: labels
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// `labelSelector` query value, keys sorted so the uri is stable
    pub fn as_query(&self) -> String {
        let mut pairs: Vec<String> = self
            .match_labels
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        pairs.sort();
        pairs.join(",")
    }
}

#[cfg(test)]
mod test {

    use super::{ItemMeta, LabelProvider, LabelSelector, ObjectMeta};

    #[test]
    fn test_set_labels() {
        let metadata = ObjectMeta::default().set_labels(vec![("app", "workspace-jdoe")]);
        assert_eq!(metadata.labels.len(), 1);
        assert_eq!(metadata.labels["app"], "workspace-jdoe");
    }

    #[test]
    fn test_selector_query_is_sorted() {
        let selector = LabelSelector::new_labels(vec![("tier", "lab"), ("app", "workspace-jdoe")]);
        assert_eq!(selector.as_query(), "app=workspace-jdoe,tier=lab");
    }

    #[test]
    fn test_display_namespace_first() {
        assert_eq!(
            ItemMeta::new("workspace-jdoe", "lab").to_string(),
            "lab/workspace-jdoe"
        );
    }
}
