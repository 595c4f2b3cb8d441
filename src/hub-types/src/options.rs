use serde::Serialize;

/// query parameters of a list request
#[derive(Serialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// body of a delete request
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOptions {
    pub kind: &'static str,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_policy: Option<PropagationPolicy>,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            kind: "DeleteOptions",
            api_version: "v1",
            grace_period_seconds: None,
            propagation_policy: None,
        }
    }
}

impl DeleteOptions {
    /// remove dependents first and skip graceful termination
    pub fn foreground_now() -> Self {
        Self {
            grace_period_seconds: Some(0),
            propagation_policy: Some(PropagationPolicy::Foreground),
            ..Default::default()
        }
    }

    pub fn is_foreground(&self) -> bool {
        self.propagation_policy == Some(PropagationPolicy::Foreground)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum PropagationPolicy {
    Orphan,
    Background,
    Foreground,
}

#[cfg(test)]
mod test {

    use super::{DeleteOptions, ListOptions};

    #[test]
    fn test_list_query_skips_unset() {
        let opt = ListOptions {
            label_selector: Some("app=workspace-jdoe".to_owned()),
            ..Default::default()
        };
        let query = serde_qs::to_string(&opt).expect("query");
        assert!(query.starts_with("labelSelector=app"));
        assert!(!query.contains("limit"));
    }

    #[test]
    fn test_foreground_delete_body() {
        let options = DeleteOptions::foreground_now();
        assert!(options.is_foreground());
        assert!(!DeleteOptions::default().is_foreground());
        assert_eq!(
            serde_json::to_string(&options).expect("json"),
            r#"{"kind":"DeleteOptions","apiVersion":"v1","gracePeriodSeconds":0,"propagationPolicy":"Foreground"}"#
        );
    }
}
