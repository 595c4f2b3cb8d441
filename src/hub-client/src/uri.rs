use anyhow::Result;
use hyper::Uri;
use serde::Serialize;

use hub_metadata_client::NameSpace;
use hub_types::options::ListOptions;
use hub_types::{ApiResource, Spec};

/// uri of a single item, optionally a sub resource such as `/log`
pub fn item_uri<S, Q>(
    host: &str,
    name: &str,
    namespace: &str,
    sub_resource: Option<&str>,
    query_params: Option<&Q>,
) -> Result<Uri>
where
    S: Spec,
    Q: Serialize,
{
    let collection = collection_path(S::resource(), host, &namespace.into());
    let sub_resource = sub_resource.unwrap_or("");
    let query = encode_query(query_params)?;

    Ok(format!("{collection}/{name}{sub_resource}{query}").parse()?)
}

/// uri of a collection
pub fn items_uri<S>(
    host: &str,
    namespace: NameSpace,
    list_options: Option<ListOptions>,
) -> Result<Uri>
where
    S: Spec,
{
    let collection = collection_path(S::resource(), host, &namespace);
    let query = encode_query(list_options.as_ref())?;
    Ok(format!("{collection}{query}").parse()?)
}

/// `{host}/api/v1/namespaces/{ns}/{plural}`, `/apis/{group}/...` outside the core group
pub fn collection_path(resource: &ApiResource, host: &str, namespace: &NameSpace) -> String {
    let prefix = resource.api_prefix();
    let plural = resource.plural;
    match namespace {
        NameSpace::All => format!("{host}/{prefix}/{plural}"),
        NameSpace::Named(ns) => format!("{host}/{prefix}/namespaces/{ns}/{plural}"),
    }
}

fn encode_query<Q: Serialize>(params: Option<&Q>) -> Result<String> {
    Ok(match params {
        Some(params) => format!("?{}", serde_qs::to_string(params)?),
        None => String::new(),
    })
}

#[cfg(test)]
mod test {

    use serde::Serialize;

    use hub_metadata_client::NameSpace;
    use hub_types::app::deployment::DeploymentSpec;
    use hub_types::core::pod::PodSpec;
    use hub_types::networking::ingress::IngressSpec;
    use hub_types::options::ListOptions;
    use hub_types::ApiResource;

    use super::{collection_path, item_uri, items_uri};

    const NS: &str = "default";
    const ITEMS: ApiResource = ApiResource::core("Item", "items");

    #[derive(Serialize)]
    struct LogQuery {
        container: &'static str,
    }

    #[test]
    fn test_api_prefix_core() {
        let uri = collection_path(&ITEMS, "https://localhost", &NS.into());
        assert_eq!(uri, "https://localhost/api/v1/namespaces/default/items");
    }

    #[test]
    fn test_api_prefix_all_namespaces() {
        let uri = collection_path(&ITEMS, "https://localhost", &NameSpace::All);
        assert_eq!(uri, "https://localhost/api/v1/items");
    }

    #[test]
    fn test_deployment_items_uri() {
        let uri = items_uri::<DeploymentSpec>("https://localhost", "lab".into(), None)
            .expect("uri");
        assert_eq!(
            uri.to_string(),
            "https://localhost/apis/apps/v1/namespaces/lab/deployments"
        );
    }

    #[test]
    fn test_ingress_item_uri() {
        let uri = item_uri::<IngressSpec, ()>(
            "https://localhost",
            "workspace-jdoe-ingress",
            NS,
            None,
            None,
        )
        .expect("uri");
        assert_eq!(
            uri.to_string(),
            "https://localhost/apis/networking.k8s.io/v1/namespaces/default/ingresses/workspace-jdoe-ingress"
        );
    }

    #[test]
    fn test_pod_log_uri() {
        let uri = item_uri::<PodSpec, LogQuery>(
            "https://localhost",
            "workspace-jdoe-5d9c",
            NS,
            Some("/log"),
            Some(&LogQuery {
                container: "workspace-jdoe",
            }),
        )
        .expect("uri");
        assert_eq!(
            uri.to_string(),
            "https://localhost/api/v1/namespaces/default/pods/workspace-jdoe-5d9c/log?container=workspace-jdoe"
        );
    }

    #[test]
    fn test_list_with_options() {
        let opt = ListOptions {
            limit: Some(10),
            ..Default::default()
        };
        let uri = items_uri::<PodSpec>("https://localhost", "default".into(), Some(opt))
            .expect("uri");
        assert_eq!(
            uri.to_string(),
            "https://localhost/api/v1/namespaces/default/pods?limit=10"
        );
    }
}
