use std::fmt::Display;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use hyper::body::{to_bytes, Bytes};
use hyper::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, trace};

use hub_config::K8Config;
use hub_metadata_client::{ListArg, MetadataClient, NameSpace, PatchMergeType};
use hub_types::core::pod::PodSpec;
use hub_types::options::{DeleteOptions, ListOptions};
use hub_types::{DeleteStatus, InputK8Obj, K8List, K8Meta, K8Obj, MetaStatus, Spec};

use crate::config::{HyperClient, HyperConfigBuilder};
use crate::uri::{item_uri, items_uri};

const JSON: &str = "application/json";

#[derive(Serialize)]
struct LogQuery<'a> {
    container: &'a str,
}

/// Talks to the api server over https, authenticating with a bearer token or client certificate
pub struct K8Client {
    client: HyperClient,
    host: String,
    token: Option<String>,
}

impl std::fmt::Debug for K8Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8Client")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "****"))
            .finish()
    }
}

/// api server error body, or a synthesized status when a proxy answered in plain text
fn error_status(status: StatusCode, body: &[u8]) -> MetaStatus {
    match serde_json::from_slice::<MetaStatus>(body) {
        Ok(mut api_status) => {
            api_status.code.get_or_insert(status.as_u16());
            api_status
        }
        Err(err) => {
            debug!("error body is not a status object: {}", err);
            MetaStatus::failure(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                String::from_utf8_lossy(body).trim().to_owned(),
            )
        }
    }
}

impl K8Client {
    /// kubeconfig or service account, whichever the environment provides
    pub fn try_default() -> Result<Self> {
        Self::new(K8Config::load()?)
    }

    pub fn new(config: K8Config) -> Result<Self> {
        let builder = HyperConfigBuilder::new(config)?;
        let host = builder.host();
        let token = builder.token();
        let client = builder.build()?;
        debug!(%host, "api client ready");
        Ok(Self {
            client,
            host,
            token,
        })
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn item_uri<S: Spec>(&self, metadata: &dyn K8Meta) -> Result<Uri> {
        item_uri::<S, ()>(self.host(), metadata.name(), metadata.namespace(), None, None)
    }

    fn request(&self, method: Method, uri: Uri, body: Option<(&str, Vec<u8>)>) -> Result<Request<Body>> {
        let mut builder = Request::builder().method(method).uri(uri).header(ACCEPT, JSON);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        let request = match body {
            Some((content_type, bytes)) => {
                trace!("body: {}", String::from_utf8_lossy(&bytes));
                builder.header(CONTENT_TYPE, content_type).body(bytes.into())?
            }
            None => builder.body(Body::empty())?,
        };
        Ok(request)
    }

    /// raw response body; any non 2xx answer becomes a `MetaStatus` error
    async fn send(&self, request: Request<Body>) -> Result<Bytes> {
        debug!(method = %request.method(), uri = %request.uri(), "sending");
        let response = self.client.request(request).await?;
        let status = response.status();
        let body = to_bytes(response.into_body()).await?;
        trace!(%status, "response: {}", String::from_utf8_lossy(&body));

        if status.is_success() {
            Ok(body)
        } else {
            Err(error_status(status, &body).into())
        }
    }

    async fn send_json<T>(&self, request: Request<Body>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|err| {
            error!("undecodable response: {}, body: {}", err, String::from_utf8_lossy(&body));
            err.into()
        })
    }

    pub async fn retrieve_items_inner<S, N>(
        &self,
        namespace: N,
        options: Option<ListOptions>,
    ) -> Result<K8List<S>>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        let uri = items_uri::<S>(self.host(), namespace.into(), options)?;
        let list: K8List<S> = self.send_json(self.request(Method::GET, uri, None)?).await?;
        trace!("{}: {} items", S::label(), list.items.len());
        Ok(list)
    }
}

#[async_trait]
impl MetadataClient for K8Client {
    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<Option<K8Obj<S>>>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        let request = self.request(Method::GET, self.item_uri::<S>(metadata)?, None)?;
        match self.send_json(request).await {
            Ok(item) => Ok(Some(item)),
            Err(err) => match err.downcast_ref::<MetaStatus>() {
                Some(status) if status.is_not_found() => Ok(None),
                _ => Err(err),
            },
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
        let options = option.map(|arg| ListOptions {
            field_selector: arg.field_selector,
            label_selector: arg.label_selector,
            ..Default::default()
        });
        self.retrieve_items_inner(namespace, options).await
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
        let body = match option {
            Some(option) => Some((JSON, serde_json::to_vec(&option)?)),
            None => None,
        };
        let request = self.request(Method::DELETE, self.item_uri::<S>(metadata)?, body)?;

        // a finished delete answers with a Status, a pending foreground delete with the object
        let value: Value = self.send_json(request).await?;
        match value.get("kind").and_then(Value::as_str) {
            Some("Status") => Ok(DeleteStatus::Deleted(serde_json::from_value(value)?)),
            Some(_) => Ok(DeleteStatus::ForegroundDelete(serde_json::from_value(value)?)),
            None => Err(anyhow!("delete response without kind: {}", value)),
        }
    }

    async fn create_item<S>(&self, value: InputK8Obj<S>) -> Result<K8Obj<S>>
    where
        S: Spec,
    {
        let namespace: NameSpace = value.metadata.namespace.as_str().into();
        let uri = items_uri::<S>(self.host(), namespace, None)?;
        debug!(name = %value.metadata.name, "creating {}", S::label());

        let body = serde_json::to_vec(&value)?;
        self.send_json(self.request(Method::POST, uri, Some((JSON, body)))?)
            .await
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
        debug!(%metadata, "patching {}", S::label());
        let body = Some((merge_type.content_type(), serde_json::to_vec(patch)?));
        self.send_json(self.request(Method::PATCH, self.item_uri::<S>(metadata)?, body)?)
            .await
    }

    async fn retrieve_log(
        &self,
        namespace: &str,
        pod_name: &str,
        container_name: &str,
    ) -> Result<String> {
        let query = LogQuery {
            container: container_name,
        };
        let uri = item_uri::<PodSpec, _>(self.host(), pod_name, namespace, Some("/log"), Some(&query))?;
        let body = self.send(self.request(Method::GET, uri, None)?).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod test {

    use hyper::StatusCode;

    use super::error_status;

    #[test]
    fn test_status_body_keeps_reason() {
        let body = br#"{"kind":"Status","status":"Failure","reason":"NotFound","message":"pods \"x\" not found"}"#;
        let status = error_status(StatusCode::NOT_FOUND, body);
        assert!(status.is_not_found());
        assert_eq!(status.reason.as_deref(), Some("NotFound"));
    }

    #[test]
    fn test_plain_text_body() {
        let status = error_status(StatusCode::BAD_GATEWAY, b"upstream connect error\n");
        assert_eq!(status.code, Some(502));
        assert_eq!(status.reason.as_deref(), Some("Bad Gateway"));
        assert_eq!(status.message.as_deref(), Some("upstream connect error"));
    }
}
