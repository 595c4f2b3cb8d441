use std::io::Error as IoError;
use std::io::ErrorKind;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use tracing::warn;

use hub_config::K8Config;
use hub_config::KubeConfig;
use hub_config::PodConfig;

pub trait ConfigBuilder: Sized {
    type Client;

    fn new() -> Self;

    fn build(self) -> anyhow::Result<Self::Client>;

    fn load_ca_certificate(self, ca_path: impl AsRef<Path>) -> Result<Self, IoError>;

    // load from ca data
    fn load_ca_cert_with_data(self, data: Vec<u8>) -> Result<Self, IoError>;

    // load client certificate (crt) and private key
    fn load_client_certificate<P: AsRef<Path>>(
        self,
        client_crt_path: P,
        client_key_path: P,
    ) -> Result<Self, IoError>;

    fn load_client_certificate_with_data(
        self,
        client_crt: Vec<u8>,
        client_key: Vec<u8>,
    ) -> Result<Self, IoError>;
}

/// Build Client
#[derive(Debug)]
pub struct ClientConfigBuilder<B> {
    config: K8Config,
    builder: B,
    token: Option<String>,
}

impl<B> ClientConfigBuilder<B>
where
    B: ConfigBuilder,
{
    pub fn new(config: K8Config) -> Result<Self, IoError> {
        let (builder, token) = Self::config(&config)?;

        Ok(Self {
            config,
            builder,
            token,
        })
    }

    /// configure based on k8 config
    fn config(config: &K8Config) -> Result<(B, Option<String>), IoError> {
        let builder = B::new();
        match config {
            K8Config::Pod(pod_config) => Ok((
                Self::configure_in_cluster(builder, pod_config)?,
                Some(pod_config.token.clone()),
            )),
            K8Config::KubeConfig(kube_config) => {
                Self::configure_out_of_cluster(builder, &kube_config.config)
            }
        }
    }

    pub fn k8_config(&self) -> &K8Config {
        &self.config
    }

    pub fn token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn host(&self) -> String {
        self.k8_config().api_path().to_owned()
    }

    pub fn build(self) -> anyhow::Result<B::Client> {
        self.builder.build()
    }

    fn configure_in_cluster(builder: B, pod: &PodConfig) -> Result<B, IoError> {
        debug!("configure as pod in cluster");
        let path = pod.ca_path();
        debug!("loading ca at: {}", path);
        builder.load_ca_certificate(path)
    }

    fn configure_out_of_cluster(
        builder: B,
        kube_config: &KubeConfig,
    ) -> Result<(B, Option<String>), IoError> {
        let current = kube_config
            .current()
            .map_err(|err| IoError::new(ErrorKind::InvalidInput, err.to_string()))?;
        let cluster = current.cluster;

        if cluster.insecure_skip_tls_verify == Some(true) {
            warn!("insecure-skip-tls-verify is not supported, server certificate is verified");
        }

        let builder = if let Some(ca_data) = &cluster.certificate_authority_data {
            debug!("detected in-line cluster CA certs");
            builder.load_ca_cert_with_data(decode(ca_data)?)?
        } else {
            // not inline, then must refer to a file
            let ca_certificate_path = cluster.certificate_authority.as_ref().ok_or_else(|| {
                IoError::new(
                    ErrorKind::InvalidInput,
                    format!("cluster of context '{}' has no CA", current.name),
                )
            })?;

            debug!("loading cluster CA from: {:#?}", ca_certificate_path);

            builder.load_ca_certificate(ca_certificate_path)?
        };

        let user = current.user;
        if let Some(client_cert_data) = &user.client_certificate_data {
            debug!("detected in-line client certs");
            let client_key_data = user.client_key_data.as_ref().ok_or_else(|| {
                IoError::new(
                    ErrorKind::InvalidInput,
                    "current user must have client key data".to_owned(),
                )
            })?;

            Ok((
                builder.load_client_certificate_with_data(
                    decode(client_cert_data)?,
                    decode(client_key_data)?,
                )?,
                user.token.clone(),
            ))
        } else if let Some(client_crt_path) = user.client_certificate.as_ref() {
            let client_key_path = user.client_key.as_ref().ok_or_else(|| {
                IoError::new(
                    ErrorKind::InvalidInput,
                    "current user must have client key".to_owned(),
                )
            })?;

            debug!(
                "loading client crt: {} and client key: {}",
                client_crt_path, client_key_path
            );
            Ok((
                builder.load_client_certificate(client_crt_path, client_key_path)?,
                user.token.clone(),
            ))
        } else if let Some(user_token) = &user.token {
            // microk8s and most managed clusters hand out a static token
            Ok((builder, Some(user_token.clone())))
        } else {
            Err(IoError::new(
                ErrorKind::InvalidInput,
                "no client cert crt data, path or user token were found".to_owned(),
            ))
        }
    }
}

fn decode(data: &str) -> Result<Vec<u8>, IoError> {
    STANDARD.decode(data).map_err(|err| {
        IoError::new(
            ErrorKind::InvalidInput,
            format!("base64 decoding err: {}", err),
        )
    })
}
