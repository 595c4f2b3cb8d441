use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::path::Path;

use hyper::client::HttpConnector;
use hyper::Body;
use hyper::Client;
use hyper_rustls::HttpsConnector;
use hyper_rustls::HttpsConnectorBuilder;
use rustls::Certificate;
use rustls::ClientConfig;
use rustls::PrivateKey;
use rustls::RootCertStore;
use rustls_pemfile::Item;
use tracing::debug;

use crate::cert::ClientConfigBuilder;
use crate::cert::ConfigBuilder;

pub type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

pub type HyperConfigBuilder = ClientConfigBuilder<HyperClientBuilder>;

/// collects trust roots and client identity, then builds the https client
pub struct HyperClientBuilder {
    roots: RootCertStore,
    client_auth: Option<(Vec<Certificate>, PrivateKey)>,
}

impl ConfigBuilder for HyperClientBuilder {
    type Client = HyperClient;

    fn new() -> Self {
        Self {
            roots: RootCertStore::empty(),
            client_auth: None,
        }
    }

    fn build(self) -> anyhow::Result<Self::Client> {
        let builder = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(self.roots);

        let tls = match self.client_auth {
            Some((certs, key)) => builder.with_client_auth_cert(certs, key)?,
            None => builder.with_no_client_auth(),
        };

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        Ok(Client::builder().build(connector))
    }

    fn load_ca_certificate(self, ca_path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(ca_path)?;
        self.add_roots(&mut BufReader::new(file))
    }

    fn load_ca_cert_with_data(self, data: Vec<u8>) -> Result<Self, IoError> {
        self.add_roots(&mut data.as_slice())
    }

    fn load_client_certificate<P: AsRef<Path>>(
        mut self,
        client_crt_path: P,
        client_key_path: P,
    ) -> Result<Self, IoError> {
        let certs = retrieve_certs(&mut BufReader::new(File::open(client_crt_path)?))?;
        debug!("retrieved client certs");
        let key = retrieve_private_key(&mut BufReader::new(File::open(client_key_path)?))?;
        debug!("retrieved client private key");
        self.client_auth = Some((certs, key));
        Ok(self)
    }

    fn load_client_certificate_with_data(
        mut self,
        client_crt: Vec<u8>,
        client_key: Vec<u8>,
    ) -> Result<Self, IoError> {
        let certs = retrieve_certs(&mut client_crt.as_slice())?;
        let key = retrieve_private_key(&mut client_key.as_slice())?;
        self.client_auth = Some((certs, key));
        Ok(self)
    }
}

impl HyperClientBuilder {
    fn add_roots(mut self, reader: &mut dyn BufRead) -> Result<Self, IoError> {
        for cert in retrieve_certs(reader)? {
            self.roots.add(&cert).map_err(|err| {
                IoError::new(
                    ErrorKind::InvalidData,
                    format!("problem loading root certificate: {}", err),
                )
            })?;
        }
        Ok(self)
    }
}

fn retrieve_certs(reader: &mut dyn BufRead) -> Result<Vec<Certificate>, IoError> {
    let certs: Vec<Certificate> = rustls_pemfile::certs(reader)?
        .into_iter()
        .map(Certificate)
        .collect();
    if certs.is_empty() {
        return Err(IoError::new(ErrorKind::InvalidData, "no cert found"));
    }
    Ok(certs)
}

fn retrieve_private_key(reader: &mut dyn BufRead) -> Result<PrivateKey, IoError> {
    rustls_pemfile::read_all(reader)?
        .into_iter()
        .find_map(|item| match item {
            Item::RSAKey(key) | Item::PKCS8Key(key) | Item::ECKey(key) => Some(PrivateKey(key)),
            _ => None,
        })
        .ok_or_else(|| IoError::new(ErrorKind::InvalidData, "private key not found"))
}
