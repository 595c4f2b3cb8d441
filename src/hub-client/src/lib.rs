mod cert;
mod client;
mod config;
mod uri;

pub use self::client::K8Client;
pub use hub_config::K8Config;

pub mod metadata {
    pub use hub_metadata_client::*;
}

pub use shared::new_shared;
pub use shared::SharedK8Client;

mod shared {

    use std::sync::Arc;

    use super::K8Client;
    use super::K8Config;

    pub type SharedK8Client = Arc<K8Client>;

    pub fn new_shared(config: K8Config) -> anyhow::Result<SharedK8Client> {
        let client = K8Client::new(config)?;
        Ok(Arc::new(client))
    }
}
