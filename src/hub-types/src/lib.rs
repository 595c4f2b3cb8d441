/// binds a spec to its status and api resource
macro_rules! spec_resource {
    ($spec:ty, $status:ty, $resource:expr) => {
        impl $crate::Spec for $spec {
            type Status = $status;

            fn resource() -> &'static $crate::ApiResource {
                const RESOURCE: $crate::ApiResource = $resource;
                &RESOURCE
            }
        }

        impl $crate::Status for $status {}
    };
}

pub(crate) use spec_resource;

mod api_status;
mod metadata;
mod object;
mod resource;
pub mod options;
#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "app")]
pub mod app;
#[cfg(feature = "networking")]
pub mod networking;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::api_status::*;
pub use self::metadata::*;
pub use self::object::*;
pub use self::resource::ApiResource;

/// Observed state reported by the cluster for a kind
pub trait Status:
    Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
{
}

/// Desired state of a namespaced kind
pub trait Spec:
    Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
{
    type Status: Status;

    fn resource() -> &'static ApiResource;

    /// kind name, used in logs and error messages
    fn label() -> &'static str {
        Self::resource().kind
    }

    fn api_version() -> String {
        Self::resource().api_version()
    }

    fn kind() -> String {
        Self::resource().kind.to_owned()
    }
}
