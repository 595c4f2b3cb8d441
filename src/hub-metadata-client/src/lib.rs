mod client;
mod in_memory;

pub use client::MetadataClient;
pub use client::NameSpace;
pub use client::ListArg;
pub use client::PatchMergeType;
pub use client::api_status;
pub use client::is_not_found;
pub use in_memory::InMemoryClient;
pub use in_memory::RecordedCall;

pub type SharedClient<C> = std::sync::Arc<C>;
