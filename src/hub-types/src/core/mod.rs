pub mod pod;
pub mod service;
pub mod persistent_volume_claim;
