use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

crate::spec_resource!(
    PersistentVolumeClaimSpec,
    PersistentVolumeClaimStatus,
    crate::ApiResource::core("PersistentVolumeClaim", "persistentvolumeclaims")
);

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolumeClaimSpec {
    pub access_modes: Vec<AccessMode>,
    pub resources: VolumeResourceRequirements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Clone)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
    ReadWriteOncePod,
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeResourceRequirements {
    pub requests: BTreeMap<String, String>,
}

impl VolumeResourceRequirements {
    pub fn storage<T: Into<String>>(quantity: T) -> Self {
        let mut requests = BTreeMap::new();
        requests.insert("storage".to_owned(), quantity.into());
        Self { requests }
    }
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolumeClaimStatus {
    /// Pending, Bound or Lost
    pub phase: Option<String>,
    pub capacity: BTreeMap<String, String>,
}
