use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::Serializer;

use crate::WorkspaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AcceleratorType {
    K40,
    K80,
}

impl AcceleratorType {
    /// value of the node label that selects nodes carrying this accelerator
    pub fn node_label(&self) -> &'static str {
        match self {
            Self::K40 => "k40",
            Self::K80 => "k80",
        }
    }
}

impl fmt::Display for AcceleratorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::K40 => write!(f, "K40"),
            Self::K80 => write!(f, "K80"),
        }
    }
}

impl FromStr for AcceleratorType {
    type Err = WorkspaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "k40" => Ok(Self::K40),
            "k80" => Ok(Self::K80),
            _ => Err(WorkspaceError::validation(format!(
                "unknown accelerator type: {}",
                value
            ))),
        }
    }
}

/// Compute requested for a workspace, fixed at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub cpu: u32,
    /// GiB
    pub memory: u32,
    /// GiB
    pub storage: u32,
    pub accelerator: AcceleratorType,
    pub accelerator_count: u32,
}

impl ResourceSpec {
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        if self.cpu == 0 {
            return Err(WorkspaceError::validation("cpu must be at least 1 core"));
        }
        if self.memory == 0 {
            return Err(WorkspaceError::validation("memory must be at least 1Gi"));
        }
        if self.storage == 0 {
            return Err(WorkspaceError::validation("storage must be at least 1Gi"));
        }
        Ok(())
    }

    pub fn cpu_quantity(&self) -> String {
        CpuLimit(self.cpu).to_string()
    }

    pub fn memory_quantity(&self) -> String {
        MemoryLimit(self.memory).to_string()
    }

    pub fn storage_quantity(&self) -> String {
        format!("{}Gi", self.storage)
    }
}

/// whole cores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuLimit(pub u32);

impl fmt::Display for CpuLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CpuLimit {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

/// binary gigabytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimit(pub u32);

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}Gi", self.0)
    }
}

impl FromStr for MemoryLimit {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        value.strip_suffix("Gi").unwrap_or(value).parse().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorLimit {
    pub count: u32,
    /// none when the node selector is missing or unrecognized
    pub kind: Option<AcceleratorType>,
}

impl fmt::Display for AcceleratorLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}x{}", self.count, kind),
            None => write!(f, "{}", self.count),
        }
    }
}

macro_rules! serialize_as_text {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_text!(CpuLimit, MemoryLimit, AcceleratorLimit);

/// Status of the workspace container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleStatus {
    Provisioning,
    Running,
    Waiting,
    Stopped,
    Terminated,
    Undefined,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Provisioning => "Provisioning",
            Self::Running => "Running",
            Self::Waiting => "Waiting",
            Self::Stopped => "Stopped",
            Self::Terminated => "Terminated",
            Self::Undefined => "Undefined",
        };
        f.write_str(label)
    }
}

/// Snapshot of a workspace at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceDescriptor {
    pub name: String,
    pub cpu_limit: Option<CpuLimit>,
    pub memory_limit: Option<MemoryLimit>,
    pub gpu_limit: Option<AcceleratorLimit>,
    pub status: LifecycleStatus,
}

/// The four cluster resources backing a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    StorageClaim,
    Workload,
    Service,
    Route,
}

/// steps are named after the resource they create
pub type ProvisionStep = ResourceKind;

impl ResourceKind {
    /// creation order, teardown runs in reverse
    pub const PROVISION_ORDER: [ResourceKind; 4] = [
        ResourceKind::StorageClaim,
        ResourceKind::Workload,
        ResourceKind::Service,
        ResourceKind::Route,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::StorageClaim => "storage claim",
            Self::Workload => "workload",
            Self::Service => "service",
            Self::Route => "route",
        };
        f.write_str(label)
    }
}

/// Workspace as a whole, derived from which resources exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WorkspacePhase {
    Absent,
    Provisioning,
    Running,
    Stopped,
    Degraded { missing: Vec<ResourceKind> },
    Deleting,
}

impl WorkspacePhase {
    /// create may start or resume from this phase
    pub fn accepts_create(&self) -> bool {
        matches!(self, Self::Absent | Self::Degraded { .. })
    }
}

impl fmt::Display for WorkspacePhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Provisioning => write!(f, "Provisioning"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Degraded { missing } => {
                let missing: Vec<String> = missing.iter().map(|kind| kind.to_string()).collect();
                write!(f, "Degraded (missing {})", missing.join(", "))
            }
            Self::Deleting => write!(f, "Deleting"),
        }
    }
}
