//! GCR Core - domain model and pure logic of the cluster-state recorder
//!
//! This crate provides:
//! - The recorded resource kinds (worker pools, machine deployments, nodes,
//!   pods, pod disruption budgets, events, autoscaler settings)
//! - The text codec used to flatten nested attributes into columns
//! - Content hashing for change detection
//! - The structured error and logging facilities shared with the store

pub mod codec;
pub mod errors;
pub mod hash;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use errors::{CodecError, ExError, ExErrorKind, Result};
pub use hash::ContentHash;
pub use model::{
    AutoscalerSettingsInfo, EventInfo, MachineDeploymentInfo, NodeInfo, PodDisruptionBudgetInfo,
    PodInfo, PodScheduleStatus, ResourceList, WorkerPoolInfo,
};
