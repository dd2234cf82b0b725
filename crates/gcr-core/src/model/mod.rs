//! Domain model for recorded cluster resources.
//!
//! One struct per resource kind. Each carries the common snapshot shape
//! (origin timestamp, recording timestamp, optional deletion timestamp and
//! content hash) plus its kind-specific attributes.

pub mod ca_settings;
pub mod event;
pub mod machine_deployment;
pub mod node;
pub mod pdb;
pub mod pod;
pub mod worker_pool;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

pub use ca_settings::AutoscalerSettingsInfo;
pub use event::EventInfo;
pub use machine_deployment::MachineDeploymentInfo;
pub use node::NodeInfo;
pub use pdb::PodDisruptionBudgetInfo;
pub use pod::{PodInfo, PodScheduleStatus};
pub use worker_pool::WorkerPoolInfo;

/// Resource name to quantity, e.g. `cpu -> 500m`.
pub type ResourceList = BTreeMap<String, Quantity>;
