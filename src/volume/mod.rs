//! Volume-creation strategies: one module per provisioning mode, selected
//! by [`factory::select_strategy`] and dispatched through the
//! [`traits::CreateVolume`] trait.

pub mod clone;
pub mod descriptor;
pub mod factory;
pub mod hypermetro;
pub mod modify;
pub mod plain;
pub mod replication;
pub mod snapshot;
pub mod traits;

pub use descriptor::VolumeDescriptor;
pub use factory::{VolumeStrategy, select_strategy};
pub use traits::{CreateVolume, VolumeCreateContext};
