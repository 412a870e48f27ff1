//! Selects which [`CreateVolume`] strategy handles a given request.
//!
//! Selection order matters: `ModifyVolume` wins outright (it's not a
//! create at all), then HyperMetro and replication (mutually exclusive,
//! already enforced by [`ParameterBundle::validate`]), then snapshot,
//! then clone, with plain provisioning as the fallback.

use enum_dispatch::enum_dispatch;

use crate::{
    params::ParameterBundle,
    volume::{
        clone::CloneFs, hypermetro::HyperMetroFs, modify::ModifyFs, plain::PlainFs,
        replication::ReplicationFs, snapshot::SnapshotFs, traits::CreateVolume,
    },
};

#[enum_dispatch(CreateVolume)]
pub enum VolumeStrategy {
    Modify(ModifyFs),
    HyperMetro(HyperMetroFs),
    Replication(ReplicationFs),
    Snapshot(SnapshotFs),
    Clone(CloneFs),
    Plain(PlainFs),
}

pub fn select_strategy(params: &ParameterBundle) -> VolumeStrategy {
    if params.is_modify_volume() {
        VolumeStrategy::Modify(ModifyFs)
    } else if params.is_hyper_metro() {
        VolumeStrategy::HyperMetro(HyperMetroFs)
    } else if params.is_replication() {
        VolumeStrategy::Replication(ReplicationFs)
    } else if params.is_snapshot() {
        VolumeStrategy::Snapshot(SnapshotFs)
    } else if params.is_clone() {
        VolumeStrategy::Clone(CloneFs)
    } else {
        VolumeStrategy::Plain(PlainFs)
    }
}
