//! The strategy interface every volume creator implements, and the
//! shared context all of them operate against.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

use crate::{
    cfg::config::BackendIdentity, client::session::Session, params::ParameterBundle,
    volume::descriptor::VolumeDescriptor,
};

/// Everything a volume creator needs: the volume name, the parsed
/// parameter bundle, the requested capacity, and a session for the local
/// array plus an optional session for a paired remote array (HyperMetro or
/// replication).
pub struct VolumeCreateContext<'a> {
    pub volume_name: &'a str,
    pub capacity_sectors: u64,
    pub params: &'a ParameterBundle,
    pub backend: &'a BackendIdentity,
    pub active: &'a Session,
    pub standby: Option<&'a Session>,
}

/// The strategy interface. Implemented once per provisioning mode
/// (plain, clone, snapshot, HyperMetro, modify) and selected by
/// [`crate::volume::factory::select_strategy`].
#[enum_dispatch]
pub trait CreateVolume {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor>;
}
