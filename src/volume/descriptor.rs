//! The result of a successful volume-creation strategy run.

/// What got created, addressed the way the CSI layer above this crate
/// needs to reference it again (attach, publish, delete).
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    pub name: String,
    pub backend_id: String,
    pub pool_id: String,
    /// Set for block (LUN) volumes.
    pub lun_wwn: Option<String>,
    /// Set for NAS (filesystem) volumes.
    pub filesystem_id: Option<String>,
    /// Set when the volume is a dtree rather than a whole filesystem.
    pub dtree_id: Option<String>,
    pub capacity_sectors: u64,
}
