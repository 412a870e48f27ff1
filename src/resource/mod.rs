//! The storage-array resource API: one module per object family, all
//! built on the conventions in [`common`] (get-by-name, batch listing,
//! tolerant create/delete, group membership).

pub mod common;

pub mod dtree;
pub mod filesystem;
pub mod fs_snapshot;
pub mod host;
pub mod host_group;
pub mod hyper_metro;
pub mod initiator;
pub mod license;
pub mod lun;
pub mod lun_copy;
pub mod lun_group;
pub mod lun_snapshot;
pub mod mapping_view;
pub mod nfs_share;
pub mod nfs_share_auth_client;
pub mod pool;
pub mod qos;
pub mod quota;
pub mod remote_device;
pub mod replication;
pub mod system;
pub mod vstore;
pub mod workload;
