//! Create-from-snapshot volume creation. Delegates to [`super::clone`]'s
//! transaction-building machinery: a snapshot-sourced clone differs from a
//! filesystem-sourced clone only in which ID the array's clone call treats
//! as the parent.

use anyhow::{Context, Result, anyhow};

use crate::{
    resource::fs_snapshot,
    volume::{
        clone::clone_nas_from,
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

pub struct SnapshotFs;

impl CreateVolume for SnapshotFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        let snapshot_name = ctx
            .params
            .source_snapshot_name()
            .ok_or_else(|| anyhow!("snapshot volume requested but sourceSnapshotName was not supplied"))?;

        let snapshot = fs_snapshot::get_by_name_opt(ctx.active, snapshot_name)
            .await
            .context("looking up source filesystem snapshot")?
            .ok_or_else(|| anyhow!("filesystem snapshot {snapshot_name:?} not found"))?;

        clone_nas_from(ctx, snapshot.id, true).await
    }
}
