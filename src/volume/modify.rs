//! `ModifyVolume`: promotes an existing filesystem to a HyperMetro pair in
//! place. If it's already paired this is a no-op; otherwise it creates a
//! matching remote filesystem and pairs it, following the same tail as
//! [`crate::volume::hypermetro::HyperMetroFs`].

use anyhow::{Context, Result, anyhow};

use crate::{
    resource::{filesystem, hyper_metro, license, pool},
    volume::{
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

/// License feature name gating HyperMetro provisioning.
const LICENSE_FEATURE_HYPERMETRO: &str = "HyperMetro";

pub struct ModifyFs;

impl CreateVolume for ModifyFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        let local_fs = filesystem::get_by_name_opt(ctx.active, ctx.volume_name)
            .await
            .context("looking up volume to modify")?
            .ok_or_else(|| anyhow!("volume {:?} not found for modification", ctx.volume_name))?;
        let capacity: u64 = local_fs
            .capacity
            .parse()
            .map_err(|_| anyhow!("existing filesystem capacity was not numeric"))?;

        if hyper_metro::get_by_local_object_id(ctx.active, &local_fs.id)
            .await
            .context("checking for an existing HyperMetro pair")?
            .is_some()
        {
            return Ok(VolumeDescriptor {
                name: local_fs.name,
                backend_id: ctx.backend.id.clone(),
                pool_id: local_fs.pool_id,
                lun_wwn: None,
                filesystem_id: Some(local_fs.id),
                dtree_id: None,
                capacity_sectors: capacity,
            });
        }

        let standby = ctx.standby.ok_or_else(|| {
            anyhow!("modifying to HyperMetro requires a standby array session")
        })?;
        let domain_id = ctx.backend.hypermetro_domain.as_deref().ok_or_else(|| {
            anyhow!("modifying to HyperMetro requires backend.hypermetro_domain")
        })?;

        license::require_feature(ctx.active, LICENSE_FEATURE_HYPERMETRO)
            .await
            .context("checking HyperMetro license on active array")?;
        license::require_feature(standby, LICENSE_FEATURE_HYPERMETRO)
            .await
            .context("checking HyperMetro license on standby array")?;

        let remote_pool_name = ctx
            .backend
            .remote_storage_pool
            .as_deref()
            .unwrap_or(&ctx.backend.storage_pool);
        let remote_pool = pool::get_by_name_opt(standby, remote_pool_name)
            .await?
            .ok_or_else(|| anyhow!("remote storage pool {remote_pool_name:?} not found or offline"))?;

        let remote_fs = filesystem::create(
            standby,
            filesystem::CreateFilesystem {
                name: &local_fs.name,
                pool_id: &remote_pool.id,
                capacity_sectors: capacity,
                alloc_type: ctx.params.alloc_type(),
            },
        )
        .await
        .context("creating remote filesystem")?;

        let pair = match hyper_metro::create(ctx.active, domain_id, &local_fs.id, &remote_fs.id)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                let _ = filesystem::delete(standby, &remote_fs.id).await;
                return Err(e).context("creating HyperMetro pair");
            }
        };
        hyper_metro::sync(ctx.active, &pair.id)
            .await
            .context("starting HyperMetro synchronization")?;

        Ok(VolumeDescriptor {
            name: local_fs.name,
            backend_id: ctx.backend.id.clone(),
            pool_id: local_fs.pool_id,
            lun_wwn: None,
            filesystem_id: Some(local_fs.id),
            dtree_id: None,
            capacity_sectors: capacity,
        })
    }
}
