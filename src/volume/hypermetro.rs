//! HyperMetro-paired volume creation: provisions the same filesystem on
//! both the active and standby array, then pairs them.

use anyhow::{Context, Result, anyhow};

use crate::{
    resource::{filesystem, hyper_metro, license, nfs_share, pool, qos},
    volume::{
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

/// License feature name gating HyperMetro provisioning.
const LICENSE_FEATURE_HYPERMETRO: &str = "HyperMetro";

pub struct HyperMetroFs;

impl CreateVolume for HyperMetroFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        let standby = ctx
            .standby
            .ok_or_else(|| anyhow!("hyperMetro requested but no standby array session is configured"))?;
        let domain_id = ctx
            .backend
            .hypermetro_domain
            .as_deref()
            .ok_or_else(|| anyhow!("hyperMetro requested but backend.hypermetro_domain is not configured"))?;

        license::require_feature(ctx.active, LICENSE_FEATURE_HYPERMETRO)
            .await
            .context("checking HyperMetro license on active array")?;
        license::require_feature(standby, LICENSE_FEATURE_HYPERMETRO)
            .await
            .context("checking HyperMetro license on standby array")?;

        let local_pool_name = ctx
            .params
            .storage_pool()
            .unwrap_or(&ctx.backend.storage_pool);
        let local_pool = pool::get_by_name_opt(ctx.active, local_pool_name)
            .await?
            .ok_or_else(|| anyhow!("local storage pool {local_pool_name:?} not found or offline"))?;
        let remote_pool_name = ctx
            .backend
            .remote_storage_pool
            .as_deref()
            .unwrap_or(local_pool_name);
        let remote_pool = pool::get_by_name_opt(standby, remote_pool_name)
            .await?
            .ok_or_else(|| anyhow!("remote storage pool {remote_pool_name:?} not found or offline"))?;

        let alloc_type = ctx.params.alloc_type();
        let local_fs = filesystem::create(
            ctx.active,
            filesystem::CreateFilesystem {
                name: ctx.volume_name,
                pool_id: &local_pool.id,
                capacity_sectors: ctx.capacity_sectors,
                alloc_type,
            },
        )
        .await
        .context("creating local filesystem")?;

        let remote_fs = match filesystem::create(
            standby,
            filesystem::CreateFilesystem {
                name: ctx.volume_name,
                pool_id: &remote_pool.id,
                capacity_sectors: ctx.capacity_sectors,
                alloc_type,
            },
        )
        .await
        {
            Ok(fs) => fs,
            Err(e) => {
                let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                return Err(e).context("creating remote filesystem");
            }
        };

        let pair = match hyper_metro::create(ctx.active, domain_id, &local_fs.id, &remote_fs.id)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                let _ = filesystem::delete(standby, &remote_fs.id).await;
                let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                return Err(e).context("creating HyperMetro pair");
            }
        };
        if let Err(e) = hyper_metro::sync(ctx.active, &pair.id).await {
            let _ = hyper_metro::delete(ctx.active, &pair.id).await;
            let _ = filesystem::delete(standby, &remote_fs.id).await;
            let _ = filesystem::delete(ctx.active, &local_fs.id).await;
            return Err(e).context("starting HyperMetro synchronization");
        }

        if !ctx.params.is_skip_nfs_share_and_qos() {
            let share_path = format!("/{}/", ctx.volume_name);
            let share = match nfs_share::create(ctx.active, &local_fs.id, &share_path).await {
                Ok(share) => share,
                Err(e) => {
                    let _ = hyper_metro::delete(ctx.active, &pair.id).await;
                    let _ = filesystem::delete(standby, &remote_fs.id).await;
                    let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                    return Err(e).context("creating nfs share on local filesystem");
                }
            };

            if let Some(qos_policy_name) = ctx.params.qos_policy() {
                let policy = match qos::create(
                    ctx.active,
                    qos_policy_name,
                    qos::QosTarget::Filesystem(&[local_fs.id.clone()]),
                )
                .await
                {
                    Ok(policy) => policy,
                    Err(e) => {
                        let _ = nfs_share::delete(ctx.active, &share.id).await;
                        let _ = hyper_metro::delete(ctx.active, &pair.id).await;
                        let _ = filesystem::delete(standby, &remote_fs.id).await;
                        let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                        return Err(e).context("creating qos policy on local filesystem");
                    }
                };
                if let Err(e) = qos::activate(ctx.active, &policy.id).await {
                    let _ = qos::delete(ctx.active, &policy.id).await;
                    let _ = nfs_share::delete(ctx.active, &share.id).await;
                    let _ = hyper_metro::delete(ctx.active, &pair.id).await;
                    let _ = filesystem::delete(standby, &remote_fs.id).await;
                    let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                    return Err(e).context("activating qos policy on local filesystem");
                }
            }
        }

        Ok(VolumeDescriptor {
            name: ctx.volume_name.to_string(),
            backend_id: ctx.backend.id.clone(),
            pool_id: local_fs.pool_id,
            lun_wwn: None,
            filesystem_id: Some(local_fs.id),
            dtree_id: None,
            capacity_sectors: ctx.capacity_sectors,
        })
    }
}
