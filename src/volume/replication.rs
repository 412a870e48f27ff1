//! Replication-paired volume creation: provisions the filesystem locally
//! and pairs it to a remote array with asynchronous replication rather
//! than HyperMetro's synchronous mirroring.

use anyhow::{Context, Result, anyhow};

use crate::{
    resource::{filesystem, license, nfs_share, pool, qos, remote_device, replication},
    volume::{
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

const LICENSE_FEATURE_REPLICATION: &str = "RemoteReplication";
/// `REPLICATIONMODEL` value for asynchronous replication.
const REPLICATION_MODEL_ASYNC: i64 = 2;

pub struct ReplicationFs;

impl CreateVolume for ReplicationFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        let standby = ctx.standby.ok_or_else(|| {
            anyhow!("replication requested but no remote array session is configured")
        })?;

        license::require_feature(ctx.active, LICENSE_FEATURE_REPLICATION)
            .await
            .context("checking replication license on local array")?;

        let remote_device = remote_device::find_by_storage_id(ctx.active, standby.backend_id())
            .await
            .context("looking up remote device registration")?
            .ok_or_else(|| {
                anyhow!(
                    "remote array {:?} is not registered as a remote device on the local array",
                    standby.backend_id()
                )
            })?;

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
            .ok_or_else(|| {
                anyhow!("remote storage pool {remote_pool_name:?} not found or offline")
            })?;

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

        let pair = match replication::create(
            ctx.active,
            &local_fs.id,
            &remote_fs.id,
            &remote_device.id,
            REPLICATION_MODEL_ASYNC,
        )
        .await
        {
            Ok(pair) => pair,
            Err(e) => {
                let _ = filesystem::delete(standby, &remote_fs.id).await;
                let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                return Err(e).context("creating replication pair");
            }
        };
        if let Err(e) = replication::sync(ctx.active, &pair.id).await {
            let _ = replication::delete(ctx.active, &pair.id).await;
            let _ = filesystem::delete(standby, &remote_fs.id).await;
            let _ = filesystem::delete(ctx.active, &local_fs.id).await;
            return Err(e).context("starting replication synchronization");
        }

        if !ctx.params.is_skip_nfs_share_and_qos() {
            let share_path = format!("/{}/", ctx.volume_name);
            let share = match nfs_share::create(ctx.active, &local_fs.id, &share_path).await {
                Ok(share) => share,
                Err(e) => {
                    let _ = replication::delete(ctx.active, &pair.id).await;
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
                        let _ = replication::delete(ctx.active, &pair.id).await;
                        let _ = filesystem::delete(standby, &remote_fs.id).await;
                        let _ = filesystem::delete(ctx.active, &local_fs.id).await;
                        return Err(e).context("creating qos policy on local filesystem");
                    }
                };
                if let Err(e) = qos::activate(ctx.active, &policy.id).await {
                    let _ = qos::delete(ctx.active, &policy.id).await;
                    let _ = nfs_share::delete(ctx.active, &share.id).await;
                    let _ = replication::delete(ctx.active, &pair.id).await;
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
