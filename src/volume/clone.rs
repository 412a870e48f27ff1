//! Clone-from-existing-volume creation: `cloneFrom` for NAS, a LUN-copy
//! pair for block.

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;

use crate::{
    params::VolumeProtocol,
    resource::{filesystem, lun, lun_copy, nfs_share, qos},
    txn::Transaction,
    volume::{
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

/// Creates a volume whose contents start as a copy of an existing
/// volume, named by `cloneFrom` in the parameter bundle.
pub struct CloneFs;

impl CreateVolume for CloneFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        let source_name = ctx
            .params
            .clone_from()
            .ok_or_else(|| anyhow!("clone requested but cloneFrom was not supplied"))?;

        match ctx.params.volume_protocol() {
            VolumeProtocol::Nas => clone_nas(ctx, source_name).await,
            VolumeProtocol::Block => clone_block(ctx, source_name).await,
        }
    }
}

pub(crate) async fn clone_nas(
    ctx: &VolumeCreateContext<'_>,
    source_name: &str,
) -> Result<VolumeDescriptor> {
    let source = filesystem::get_by_name_opt(ctx.active, source_name)
        .await
        .context("looking up clone source filesystem")?
        .ok_or_else(|| anyhow!("clone source filesystem {source_name:?} not found"))?;

    clone_nas_from(ctx, source.id.clone(), false).await
}

/// Shared by [`CloneFs`] (clone from a live filesystem) and
/// [`crate::volume::snapshot::SnapshotFs`] (clone from a filesystem
/// snapshot) — the two differ only in which ID the array's
/// `/clonefilesystem` call treats as the parent.
pub(crate) async fn clone_nas_from(
    ctx: &VolumeCreateContext<'_>,
    source_id: String,
    from_snapshot: bool,
) -> Result<VolumeDescriptor> {
    let name = ctx.volume_name.to_string();
    let capacity = ctx.capacity_sectors;
    let clone_speed = ctx.params.clone_speed();
    let session = ctx.active.clone();

    let mut txn = Transaction::new(CancellationToken::new());

    txn.then(
        "clone filesystem",
        {
            let session = session.clone();
            let name = name.clone();
            let source_id = source_id.clone();
            move || {
                let session = session.clone();
                let name = name.clone();
                let source_id = source_id.clone();
                async move {
                    let source = if from_snapshot {
                        filesystem::CloneSource::Snapshot(&source_id)
                    } else {
                        filesystem::CloneSource::Filesystem(&source_id)
                    };
                    filesystem::clone(&session, &name, source, capacity, clone_speed).await?;
                    Ok(())
                }
            }
        },
        {
            let session = session.clone();
            let name = name.clone();
            move || {
                let session = session.clone();
                let name = name.clone();
                async move {
                    if let Some(fs) = filesystem::get_by_name_opt(&session, &name).await? {
                        filesystem::delete(&session, &fs.id).await?;
                    }
                    Ok(())
                }
            }
        },
    );

    if !ctx.params.is_skip_nfs_share_and_qos() {
        let share_session = session.clone();
        let share_name = name.clone();
        txn.then(
            "create nfs share",
            move || {
                let share_session = share_session.clone();
                let share_name = share_name.clone();
                async move {
                    let fs = filesystem::get_by_name_opt(&share_session, &share_name)
                        .await?
                        .ok_or_else(|| anyhow!("cloned filesystem {share_name:?} disappeared"))?;
                    nfs_share::create(&share_session, &fs.id, &format!("/{share_name}/")).await?;
                    Ok(())
                }
            },
            {
                let share_session = session.clone();
                let share_path = format!("/{name}/");
                move || {
                    let share_session = share_session.clone();
                    let share_path = share_path.clone();
                    async move {
                        if let Some(share) =
                            nfs_share::get_by_path(&share_session, &share_path).await?
                        {
                            nfs_share::delete(&share_session, &share.id).await?;
                        }
                        Ok(())
                    }
                }
            },
        );

        if let Some(qos_policy_name) = ctx.params.qos_policy() {
            let qos_policy_name = qos_policy_name.to_string();
            let qos_session = session.clone();
            let qos_fs_name = name.clone();
            let qos_name = qos_policy_name.clone();
            txn.then(
                "create qos policy",
                move || {
                    let qos_session = qos_session.clone();
                    let qos_fs_name = qos_fs_name.clone();
                    let qos_name = qos_name.clone();
                    async move {
                        let fs = filesystem::get_by_name_opt(&qos_session, &qos_fs_name)
                            .await?
                            .ok_or_else(|| anyhow!("cloned filesystem {qos_fs_name:?} disappeared"))?;
                        let policy = qos::create(
                            &qos_session,
                            &qos_name,
                            qos::QosTarget::Filesystem(&[fs.id]),
                        )
                        .await?;
                        qos::activate(&qos_session, &policy.id).await?;
                        Ok(())
                    }
                },
                {
                    let qos_session = session.clone();
                    let qos_name = qos_policy_name.clone();
                    move || {
                        let qos_session = qos_session.clone();
                        let qos_name = qos_name.clone();
                        async move {
                            if let Some(policy) =
                                qos::get_by_name_opt(&qos_session, &qos_name).await?
                            {
                                qos::delete(&qos_session, &policy.id).await?;
                            }
                            Ok(())
                        }
                    }
                },
            );
        }
    }

    if ctx.params.split_clone_requested() {
        let split_session = session.clone();
        let split_name = name.clone();
        txn.then(
            "split clone",
            move || {
                let split_session = split_session.clone();
                let split_name = split_name.clone();
                async move {
                    let fs = filesystem::get_by_name_opt(&split_session, &split_name)
                        .await?
                        .ok_or_else(|| anyhow!("cloned filesystem {split_name:?} disappeared"))?;
                    filesystem::split_clone(&split_session, &fs.id).await?;
                    Ok(())
                }
            },
            {
                let split_session = session.clone();
                let split_name = name.clone();
                move || {
                    let split_session = split_session.clone();
                    let split_name = split_name.clone();
                    async move {
                        if let Some(fs) =
                            filesystem::get_by_name_opt(&split_session, &split_name).await?
                        {
                            filesystem::stop_split_clone(&split_session, &fs.id).await?;
                        }
                        Ok(())
                    }
                }
            },
        );
    }

    txn.commit_or_rollback().await?;

    let fs = filesystem::get_by_name_opt(&session, &name)
        .await?
        .ok_or_else(|| anyhow!("cloned filesystem {name:?} missing after successful commit"))?;

    Ok(VolumeDescriptor {
        name,
        backend_id: ctx.backend.id.clone(),
        pool_id: fs.pool_id,
        lun_wwn: None,
        filesystem_id: Some(fs.id),
        dtree_id: None,
        capacity_sectors: capacity,
    })
}

pub(crate) async fn clone_block(
    ctx: &VolumeCreateContext<'_>,
    source_name: &str,
) -> Result<VolumeDescriptor> {
    let source = lun::get_by_name_opt(ctx.active, source_name)
        .await
        .context("looking up clone source lun")?
        .ok_or_else(|| anyhow!("clone source lun {source_name:?} not found"))?;

    let target = lun::create(
        ctx.active,
        lun::CreateLun {
            name: ctx.volume_name,
            pool_id: &source.pool_id,
            capacity_sectors: ctx.capacity_sectors,
            alloc_type: ctx.params.alloc_type(),
        },
    )
    .await
    .context("creating lun-copy target lun")?;

    let copy_name = format!("copy_{}", ctx.volume_name);
    let copy = lun_copy::create(
        ctx.active,
        &copy_name,
        &source.id,
        &target.id,
        ctx.params.clone_speed(),
    )
    .await
    .context("creating lun copy pair")?;

    lun_copy::start(ctx.active, &copy.id)
        .await
        .context("starting lun copy")?;

    Ok(VolumeDescriptor {
        name: ctx.volume_name.to_string(),
        backend_id: ctx.backend.id.clone(),
        pool_id: target.pool_id,
        lun_wwn: Some(target.wwn),
        filesystem_id: None,
        dtree_id: None,
        capacity_sectors: ctx.capacity_sectors,
    })
}
