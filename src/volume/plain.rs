//! Plain (non-clone, non-snapshot, non-paired) volume creation: a bare
//! filesystem or LUN with its access plumbing (NFS share, QoS, or host
//! mapping) built up through a [`Transaction`] so any mid-way failure
//! unwinds cleanly.

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;

use crate::{
    params::VolumeProtocol,
    resource::{filesystem, nfs_share, nfs_share_auth_client, pool, qos},
    txn::Transaction,
    volume::{
        descriptor::VolumeDescriptor,
        traits::{CreateVolume, VolumeCreateContext},
    },
};

/// Creates a filesystem/LUN directly in a storage pool with no clone,
/// snapshot, or cross-array pairing involved.
pub struct PlainFs;

impl CreateVolume for PlainFs {
    async fn create_volume(&self, ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
        match ctx.params.volume_protocol() {
            VolumeProtocol::Nas => create_nas(ctx).await,
            VolumeProtocol::Block => create_block(ctx).await,
        }
    }
}

async fn create_nas(ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
    let pool_name = ctx
        .params
        .storage_pool()
        .unwrap_or(&ctx.backend.storage_pool);
    let pool = pool::get_by_name_opt(ctx.active, pool_name)
        .await
        .context("looking up storage pool")?
        .ok_or_else(|| anyhow!("storage pool {pool_name:?} not found or offline"))?;
    if !pool::has_capacity(&pool, ctx.capacity_sectors) {
        return Err(anyhow!(
            "storage pool {pool_name:?} does not have {} sectors free",
            ctx.capacity_sectors
        ));
    }

    let name = ctx.volume_name.to_string();
    let pool_id = pool.id.clone();
    let capacity = ctx.capacity_sectors;
    let alloc_type = ctx.params.alloc_type();
    let session = ctx.active.clone();

    let mut txn = Transaction::new(CancellationToken::new());

    let fs_name = name.clone();
    let fs_session = session.clone();
    txn.then(
        "create filesystem",
        move || {
            let fs_session = fs_session.clone();
            let fs_name = fs_name.clone();
            let pool_id = pool_id.clone();
            async move {
                filesystem::create(
                    &fs_session,
                    filesystem::CreateFilesystem {
                        name: &fs_name,
                        pool_id: &pool_id,
                        capacity_sectors: capacity,
                        alloc_type,
                    },
                )
                .await?;
                Ok(())
            }
        },
        {
            let fs_session = session.clone();
            let fs_name = name.clone();
            move || {
                let fs_session = fs_session.clone();
                let fs_name = fs_name.clone();
                async move {
                    if let Some(fs) = filesystem::get_by_name_opt(&fs_session, &fs_name).await? {
                        filesystem::delete(&fs_session, &fs.id).await?;
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
                        .ok_or_else(|| {
                            anyhow!("filesystem {share_name:?} disappeared mid-transaction")
                        })?;
                    let share_path = format!("/{share_name}/");
                    nfs_share::create(&share_session, &fs.id, &share_path).await?;
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

        if let Some(client_name) = ctx.params.auth_client() {
            let client_name = client_name.to_string();
            let rule = nfs_share_auth_client::AccessRule {
                access_val: ctx.params.access_val(),
                all_squash: ctx.params.all_squash(),
                root_squash: ctx.params.root_squash(),
                access_krb5_ro: ctx.params.access_krb5_ro(),
                access_krb5_rw: ctx.params.access_krb5_rw(),
                access_krb5i_ro: ctx.params.access_krb5i_ro(),
                access_krb5i_rw: ctx.params.access_krb5i_rw(),
                access_krb5p_ro: ctx.params.access_krb5p_ro(),
                access_krb5p_rw: ctx.params.access_krb5p_rw(),
            };
            let auth_session = session.clone();
            let auth_share_path = format!("/{name}/");
            let auth_client_name = client_name.clone();
            txn.then(
                "grant nfs share access",
                move || {
                    let auth_session = auth_session.clone();
                    let auth_share_path = auth_share_path.clone();
                    let auth_client_name = auth_client_name.clone();
                    async move {
                        let share = nfs_share::get_by_path(&auth_session, &auth_share_path)
                            .await?
                            .ok_or_else(|| {
                                anyhow!("nfs share {auth_share_path:?} disappeared mid-transaction")
                            })?;
                        nfs_share_auth_client::add(&auth_session, &share.id, &auth_client_name, rule)
                            .await?;
                        Ok(())
                    }
                },
                {
                    let auth_session = session.clone();
                    let auth_share_path = format!("/{name}/");
                    let auth_client_name = client_name.clone();
                    move || {
                        let auth_session = auth_session.clone();
                        let auth_share_path = auth_share_path.clone();
                        let auth_client_name = auth_client_name.clone();
                        async move {
                            if let Some(share) =
                                nfs_share::get_by_path(&auth_session, &auth_share_path).await?
                            {
                                if let Some(client) =
                                    nfs_share_auth_client::list_for_share(&auth_session, &share.id)
                                        .await?
                                        .into_iter()
                                        .find(|c| c.client_name == auth_client_name)
                                {
                                    nfs_share_auth_client::remove(&auth_session, &client.id).await?;
                                }
                            }
                            Ok(())
                        }
                    }
                },
            );
        }

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
                            .ok_or_else(|| {
                                anyhow!("filesystem {qos_fs_name:?} disappeared mid-transaction")
                            })?;
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

    txn.commit_or_rollback().await?;

    let fs = filesystem::get_by_name_opt(&session, &name)
        .await?
        .ok_or_else(|| anyhow!("filesystem {name:?} missing after successful commit"))?;

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

async fn create_block(ctx: &VolumeCreateContext<'_>) -> Result<VolumeDescriptor> {
    use crate::resource::lun;

    let pool_name = ctx
        .params
        .storage_pool()
        .unwrap_or(&ctx.backend.storage_pool);
    let pool = pool::get_by_name_opt(ctx.active, pool_name)
        .await
        .context("looking up storage pool")?
        .ok_or_else(|| anyhow!("storage pool {pool_name:?} not found or offline"))?;
    if !pool::has_capacity(&pool, ctx.capacity_sectors) {
        return Err(anyhow!(
            "storage pool {pool_name:?} does not have {} sectors free",
            ctx.capacity_sectors
        ));
    }

    let created = lun::create(
        ctx.active,
        lun::CreateLun {
            name: ctx.volume_name,
            pool_id: &pool.id,
            capacity_sectors: ctx.capacity_sectors,
            alloc_type: ctx.params.alloc_type(),
        },
    )
    .await
    .context("creating lun")?;

    Ok(VolumeDescriptor {
        name: ctx.volume_name.to_string(),
        backend_id: ctx.backend.id.clone(),
        pool_id: created.pool_id,
        lun_wwn: Some(created.wwn),
        filesystem_id: None,
        dtree_id: None,
        capacity_sectors: ctx.capacity_sectors,
    })
}
