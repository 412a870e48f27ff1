//! NFS share object family.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{
            OBJECT_NAME_ALREADY_EXIST, SHARE_NOT_EXIST, SHARE_PATH_ALREADY_EXIST, is_transient,
        },
        session::Session,
    },
    errors::ArrayError,
    resource::common::{delete_tolerate_missing, list_all, with_vstore},
};

const PATH: &str = "/NFSSHARE";

#[derive(Debug, Clone, Deserialize)]
pub struct NfsShare {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "FSID")]
    pub filesystem_id: String,
    #[serde(rename = "SHAREPATH")]
    pub share_path: String,
}

/// Looks a share up by the filesystem path it exports, since NFS shares
/// are addressed by `SHAREPATH` rather than `NAME`.
pub async fn get_by_path(session: &Session, path: &str) -> Result<Option<NfsShare>, ArrayError> {
    let query = format!("filter=SHAREPATH::{path}");
    let shares: Vec<NfsShare> = list_all(session, PATH, Some(&query)).await?;
    Ok(shares.into_iter().next())
}

pub async fn create(
    session: &Session,
    filesystem_id: &str,
    share_path: &str,
) -> Result<NfsShare, ArrayError> {
    let body = with_vstore(
        session,
        json!({ "FSID": filesystem_id, "SHAREPATH": share_path }),
    )
    .await;
    match session.post(PATH, body).await {
        Ok(env) => env.data_as::<NfsShare>(),
        Err(ArrayError::Application { code, .. })
            if code == OBJECT_NAME_ALREADY_EXIST || code == SHARE_PATH_ALREADY_EXIST =>
        {
            existing_or_not_found(session, share_path).await
        }
        Err(ArrayError::Application { code, .. }) if is_transient(code) => {
            let attempts = session.system_busy_retries();
            let interval = session.system_busy_retry_interval();
            for _ in 0..attempts {
                tokio::time::sleep(interval).await;
                if let Some(share) = get_by_path(session, share_path).await? {
                    return Ok(share);
                }
            }
            Err(ArrayError::NotFound {
                kind: "nfs share",
                key: share_path.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

async fn existing_or_not_found(
    session: &Session,
    share_path: &str,
) -> Result<NfsShare, ArrayError> {
    get_by_path(session, share_path)
        .await?
        .ok_or_else(|| ArrayError::NotFound {
            kind: "nfs share",
            key: share_path.to_string(),
        })
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[SHARE_NOT_EXIST]).await
}
