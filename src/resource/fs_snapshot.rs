//! Filesystem snapshot object family (the clone source for NAS volumes).

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{FS_SNAPSHOT_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/FSSNAPSHOT";

#[derive(Debug, Clone, Deserialize)]
pub struct FsSnapshot {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "PARENTID")]
    pub filesystem_id: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<FsSnapshot>, ArrayError> {
    get_by_name(session, PATH, name, &[FS_SNAPSHOT_NOT_EXIST]).await
}

pub async fn create(
    session: &Session,
    name: &str,
    filesystem_id: &str,
) -> Result<FsSnapshot, ArrayError> {
    let body = json!({ "NAME": name, "PARENTID": filesystem_id });
    create_tolerant(
        session,
        PATH,
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[FS_SNAPSHOT_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[FS_SNAPSHOT_NOT_EXIST]).await
}
