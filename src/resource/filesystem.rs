//! NAS filesystem object family.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{FILESYSTEM_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name, with_vstore},
};

const PATH: &str = "/filesystem";

#[derive(Debug, Clone, Deserialize)]
pub struct Filesystem {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "CAPACITY")]
    pub capacity: String,
    #[serde(rename = "PARENTID")]
    pub pool_id: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<Filesystem>, ArrayError> {
    get_by_name(session, PATH, name, &[FILESYSTEM_NOT_EXIST]).await
}

#[derive(Debug, Clone)]
pub struct CreateFilesystem<'a> {
    pub name: &'a str,
    pub pool_id: &'a str,
    pub capacity_sectors: u64,
    pub alloc_type: i64,
}

pub async fn create(
    session: &Session,
    req: CreateFilesystem<'_>,
) -> Result<Filesystem, ArrayError> {
    let body = with_vstore(
        session,
        json!({
            "NAME": req.name,
            "PARENTID": req.pool_id,
            "CAPACITY": req.capacity_sectors,
            "ALLOCTYPE": req.alloc_type,
        }),
    )
    .await;
    create_tolerant(
        session,
        PATH,
        body,
        req.name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[FILESYSTEM_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(
        session,
        &format!("{PATH}/{id}"),
        None,
        &[FILESYSTEM_NOT_EXIST],
    )
    .await
}

/// What a clone's contents are seeded from.
#[derive(Debug, Clone, Copy)]
pub enum CloneSource<'a> {
    /// A live parent filesystem (the `cloneFrom` path).
    Filesystem(&'a str),
    /// A filesystem snapshot (the `sourceSnapshotName` path).
    Snapshot(&'a str),
}

/// Clones a filesystem from either a parent filesystem or a filesystem
/// snapshot, growing to `capacity_sectors` if larger than the source.
pub async fn clone(
    session: &Session,
    name: &str,
    source: CloneSource<'_>,
    capacity_sectors: u64,
    clone_speed: i64,
) -> Result<Filesystem, ArrayError> {
    let mut body = json!({
        "NAME": name,
        "CAPACITY": capacity_sectors,
        "CLONESPEED": clone_speed,
        "ISCLONE": true,
    });
    match source {
        CloneSource::Filesystem(id) => body["PARENTFILESYSTEMID"] = json!(id),
        CloneSource::Snapshot(id) => body["PARENTSNAPSHOTID"] = json!(id),
    }
    let body = with_vstore(session, body).await;
    create_tolerant(
        session,
        "/clonefilesystem",
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[FILESYSTEM_NOT_EXIST],
    )
    .await
}

/// Splits a clone from its source, so the clone keeps its data but is no
/// longer dependent on the source's existence. Tolerates the clone
/// already being independent.
pub async fn split_clone(session: &Session, id: &str) -> Result<(), ArrayError> {
    match session
        .put("/filesystem_split_switch", json!({ "ID": id, "SPLITENABLE": true }))
        .await
    {
        Ok(_) => Ok(()),
        Err(ArrayError::Application { code, .. }) if code == FILESYSTEM_NOT_EXIST => Ok(()),
        Err(e) => Err(e),
    }
}

/// Stops an in-progress clone split, the compensator for [`split_clone`].
/// Tolerates the clone having already gone away.
pub async fn stop_split_clone(session: &Session, id: &str) -> Result<(), ArrayError> {
    match session
        .put("/filesystem_split_switch", json!({ "ID": id, "SPLITENABLE": false }))
        .await
    {
        Ok(_) => Ok(()),
        Err(ArrayError::Application { code, .. }) if code == FILESYSTEM_NOT_EXIST => Ok(()),
        Err(e) => Err(e),
    }
}
