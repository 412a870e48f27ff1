//! Asynchronous replication pair object family, and the remote-vstore
//! pairing it depends on.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::REPLICATION_NOT_EXIST, session::Session},
    errors::ArrayError,
    resource::common::delete_tolerate_missing,
};

const PATH: &str = "/REPLICATIONPAIR";

#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationPair {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "HEALTHSTATUS")]
    pub health_status: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VstorePair {
    #[serde(rename = "ID")]
    pub id: String,
}

/// `RUNNINGSTATUS` value meaning the pair is actively synchronizing.
pub const RUNNING_STATUS_SYNCING: &str = "23";

pub async fn get_or_create_vstore_pair(
    session: &Session,
    local_vstore_id: &str,
    remote_vstore_id: &str,
    remote_device_id: &str,
) -> Result<VstorePair, ArrayError> {
    let body = json!({
        "LOCALVSTOREID": local_vstore_id,
        "REMOTEVSTOREID": remote_vstore_id,
        "REMOTEDEVICEID": remote_device_id,
    });
    let env = session.post("/vstore_pair", body).await?;
    env.data_as::<VstorePair>()
}

pub async fn create(
    session: &Session,
    local_object_id: &str,
    remote_object_id: &str,
    remote_device_id: &str,
    replication_model: i64,
) -> Result<ReplicationPair, ArrayError> {
    let body = json!({
        "LOCALRESID": local_object_id,
        "REMOTERESID": remote_object_id,
        "REMOTEDEVICEID": remote_device_id,
        "REPLICATIONMODEL": replication_model,
        "SYNCHRONIZETYPE": 2,
    });
    let env = session.post(PATH, body).await?;
    env.data_as::<ReplicationPair>()
}

pub async fn sync(session: &Session, id: &str) -> Result<(), ArrayError> {
    session
        .put("/REPLICATIONPAIR/sync", json!({ "ID": id }))
        .await
        .map(|_| ())
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[REPLICATION_NOT_EXIST]).await
}
