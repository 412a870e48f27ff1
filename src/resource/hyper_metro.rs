//! HyperMetro pair object family: synchronous dual-array replication.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::HYPER_METRO_NOT_EXIST, session::Session},
    errors::ArrayError,
    resource::common::{delete_tolerate_missing, list_all},
};

const PATH: &str = "/HyperMetroPair";

#[derive(Debug, Clone, Deserialize)]
pub struct HyperMetroPair {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "HEALTHSTATUS")]
    pub health_status: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running_status: String,
}

/// `RUNNINGSTATUS` value meaning the pair is mirroring normally.
pub const RUNNING_STATUS_NORMAL: &str = "1";

/// Looks up a pair by the local array's filesystem/LUN ID, so a caller can
/// check whether an object is already HyperMetro-paired before attempting
/// to pair it again.
pub async fn get_by_local_object_id(
    session: &Session,
    local_object_id: &str,
) -> Result<Option<HyperMetroPair>, ArrayError> {
    let query = format!("filter=LOCALOBJID::{local_object_id}");
    let pairs: Vec<HyperMetroPair> = list_all(session, PATH, Some(&query)).await?;
    Ok(pairs.into_iter().next())
}

pub async fn create(
    session: &Session,
    domain_id: &str,
    local_object_id: &str,
    remote_object_id: &str,
) -> Result<HyperMetroPair, ArrayError> {
    let body = json!({
        "DOMAINID": domain_id,
        "HCRESOURCETYPE": 2,
        "LOCALOBJID": local_object_id,
        "REMOTEOBJID": remote_object_id,
        "SPEED": 2,
    });
    let env = session.post(PATH, body).await?;
    env.data_as::<HyperMetroPair>()
}

pub async fn sync(session: &Session, id: &str) -> Result<(), ArrayError> {
    session
        .put("/HyperMetroPair/synchronize", json!({ "ID": id }))
        .await
        .map(|_| ())
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[HYPER_METRO_NOT_EXIST]).await
}
