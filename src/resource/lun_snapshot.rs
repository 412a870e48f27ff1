//! Block LUN snapshot object family.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{LUN_SNAPSHOT_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST, SNAPSHOT_NOT_ACTIVATED},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/snapshot";

#[derive(Debug, Clone, Deserialize)]
pub struct LunSnapshot {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "PARENTID")]
    pub lun_id: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<LunSnapshot>, ArrayError> {
    get_by_name(session, PATH, name, &[LUN_SNAPSHOT_NOT_EXIST]).await
}

pub async fn create(
    session: &Session,
    name: &str,
    lun_id: &str,
) -> Result<LunSnapshot, ArrayError> {
    let body = json!({ "NAME": name, "PARENTID": lun_id, "PARENTTYPE": 11 });
    create_tolerant(
        session,
        PATH,
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[LUN_SNAPSHOT_NOT_EXIST],
    )
    .await
}

pub async fn activate(session: &Session, id: &str) -> Result<(), ArrayError> {
    let body = json!({ "SNAPSHOTLIST": [id] });
    match session.post("/snapshot/activate", body).await {
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    }
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(
        session,
        &format!("{PATH}/{id}"),
        None,
        &[LUN_SNAPSHOT_NOT_EXIST, SNAPSHOT_NOT_ACTIVATED],
    )
    .await
}
