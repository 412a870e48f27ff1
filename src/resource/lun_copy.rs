//! LUN copy (clone pair) object family: the async background copy that
//! backs clone-from-LUN volume creation.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{LUN_COPY_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/LUNCOPY";

#[derive(Debug, Clone, Deserialize)]
pub struct LunCopy {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "HEALTHSTATUS")]
    pub health_status: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running_status: String,
}

/// `RUNNINGSTATUS` value meaning the copy has finished.
pub const RUNNING_STATUS_COMPLETE: &str = "40";

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<LunCopy>, ArrayError> {
    get_by_name(session, PATH, name, &[LUN_COPY_NOT_EXIST]).await
}

pub async fn create(
    session: &Session,
    name: &str,
    source_lun_id: &str,
    target_lun_id: &str,
    copy_speed: i64,
) -> Result<LunCopy, ArrayError> {
    let body = json!({
        "NAME": name,
        "COPYSPEED": copy_speed,
        "SOURCELUN": format!("INVALID;{source_lun_id};INVALID;INVALID;INVALID"),
        "TARGETLUN": format!("INVALID;{target_lun_id};INVALID;INVALID;INVALID"),
    });
    create_tolerant(
        session,
        PATH,
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[LUN_COPY_NOT_EXIST],
    )
    .await
}

pub async fn start(session: &Session, id: &str) -> Result<(), ArrayError> {
    session
        .put("/LUNCOPY/start", json!({ "ID": id }))
        .await
        .map(|_| ())
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[LUN_COPY_NOT_EXIST]).await
}
