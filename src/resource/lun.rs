//! Block LUN object family.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::LUN_NOT_EXIST, envelope::OBJECT_NAME_ALREADY_EXIST, session::Session},
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name, with_vstore},
};

const PATH: &str = "/lun";

#[derive(Debug, Clone, Deserialize)]
pub struct Lun {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "WWN")]
    pub wwn: String,
    #[serde(rename = "PARENTID")]
    pub pool_id: String,
}

pub async fn get_by_name_opt(session: &Session, name: &str) -> Result<Option<Lun>, ArrayError> {
    get_by_name(session, PATH, name, &[LUN_NOT_EXIST]).await
}

#[derive(Debug, Clone)]
pub struct CreateLun<'a> {
    pub name: &'a str,
    pub pool_id: &'a str,
    pub capacity_sectors: u64,
    pub alloc_type: i64,
}

pub async fn create(session: &Session, req: CreateLun<'_>) -> Result<Lun, ArrayError> {
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
        &[LUN_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[LUN_NOT_EXIST]).await
}
