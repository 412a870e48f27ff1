//! Dtree (sub-directory quota-tree) object family: a named subtree of a
//! filesystem that can carry its own quota and NFS share independent of
//! the parent filesystem.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::OBJECT_NAME_ALREADY_EXIST, session::Session},
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/DTREE";

#[derive(Debug, Clone, Deserialize)]
pub struct Dtree {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "PARENTFILESYSTEMID")]
    pub filesystem_id: String,
}

pub async fn get_by_name_opt(session: &Session, name: &str) -> Result<Option<Dtree>, ArrayError> {
    get_by_name(session, PATH, name, &[crate::client::envelope::OBJECT_NOT_EXIST]).await
}

pub async fn create(
    session: &Session,
    name: &str,
    filesystem_id: &str,
) -> Result<Dtree, ArrayError> {
    let body = json!({ "NAME": name, "PARENTTYPE": 40, "PARENTFILESYSTEMID": filesystem_id });
    create_tolerant(
        session,
        PATH,
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[crate::client::envelope::OBJECT_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(
        session,
        &format!("{PATH}/{id}"),
        None,
        &[crate::client::envelope::OBJECT_NOT_EXIST],
    )
    .await
}
