//! Host object family: the array-side representation of a client node.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{HOST_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/host";

/// Array-side OS type code for a generic Linux host.
pub const OS_TYPE_LINUX: i64 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
}

pub async fn get_by_name_opt(session: &Session, name: &str) -> Result<Option<Host>, ArrayError> {
    get_by_name(session, PATH, name, &[HOST_NOT_EXIST]).await
}

pub async fn create(session: &Session, name: &str, os_type: i64) -> Result<Host, ArrayError> {
    let body = json!({ "NAME": name, "OPERATIONSYSTEM": os_type });
    create_tolerant(
        session,
        PATH,
        body,
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[HOST_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[HOST_NOT_EXIST]).await
}
