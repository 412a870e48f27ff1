//! QoS policy object family.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::OBJECT_NAME_ALREADY_EXIST, session::Session},
    errors::ArrayError,
    resource::common::{create_tolerant, delete_tolerate_missing, get_by_name},
};

const PATH: &str = "/ioclass";

#[derive(Debug, Clone, Deserialize)]
pub struct QosPolicy {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
}

/// Which object family a QoS policy associates with. The array keys the
/// association list differently depending on whether the policy governs
/// LUNs or NAS filesystems.
#[derive(Debug, Clone, Copy)]
pub enum QosTarget<'a> {
    Lun(&'a [String]),
    Filesystem(&'a [String]),
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<QosPolicy>, ArrayError> {
    get_by_name(session, PATH, name, &[crate::client::envelope::OBJECT_NOT_EXIST]).await
}

pub async fn create(
    session: &Session,
    name: &str,
    target: QosTarget<'_>,
) -> Result<QosPolicy, ArrayError> {
    let body = match target {
        QosTarget::Lun(ids) => json!({ "NAME": name, "LUNLIST": ids, "CLASSTYPE": 1 }),
        QosTarget::Filesystem(ids) => json!({ "NAME": name, "FSLIST": ids, "CLASSTYPE": 1 }),
    };
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

pub async fn activate(session: &Session, id: &str) -> Result<(), ArrayError> {
    session
        .put(&format!("{PATH}/{id}"), json!({ "ENABLESTATUS": "true" }))
        .await
        .map(|_| ())
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
