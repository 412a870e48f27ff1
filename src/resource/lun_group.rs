//! LUN group object family: a named collection of LUNs mapped together to
//! a host group.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{LUN_ALREADY_IN_GROUP, LUN_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST},
        session::Session,
    },
    errors::ArrayError,
    resource::common::{
        add_to_group_tolerate_present, create_tolerant, delete_tolerate_missing, get_by_name,
        remove_from_group_tolerate_absent,
    },
};

const PATH: &str = "/lungroup";
const ASSOCIATE_PATH: &str = "/lungroup/associate";

#[derive(Debug, Clone, Deserialize)]
pub struct LunGroup {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<LunGroup>, ArrayError> {
    get_by_name(session, PATH, name, &[crate::client::envelope::OBJECT_NOT_EXIST]).await
}

pub async fn create(session: &Session, name: &str) -> Result<LunGroup, ArrayError> {
    create_tolerant(
        session,
        PATH,
        json!({ "NAME": name }),
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

pub async fn add_lun(session: &Session, group_id: &str, lun_id: &str) -> Result<(), ArrayError> {
    let body = json!({ "ID": group_id, "ASSOCIATEOBJTYPE": 11, "ASSOCIATEOBJID": lun_id });
    add_to_group_tolerate_present(session, ASSOCIATE_PATH, body, LUN_ALREADY_IN_GROUP).await
}

pub async fn remove_lun(
    session: &Session,
    group_id: &str,
    lun_id: &str,
) -> Result<(), ArrayError> {
    let path = format!(
        "{ASSOCIATE_PATH}?ID={group_id}&ASSOCIATEOBJTYPE=11&ASSOCIATEOBJID={lun_id}"
    );
    remove_from_group_tolerate_absent(session, &path, LUN_NOT_EXIST).await
}
