//! Mapping view object family: the binding between a LUN group and a host
//! group that actually exposes LUNs to a host.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{
        envelope::{
            HOSTGROUP_ALREADY_IN_MAPPING, HOSTGROUP_NOT_IN_MAPPING, LUNGROUP_ALREADY_IN_MAPPING,
            LUNGROUP_NOT_IN_MAPPING, MAPPING_NOT_EXIST, OBJECT_NAME_ALREADY_EXIST,
        },
        session::Session,
    },
    errors::ArrayError,
    resource::common::{
        add_to_group_tolerate_present, create_tolerant, delete_tolerate_missing, get_by_name,
        remove_from_group_tolerate_absent,
    },
};

const PATH: &str = "/mappingview";
const ASSOCIATE_PATH: &str = "/mappingview/associate";

#[derive(Debug, Clone, Deserialize)]
pub struct MappingView {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<MappingView>, ArrayError> {
    get_by_name(session, PATH, name, &[MAPPING_NOT_EXIST]).await
}

pub async fn create(session: &Session, name: &str) -> Result<MappingView, ArrayError> {
    create_tolerant(
        session,
        PATH,
        json!({ "NAME": name }),
        name,
        PATH,
        OBJECT_NAME_ALREADY_EXIST,
        &[MAPPING_NOT_EXIST],
    )
    .await
}

pub async fn delete(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(session, &format!("{PATH}/{id}"), None, &[MAPPING_NOT_EXIST]).await
}

pub async fn add_lun_group(
    session: &Session,
    mapping_id: &str,
    lun_group_id: &str,
) -> Result<(), ArrayError> {
    let body = json!({ "ID": mapping_id, "ASSOCIATEOBJTYPE": 256, "ASSOCIATEOBJID": lun_group_id });
    add_to_group_tolerate_present(session, ASSOCIATE_PATH, body, LUNGROUP_ALREADY_IN_MAPPING).await
}

pub async fn remove_lun_group(
    session: &Session,
    mapping_id: &str,
    lun_group_id: &str,
) -> Result<(), ArrayError> {
    let path = format!(
        "{ASSOCIATE_PATH}?ID={mapping_id}&ASSOCIATEOBJTYPE=256&ASSOCIATEOBJID={lun_group_id}"
    );
    remove_from_group_tolerate_absent(session, &path, LUNGROUP_NOT_IN_MAPPING).await
}

pub async fn add_host_group(
    session: &Session,
    mapping_id: &str,
    host_group_id: &str,
) -> Result<(), ArrayError> {
    let body =
        json!({ "ID": mapping_id, "ASSOCIATEOBJTYPE": 14, "ASSOCIATEOBJID": host_group_id });
    add_to_group_tolerate_present(session, ASSOCIATE_PATH, body, HOSTGROUP_ALREADY_IN_MAPPING)
        .await
}

pub async fn remove_host_group(
    session: &Session,
    mapping_id: &str,
    host_group_id: &str,
) -> Result<(), ArrayError> {
    let path = format!(
        "{ASSOCIATE_PATH}?ID={mapping_id}&ASSOCIATEOBJTYPE=14&ASSOCIATEOBJID={host_group_id}"
    );
    remove_from_group_tolerate_absent(session, &path, HOSTGROUP_NOT_IN_MAPPING).await
}
