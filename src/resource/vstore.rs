//! Virtual storage system (vStore) lookups.

use anyhow::Result;
use serde::Deserialize;

use crate::{
    client::{envelope::OBJECT_NOT_EXIST, session::Session},
    errors::ArrayError,
    resource::common::get_by_name,
};

const PATH: &str = "/vstore";

#[derive(Debug, Clone, Deserialize)]
pub struct Vstore {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running_status: String,
}

pub async fn get_by_name_opt(session: &Session, name: &str) -> Result<Option<Vstore>, ArrayError> {
    get_by_name(session, PATH, name, &[OBJECT_NOT_EXIST]).await
}
