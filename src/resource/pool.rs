//! Storage pool lookups and capacity checks.

use anyhow::Result;
use serde::Deserialize;

use crate::{
    client::{envelope::OBJECT_NOT_EXIST, session::Session},
    errors::ArrayError,
    resource::common::get_by_name,
};

const PATH: &str = "/storagepool";

#[derive(Debug, Clone, Deserialize)]
pub struct Pool {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "USERFREECAPACITY")]
    pub free_capacity_sectors: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running_status: String,
}

/// `RUNNINGSTATUS` value meaning the pool accepts new allocations.
pub const RUNNING_STATUS_ONLINE: &str = "27";

pub async fn get_by_name_opt(session: &Session, name: &str) -> Result<Option<Pool>, ArrayError> {
    get_by_name(session, PATH, name, &[OBJECT_NOT_EXIST])
        .await
        .map(|opt| opt.filter(|p: &Pool| p.running_status == RUNNING_STATUS_ONLINE))
}

pub fn has_capacity(pool: &Pool, requested_sectors: u64) -> bool {
    pool.free_capacity_sectors
        .parse::<u64>()
        .map(|free| free >= requested_sectors)
        .unwrap_or(false)
}
