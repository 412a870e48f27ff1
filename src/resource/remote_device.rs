//! Remote-device registration, the prerequisite for HyperMetro and
//! replication pairing against a second array.

use anyhow::Result;
use serde::Deserialize;

use crate::{client::session::Session, errors::ArrayError};

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDevice {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "HEALTHSTATUS")]
    pub health_status: String,
    #[serde(rename = "ARRAYTYPE")]
    pub array_type: String,
}

/// `HEALTHSTATUS` value meaning the link to the remote array is up.
pub const HEALTH_STATUS_NORMAL: &str = "1";

pub async fn list(session: &Session) -> Result<Vec<RemoteDevice>, ArrayError> {
    let env = session.get("/remote_device").await?;
    env.data_as_list()
}

pub async fn find_by_storage_id(
    session: &Session,
    remote_backend_id: &str,
) -> Result<Option<RemoteDevice>, ArrayError> {
    let devices = list(session).await?;
    Ok(devices.into_iter().find(|d| d.name == remote_backend_id))
}
