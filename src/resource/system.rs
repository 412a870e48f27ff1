//! Array system info: product model, storage-software version, and the
//! array's own UTC clock (needed to compute quota schedule times).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{client::session::Session, errors::ArrayError};

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "PRODUCTVERSION")]
    pub product_version: String,
    #[serde(rename = "CURRENTTIME")]
    pub current_time_secs: String,
}

pub async fn get(session: &Session) -> Result<SystemInfo, ArrayError> {
    let env = session.get("/system/").await?;
    env.data_as::<SystemInfo>()
}

/// The array's current UTC time, parsed from `CURRENTTIME` (Unix seconds).
pub async fn current_time(session: &Session) -> Result<DateTime<Utc>, ArrayError> {
    let info = get(session).await?;
    let secs: i64 = info.current_time_secs.parse().map_err(|_| {
        ArrayError::Validation("system CURRENTTIME was not a valid timestamp".to_string())
    })?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ArrayError::Validation("system CURRENTTIME out of range".to_string()))
}
