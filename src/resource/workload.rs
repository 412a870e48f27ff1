//! Workload type (application-tuned I/O profile) lookups, applied to a
//! filesystem or LUN at creation time.

use anyhow::Result;
use serde::Deserialize;

use crate::{client::session::Session, errors::ArrayError};

#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadType {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
}

pub async fn get_by_name_opt(
    session: &Session,
    name: &str,
) -> Result<Option<WorkloadType>, ArrayError> {
    let env = session
        .get(&format!("/workload_type?filter=NAME::{name}"))
        .await?;
    let mut list: Vec<WorkloadType> = env.data_as_list()?;
    Ok(if list.is_empty() {
        None
    } else {
        Some(list.remove(0))
    })
}
