//! Directory/dtree quota object family.
//!
//! Quota usage statistics are only refreshed on the schedule set by
//! `SCHEDULESTARTTIME`; the array expects that value as Unix seconds for
//! *today's* UTC midnight, computed from the array's own clock rather than
//! the client host's.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{client::session::Session, errors::ArrayError, resource::system};

const PATH: &str = "/QUOTA";

#[derive(Debug, Clone, Deserialize)]
pub struct Quota {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "PARENTID")]
    pub parent_id: String,
}

/// `PARENTTYPE` for a quota scoped to a whole filesystem.
const PARENT_TYPE_FILESYSTEM: i64 = 40;
/// `PARENTTYPE` for a quota scoped to a dtree.
const PARENT_TYPE_DTREE: i64 = 16445;

#[derive(Debug, Clone, Copy)]
pub enum QuotaParent<'a> {
    Filesystem(&'a str),
    Dtree(&'a str),
}

pub async fn create(
    session: &Session,
    parent: QuotaParent<'_>,
    space_hard_quota_sectors: u64,
) -> Result<Quota, ArrayError> {
    let (parent_type, parent_id) = match parent {
        QuotaParent::Filesystem(id) => (PARENT_TYPE_FILESYSTEM, id),
        QuotaParent::Dtree(id) => (PARENT_TYPE_DTREE, id),
    };
    let start_time = today_utc_midnight(system::current_time(session).await?);
    let body = json!({
        "PARENTTYPE": parent_type,
        "PARENTID": parent_id,
        "QUOTATYPE": 1,
        "SPACEHARDQUOTA": space_hard_quota_sectors,
        "SCHEDULESTARTTIME": start_time.timestamp(),
    });
    let env = session.post(PATH, body).await?;
    env.data_as::<Quota>()
}

/// Deletes a quota. `force` lets a caller remove a quota that still has
/// files under it, which callers on the volume-deletion path intentionally
/// request; a plain rollback compensator should leave `force` false.
pub async fn delete(session: &Session, id: &str, force: bool) -> Result<(), ArrayError> {
    let path = format!("{PATH}/{id}?FORCEFLAG={}", if force { 1 } else { 0 });
    match session.delete(&path, None).await {
        Ok(_) => Ok(()),
        Err(ArrayError::Application { code, .. })
            if code == crate::client::envelope::OBJECT_NOT_EXIST =>
        {
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn today_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn today_utc_midnight_is_start_of_the_same_day() {
        let now = Utc
            .from_utc_datetime(
                &NaiveDate::from_ymd_opt(2026, 7, 28)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap(),
            );
        let midnight = today_utc_midnight(now);
        assert_eq!(
            midnight,
            Utc.from_utc_datetime(
                &NaiveDate::from_ymd_opt(2026, 7, 28)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }
}
