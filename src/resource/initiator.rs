//! Initiator object family: iSCSI/FC/RoCE initiator registration and
//! host association.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{client::session::Session, errors::ArrayError};

/// Which protocol-specific initiator resource to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorKind {
    Iscsi,
    Fc,
    RoCE,
}

impl InitiatorKind {
    fn path(self) -> &'static str {
        match self {
            InitiatorKind::Iscsi => "/iscsi_initiator",
            InitiatorKind::Fc => "/fc_initiator",
            InitiatorKind::RoCE => "/fc_initiator",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Initiator {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ISFREE")]
    pub is_free: Option<String>,
}

pub async fn get_opt(
    session: &Session,
    kind: InitiatorKind,
    port_name: &str,
) -> Result<Option<Initiator>, ArrayError> {
    match session.get(&format!("{}/{port_name}", kind.path())).await {
        Ok(env) => env.data_as::<Initiator>().map(Some),
        Err(ArrayError::Application { code, .. })
            if code == crate::client::envelope::OBJECT_NOT_EXIST =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub async fn register(
    session: &Session,
    kind: InitiatorKind,
    port_name: &str,
) -> Result<Initiator, ArrayError> {
    if let Some(existing) = get_opt(session, kind, port_name).await? {
        return Ok(existing);
    }
    let body = json!({ "ID": port_name, "TYPE": initiator_type(kind) });
    let env = session.post(kind.path(), body).await?;
    env.data_as::<Initiator>()
}

pub async fn add_to_host(
    session: &Session,
    kind: InitiatorKind,
    port_name: &str,
    host_id: &str,
) -> Result<(), ArrayError> {
    let body = json!({ "ID": port_name, "PARENTTYPE": 21, "PARENTID": host_id });
    session
        .put(&format!("{}/{port_name}", kind.path()), body)
        .await
        .map(|_| ())
}

fn initiator_type(kind: InitiatorKind) -> i64 {
    match kind {
        InitiatorKind::Iscsi => 222,
        InitiatorKind::Fc => 223,
        InitiatorKind::RoCE => 235,
    }
}
