//! NFS share client-access rules (the export's allowed-clients list).

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    client::{envelope::OBJECT_NAME_ALREADY_EXIST, session::Session},
    errors::ArrayError,
    resource::common::{delete_tolerate_missing, list_all},
};

const PATH: &str = "/NFS_SHARE_AUTH_CLIENT";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthClient {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub client_name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    pub access_val: i64,
    pub all_squash: i64,
    pub root_squash: i64,
    pub access_krb5_ro: i64,
    pub access_krb5_rw: i64,
    pub access_krb5i_ro: i64,
    pub access_krb5i_rw: i64,
    pub access_krb5p_ro: i64,
    pub access_krb5p_rw: i64,
}

pub async fn list_for_share(
    session: &Session,
    share_id: &str,
) -> Result<Vec<AuthClient>, ArrayError> {
    let query = format!("PARENTID={share_id}");
    list_all(session, PATH, Some(&query)).await
}

/// `accessKrb5*` sentinel meaning "unset"; such fields are omitted from
/// the request body rather than sent as `-1`.
const ACCESS_KRB5_UNSET: i64 = -1;

pub async fn add(
    session: &Session,
    share_id: &str,
    client_name: &str,
    rule: AccessRule,
) -> Result<AuthClient, ArrayError> {
    let mut body = json!({
        "PARENTID": share_id,
        "NAME": client_name,
        "ACCESSVAL": rule.access_val,
        "ALLSQUASH": rule.all_squash,
        "ROOTSQUASH": rule.root_squash,
    });
    let krb5_fields = [
        ("ACCESSKRB5RO", rule.access_krb5_ro),
        ("ACCESSKRB5RW", rule.access_krb5_rw),
        ("ACCESSKRB5IRO", rule.access_krb5i_ro),
        ("ACCESSKRB5IRW", rule.access_krb5i_rw),
        ("ACCESSKRB5PRO", rule.access_krb5p_ro),
        ("ACCESSKRB5PRW", rule.access_krb5p_rw),
    ];
    let obj = body.as_object_mut().expect("body is always a JSON object");
    for (key, value) in krb5_fields {
        if value != ACCESS_KRB5_UNSET {
            obj.insert(key.to_string(), json!(value));
        }
    }
    match session.post(PATH, body).await {
        Ok(env) => env.data_as::<AuthClient>(),
        Err(ArrayError::Application { code, .. }) if code == OBJECT_NAME_ALREADY_EXIST => {
            list_for_share(session, share_id)
                .await?
                .into_iter()
                .find(|c| c.client_name == client_name)
                .ok_or_else(|| ArrayError::NotFound {
                    kind: "nfs share auth client",
                    key: client_name.to_string(),
                })
        }
        Err(e) => Err(e),
    }
}

pub async fn remove(session: &Session, id: &str) -> Result<(), ArrayError> {
    delete_tolerate_missing(
        session,
        &format!("{PATH}/{id}"),
        None,
        &[crate::client::envelope::OBJECT_NOT_EXIST],
    )
    .await
}
