//! Shared helpers for the resource-API modules: get-by-name, batch listing,
//! tolerant create/delete, and group membership toggling.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{client::envelope::Envelope, client::session::Session, errors::ArrayError};

const BATCH_PAGE_SIZE: usize = 100;

/// Looks an object up by name via `filter=NAME::<name>&range=[0-100]`.
/// Returns `Ok(None)` if the array reports the object doesn't exist, the
/// filtered list comes back empty, or every match belongs to a different
/// vStore than the session's; any other non-zero code propagates.
pub async fn get_by_name<T: DeserializeOwned>(
    session: &Session,
    path_prefix: &str,
    name: &str,
    not_exist_codes: &[i64],
) -> Result<Option<T>, ArrayError> {
    let path = format!(
        "{path_prefix}?filter=NAME::{}&range=[0-100]",
        urlencode(name)
    );
    match session.get(&path).await {
        Ok(env) => {
            let list: Vec<Value> = env.data_as_list()?;
            list.into_iter()
                .find(|obj| vstore_matches(session, obj))
                .map(|obj| serde_json::from_value(obj).map_err(ArrayError::Decode))
                .transpose()
        }
        Err(e) if e.code().is_some_and(|c| not_exist_codes.contains(&c)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Whether an object's `vstoreName` belongs to the session's vStore,
/// treating an absent field and an unconfigured session vStore alike as
/// the system vStore.
fn vstore_matches(session: &Session, obj: &Value) -> bool {
    let want = session.vstore_name().unwrap_or("");
    let got = obj.get("vstoreName").and_then(Value::as_str).unwrap_or("");
    want == got
}

/// Pages through `getBatchObjs`-style listings (`range=[start-end]`) until
/// a short page signals the end of the list.
pub async fn list_all<T: DeserializeOwned>(
    session: &Session,
    path_prefix: &str,
    extra_query: Option<&str>,
) -> Result<Vec<T>, ArrayError> {
    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = start + BATCH_PAGE_SIZE;
        let range = format!("range=[{start}-{end}]");
        let query = match extra_query {
            Some(q) => format!("{path_prefix}?{q}&{range}"),
            None => format!("{path_prefix}?{range}"),
        };
        let env = session.get(&query).await?;
        let page: Vec<T> = env.data_as_list()?;
        let page_len = page.len();
        out.extend(page);
        if page_len < BATCH_PAGE_SIZE {
            break;
        }
        start = end;
    }
    Ok(out)
}

/// Issues a create call tolerating both "already exists" and transient
/// system-busy/message-timeout responses. This is the combination every
/// create-path resource-API operation needs, per §6 of the design.
pub async fn create_tolerant<T: DeserializeOwned>(
    session: &Session,
    path: &str,
    body: Value,
    name: &str,
    get_path_prefix: &str,
    already_exists_code: i64,
    not_exist_codes: &[i64],
) -> Result<T, ArrayError> {
    use crate::client::envelope::is_transient;

    match session.post(path, body).await {
        Ok(env) => env.data_as::<T>(),
        Err(ArrayError::Application { code, .. }) if code == already_exists_code => {
            get_by_name(session, get_path_prefix, name, not_exist_codes)
                .await?
                .ok_or_else(|| ArrayError::NotFound {
                    kind: "object",
                    key: name.to_string(),
                })
        }
        Err(ArrayError::Application { code, .. }) if is_transient(code) => {
            let attempts = session.system_busy_retries();
            let interval = session.system_busy_retry_interval();
            for _ in 0..attempts {
                tokio::time::sleep(interval).await;
                if let Some(obj) =
                    get_by_name(session, get_path_prefix, name, not_exist_codes).await?
                {
                    return Ok(obj);
                }
            }
            Err(ArrayError::NotFound {
                kind: "object",
                key: name.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

/// Issues a delete call, tolerating the "not found" code(s).
pub async fn delete_tolerate_missing(
    session: &Session,
    path: &str,
    body: Option<Value>,
    not_exist_codes: &[i64],
) -> Result<(), ArrayError> {
    match session.delete(path, body).await {
        Ok(_) => Ok(()),
        Err(e) if e.code().is_some_and(|c| not_exist_codes.contains(&c)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Adds a member to a group, tolerating "already a member".
pub async fn add_to_group_tolerate_present(
    session: &Session,
    path: &str,
    body: Value,
    already_member_code: i64,
) -> Result<(), ArrayError> {
    match session.post(path, body).await {
        Ok(_) => Ok(()),
        Err(ArrayError::Application { code, .. }) if code == already_member_code => Ok(()),
        Err(e) => Err(e),
    }
}

/// Removes a member from a group, tolerating "not a member".
pub async fn remove_from_group_tolerate_absent(
    session: &Session,
    path: &str,
    not_member_code: i64,
) -> Result<(), ArrayError> {
    match session.delete(path, None).await {
        Ok(_) => Ok(()),
        Err(ArrayError::Application { code, .. }) if code == not_member_code => Ok(()),
        Err(e) => Err(e),
    }
}

/// Adds the session's vStore ID to a body, when scoped to a non-system
/// vStore.
pub async fn with_vstore(session: &Session, mut body: Value) -> Value {
    if let Some(vstore_id) = session.vstore_id().await {
        body["vstoreId"] = json!(vstore_id);
    }
    body
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Discards the response body when only success/failure matters.
pub fn ignore(_env: Envelope) {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cfg::config::{BackendIdentity, Config, ManagementConfig, Redacted, RuntimeConfig};

    #[test]
    fn urlencode_escapes_reserved_characters() {
        assert_eq!(urlencode("my vol/1"), "my%20vol%2F1");
        assert_eq!(urlencode("plain-name_1.ok"), "plain-name_1.ok");
    }

    fn session_scoped_to(vstore_name: Option<&str>) -> Session {
        let cfg = Config {
            management: ManagementConfig {
                urls: vec!["https://10.0.0.1".to_string()],
                username: "admin".to_string(),
                password: Redacted::from("secret".to_string()),
                vstore_name: vstore_name.map(str::to_string),
            },
            backend: BackendIdentity {
                id: "b1".to_string(),
                storage_pool: "sp1".to_string(),
                remote_storage_pool: None,
                hypermetro_domain: None,
            },
            runtime: RuntimeConfig::default(),
        };
        Session::new(&cfg).unwrap()
    }

    #[test]
    fn vstore_matches_system_vstore_by_default() {
        let session = session_scoped_to(None);
        assert!(vstore_matches(&session, &json!({ "NAME": "a" })));
        assert!(vstore_matches(&session, &json!({ "NAME": "a", "vstoreName": "" })));
        assert!(!vstore_matches(
            &session,
            &json!({ "NAME": "a", "vstoreName": "tenant1" })
        ));
    }

    #[test]
    fn vstore_matches_configured_non_system_vstore() {
        let session = session_scoped_to(Some("tenant1"));
        assert!(vstore_matches(
            &session,
            &json!({ "NAME": "a", "vstoreName": "tenant1" })
        ));
        assert!(!vstore_matches(&session, &json!({ "NAME": "a" })));
        assert!(!vstore_matches(
            &session,
            &json!({ "NAME": "a", "vstoreName": "tenant2" })
        ));
    }
}
