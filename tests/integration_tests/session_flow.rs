// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use array_csi_core::{
    cfg::config::{BackendIdentity, Config, ManagementConfig, Redacted, RuntimeConfig},
    client::session::Session,
};
use serde_json::json;

use crate::support::fake_array::{FakeArray, ScriptedResponse};

fn login_ok(device_id: &str, token: &str) -> ScriptedResponse {
    ScriptedResponse::ok(json!({
        "error": { "code": 0, "description": "" },
        "data": { "deviceid": device_id, "iBaseToken": token },
    }))
}

fn config_for(urls: Vec<String>) -> Config {
    Config {
        management: ManagementConfig {
            urls,
            username: "admin".to_string(),
            password: Redacted::from("secret".to_string()),
            vstore_name: None,
        },
        backend: BackendIdentity {
            id: "backend-1".to_string(),
            storage_pool: "sp1".to_string(),
            remote_storage_pool: None,
            hypermetro_domain: None,
        },
        runtime: RuntimeConfig::default(),
    }
}

/// A dead first candidate URL (nothing listening) must fail over to the
/// second, live one, and the winning URL ends up at the tail of the list.
#[tokio::test]
async fn login_fails_over_to_next_candidate_url() {
    let array = FakeArray::start(vec![login_ok("dev-1", "token-1")]).await;

    let dead_url = "http://127.0.0.1:1".to_string();
    let cfg = config_for(vec![dead_url.clone(), array.base_url().to_string()]);
    let session = Session::new(&cfg).unwrap();

    session.login().await.expect("login should fail over to the live candidate");
    assert!(!session.is_offline());

    array.stop();
}

/// A call that comes back `AUTH_EXPIRED` triggers one relogin-and-retry,
/// transparent to the caller.
#[tokio::test]
async fn auth_expired_triggers_relogin_and_retry() {
    let array = FakeArray::start(vec![
        login_ok("dev-1", "token-1"),
        ScriptedResponse::ok(json!({
            "error": { "code": -401, "description": "auth expired" },
        })),
        login_ok("dev-1", "token-2"),
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": { "ID": "fs-1" },
        })),
    ])
    .await;

    let cfg = config_for(vec![array.base_url().to_string()]);
    let session = Session::new(&cfg).unwrap();
    session.login().await.expect("initial login");

    let env = session
        .get("/filesystem/fs-1")
        .await
        .expect("call should survive one auth-expired relogin cycle");
    assert_eq!(env.data["ID"], "fs-1");

    array.stop();
}

/// A wrong-password response marks the backend permanently offline; no
/// further candidate URLs are tried and subsequent calls are rejected
/// without touching the network.
#[tokio::test]
async fn permanent_auth_failure_marks_backend_offline() {
    let array = FakeArray::start(vec![ScriptedResponse::ok(json!({
        "error": { "code": 1077987870, "description": "wrong password" },
    }))])
    .await;

    let cfg = config_for(vec![array.base_url().to_string()]);
    let session = Session::new(&cfg).unwrap();

    let result = session.login().await;
    assert!(result.is_err());
    assert!(session.is_offline());

    let second = session.login().await;
    assert!(matches!(
        second,
        Err(array_csi_core::errors::ArrayError::BackendOffline(_))
    ));

    array.stop();
}
