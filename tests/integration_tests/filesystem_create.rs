// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use array_csi_core::{
    cfg::config::{BackendIdentity, Config, ManagementConfig, Redacted, RuntimeConfig},
    client::session::Session,
    resource::filesystem::{self, CreateFilesystem},
};
use serde_json::json;

use crate::support::fake_array::{FakeArray, ScriptedResponse};

fn login_ok() -> ScriptedResponse {
    ScriptedResponse::ok(json!({
        "error": { "code": 0, "description": "" },
        "data": { "deviceid": "dev-1", "iBaseToken": "token-1" },
    }))
}

fn config_for(base_url: &str) -> Config {
    Config {
        management: ManagementConfig {
            urls: vec![base_url.to_string()],
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

/// A create that races another caller and loses ("already exists") still
/// returns the object, looked up by name rather than propagating the
/// conflict to the caller.
#[tokio::test]
async fn create_tolerates_concurrent_already_exists() {
    let array = FakeArray::start(vec![
        login_ok(),
        ScriptedResponse::ok(json!({
            "error": { "code": 1077948993, "description": "object name already exists" },
        })),
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "fs-1",
                "NAME": "vol-1",
                "CAPACITY": "2097152",
                "PARENTID": "pool-1",
            }],
        })),
    ])
    .await;

    let cfg = config_for(array.base_url());
    let session = Session::new(&cfg).unwrap();
    session.login().await.expect("login");

    let fs = filesystem::create(
        &session,
        CreateFilesystem {
            name: "vol-1",
            pool_id: "pool-1",
            capacity_sectors: 2_097_152,
            alloc_type: 1,
        },
    )
    .await
    .expect("create should recover via GetByName after already-exists");

    assert_eq!(fs.id, "fs-1");
    assert_eq!(fs.name, "vol-1");

    array.stop();
}

/// A filesystem-not-exist response on delete is treated as success.
#[tokio::test]
async fn delete_tolerates_already_gone() {
    let array = FakeArray::start(vec![
        login_ok(),
        ScriptedResponse::ok(json!({
            "error": { "code": 1073752065, "description": "filesystem does not exist" },
        })),
    ])
    .await;

    let cfg = config_for(array.base_url());
    let session = Session::new(&cfg).unwrap();
    session.login().await.expect("login");

    filesystem::delete(&session, "fs-does-not-exist")
        .await
        .expect("delete should tolerate the object already being gone");

    array.stop();
}
