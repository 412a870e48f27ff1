// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use array_csi_core::{
    api::create_volume_from_parameters,
    cfg::config::{BackendIdentity, Config, ManagementConfig, Redacted, RuntimeConfig},
    client::session::Session,
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

/// Scenario 1: a plain filesystem create with an `authclient` parameter
/// walks pool lookup, filesystem create, NFS share create, and
/// access-client grant, in that order, and returns a descriptor pointing
/// at the created filesystem.
#[tokio::test]
async fn plain_create_grants_auth_client() {
    let array = FakeArray::start(vec![
        login_ok(),
        // GetPoolByName("sp1")
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "pool-1",
                "NAME": "sp1",
                "USERFREECAPACITY": "999999999999",
                "RUNNINGSTATUS": "27",
            }],
        })),
        // POST /filesystem
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": {
                "ID": "fs-1",
                "NAME": "pvc_a",
                "CAPACITY": "1073741824",
                "PARENTID": "pool-1",
            },
        })),
        // GetByName (filesystem) before creating the share
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "fs-1",
                "NAME": "pvc_a",
                "CAPACITY": "1073741824",
                "PARENTID": "pool-1",
            }],
        })),
        // POST /NFSSHARE
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": { "ID": "share-1", "FSID": "fs-1", "SHAREPATH": "/pvc_a/" },
        })),
        // GetNfsShareByPath before granting access
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{ "ID": "share-1", "FSID": "fs-1", "SHAREPATH": "/pvc_a/" }],
        })),
        // POST /NFS_SHARE_AUTH_CLIENT
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": { "ID": "client-1", "NAME": "10.0.0.0/24" },
        })),
        // Final GetByName (filesystem) after commit, to build the descriptor
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "fs-1",
                "NAME": "pvc_a",
                "CAPACITY": "1073741824",
                "PARENTID": "pool-1",
            }],
        })),
    ])
    .await;

    let cfg = config_for(array.base_url());
    let session = Session::new(&cfg).unwrap();
    session.login().await.expect("login");

    let mut params = HashMap::new();
    params.insert("alloctype".to_string(), "1".to_string());
    params.insert("storagepool".to_string(), "sp1".to_string());
    params.insert("authclient".to_string(), "10.0.0.0/24".to_string());

    let volume = create_volume_from_parameters(
        "pvc_a",
        1_073_741_824,
        params,
        &cfg.backend,
        &session,
        None,
    )
    .await
    .expect("plain create should succeed");

    assert_eq!(volume.filesystem_id.as_deref(), Some("fs-1"));
    assert_eq!(volume.capacity_sectors, 1_073_741_824);

    array.stop();
}
