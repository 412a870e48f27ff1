// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use array_csi_core::{
    cfg::config::{BackendIdentity, Config, ManagementConfig, Redacted, RuntimeConfig},
    client::session::Session,
    params::ParameterBundle,
    volume::{CreateVolume, VolumeCreateContext, select_strategy},
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
            hypermetro_domain: Some("domain-1".to_string()),
        },
        runtime: RuntimeConfig::default(),
    }
}

/// Scenario 6: calling the modify path against a filesystem that already
/// has a HyperMetro pair performs a filesystem lookup and a pair lookup,
/// then returns the original volume without creating anything.
#[tokio::test]
async fn modify_volume_is_a_noop_when_already_paired() {
    let array = FakeArray::start(vec![
        login_ok(),
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "fs-1",
                "NAME": "pvc_b",
                "CAPACITY": "1073741824",
                "PARENTID": "pool-1",
            }],
        })),
        ScriptedResponse::ok(json!({
            "error": { "code": 0, "description": "" },
            "data": [{
                "ID": "pair-1",
                "HEALTHSTATUS": "1",
                "RUNNINGSTATUS": "1",
            }],
        })),
    ])
    .await;

    let cfg = config_for(array.base_url());
    let session = Session::new(&cfg).unwrap();
    session.login().await.expect("login");

    let mut raw = HashMap::new();
    raw.insert("ModifyVolume".to_string(), "true".to_string());
    let params = ParameterBundle::new(raw);
    assert!(params.is_modify_volume());

    let ctx = VolumeCreateContext {
        volume_name: "pvc_b",
        capacity_sectors: 1_073_741_824,
        params: &params,
        backend: &cfg.backend,
        active: &session,
        standby: None,
    };

    let volume = select_strategy(&params)
        .create_volume(&ctx)
        .await
        .expect("modify should be a no-op, not an error, when already paired");

    assert_eq!(volume.filesystem_id.as_deref(), Some("fs-1"));
    assert_eq!(volume.capacity_sectors, 1_073_741_824);

    array.stop();
}
