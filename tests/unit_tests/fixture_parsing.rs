// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Deserializes representative array JSON fixtures into the resource-API
//! types, independent of any network call.

use array_csi_core::client::envelope::Envelope;
use array_csi_core::resource::{filesystem::Filesystem, nfs_share::NfsShare, quota::Quota};

#[test]
fn deserializes_filesystem_list_envelope() {
    let raw = r#"{
        "error": { "code": 0, "description": "" },
        "data": [
            { "ID": "4", "NAME": "vol-a", "CAPACITY": "2097152", "PARENTID": "0" }
        ]
    }"#;
    let env: Envelope = serde_json::from_str(raw).unwrap();
    let list: Vec<Filesystem> = env.data_as_list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "4");
    assert_eq!(list[0].capacity, "2097152");
}

#[test]
fn deserializes_nfs_share_object_envelope() {
    let raw = r#"{
        "error": { "code": 0, "description": "" },
        "data": { "ID": "12", "FSID": "4", "SHAREPATH": "/vol-a/" }
    }"#;
    let env: Envelope = serde_json::from_str(raw).unwrap();
    let share: NfsShare = env.data_as().unwrap();
    assert_eq!(share.filesystem_id, "4");
    assert_eq!(share.share_path, "/vol-a/");
}

#[test]
fn deserializes_quota_object_envelope() {
    let raw = r#"{
        "error": { "code": 0, "description": "" },
        "data": { "ID": "9", "PARENTID": "4" }
    }"#;
    let env: Envelope = serde_json::from_str(raw).unwrap();
    let quota: Quota = env.data_as().unwrap();
    assert_eq!(quota.id, "9");
    assert_eq!(quota.parent_id, "4");
}

#[test]
fn missing_data_field_defaults_to_null() {
    let raw = r#"{ "error": { "code": 1077936859, "description": "lun not exist" } }"#;
    let env: Envelope = serde_json::from_str(raw).unwrap();
    assert!(env.data.is_null());
}
