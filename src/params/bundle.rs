//! Typed access over the orchestrator's untyped volume-creation parameter
//! map, plus the derived booleans the volume-creator factory switches on.

use std::collections::HashMap;

use thiserror::Error;

const DEFAULT_ALLOC_TYPE: i64 = 1;
const DEFAULT_ALL_SQUASH: i64 = 1;
const DEFAULT_ROOT_SQUASH: i64 = 1;
const DEFAULT_CLONE_SPEED: i64 = 3;
const DEFAULT_ACCESS_KRB5: i64 = -1;

/// Which array object family a volume is provisioned as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeProtocol {
    /// A NAS filesystem, exported via NFS.
    Nas,
    /// A block LUN, mapped to a host via a mapping view.
    Block,
}

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter {0:?} has the wrong type")]
    WrongType(&'static str),
    #[error("parameter {0:?} is required but was not supplied")]
    Missing(&'static str),
    #[error("hyperMetro and replication cannot both be requested for the same volume")]
    HyperMetroReplicationConflict,
}

/// A parsed volume-creation parameter set.
///
/// Construction never fails on unknown keys: anything not recognized by a
/// typed getter stays in `raw` and is available via [`ParameterBundle::raw`]
/// for resource-API modules that pass orchestrator-supplied extras straight
/// through (export options, QoS policy names, and similar).
#[derive(Debug, Clone)]
pub struct ParameterBundle {
    raw: HashMap<String, String>,
}

impl ParameterBundle {
    pub fn new(raw: HashMap<String, String>) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &HashMap<String, String> {
        &self.raw
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    fn get_required(&self, key: &'static str) -> Result<&str, ParameterError> {
        self.get(key).ok_or(ParameterError::Missing(key))
    }

    /// `clonefrom`: the source filesystem/LUN name this volume is cloned
    /// from, when present.
    pub fn clone_from(&self) -> Option<&str> {
        self.get("clonefrom")
    }

    /// `fromSnapshot`: the snapshot this volume is created from.
    pub fn source_snapshot_name(&self) -> Option<&str> {
        self.get("fromSnapshot")
    }

    /// `hypermetro`: whether this volume should be provisioned as a
    /// HyperMetro pair.
    pub fn hyper_metro_requested(&self) -> bool {
        self.get_bool("hypermetro").unwrap_or(false)
    }

    /// `replication`: whether this volume should be provisioned with
    /// asynchronous replication.
    pub fn replication_requested(&self) -> bool {
        self.get_bool("replication").unwrap_or(false)
    }

    /// `ModifyVolume`: whether this call modifies an existing volume in
    /// place rather than creating one.
    pub fn modify_volume_requested(&self) -> bool {
        self.get_bool("ModifyVolume").unwrap_or(false)
    }

    /// Orchestrator override to skip NFS share and QoS provisioning on an
    /// otherwise-plain filesystem volume.
    pub fn skip_nfs_share_and_qos(&self) -> bool {
        self.get_bool("skipNfsShareAndQos").unwrap_or(false)
    }

    /// `alloctype`, NAS thin/thick provisioning mode. Default `1` (thin).
    pub fn alloc_type(&self) -> i64 {
        self.get("alloctype")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ALLOC_TYPE)
    }

    /// `allsquash`. Default `1`.
    pub fn all_squash(&self) -> i64 {
        self.get("allsquash")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ALL_SQUASH)
    }

    /// `rootsquash`. Default `1`.
    pub fn root_squash(&self) -> i64 {
        self.get("rootsquash")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ROOT_SQUASH)
    }

    /// `clonespeed`, 1 (low) through 4 (highest). Default `3`.
    pub fn clone_speed(&self) -> i64 {
        self.get("clonespeed")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CLONE_SPEED)
    }

    /// Maps one of the four `accessKrb5*` symbolic parameters (`none`,
    /// `integrity`, `privacy`) to the array's numeric encoding. Unset or
    /// unrecognized values default to `-1` (not configured).
    fn access_krb5(&self, key: &str) -> i64 {
        match self.get(key) {
            Some("none") => 0,
            Some("integrity") => 1,
            Some("privacy") => 2,
            _ => DEFAULT_ACCESS_KRB5,
        }
    }

    pub fn access_krb5_ro(&self) -> i64 {
        self.access_krb5("accessKrb5Ro")
    }

    pub fn access_krb5_rw(&self) -> i64 {
        self.access_krb5("accessKrb5Rw")
    }

    pub fn access_krb5i_ro(&self) -> i64 {
        self.access_krb5("accessKrb5iRo")
    }

    pub fn access_krb5i_rw(&self) -> i64 {
        self.access_krb5("accessKrb5iRw")
    }

    pub fn access_krb5p_ro(&self) -> i64 {
        self.access_krb5("accessKrb5pRo")
    }

    pub fn access_krb5p_rw(&self) -> i64 {
        self.access_krb5("accessKrb5pRw")
    }

    /// `qos`: a raw QoS policy name/spec passed through to the QoS
    /// resource-API module untouched.
    pub fn qos_policy(&self) -> Option<&str> {
        self.get("qos")
    }

    /// `splitclone`: whether a cloned filesystem should be split from its
    /// source once the clone finishes. Default `true`.
    pub fn split_clone_requested(&self) -> bool {
        self.get_bool("splitclone").unwrap_or(true)
    }

    /// `authclient`: the client name/CIDR granted access to a newly created
    /// NFS share. Absent when the orchestrator doesn't request an access
    /// rule (e.g. `IsSkipNfsShareAndQos`).
    pub fn auth_client(&self) -> Option<&str> {
        self.get("authclient")
    }

    /// `accessval`: the NFS access level granted to `authclient`, `0`
    /// (read-only) or `1` (read-write). Default `1`.
    pub fn access_val(&self) -> i64 {
        self.get("accessval").and_then(|v| v.parse().ok()).unwrap_or(1)
    }

    /// `storagepool`: explicit pool override; falls back to the backend's
    /// configured default pool when absent.
    pub fn storage_pool(&self) -> Option<&str> {
        self.get("storagepool")
    }

    /// `volumeType`: `"block"` selects LUN provisioning; anything else
    /// (including unset) defaults to NAS filesystem provisioning.
    pub fn volume_protocol(&self) -> VolumeProtocol {
        match self.get("volumeType") {
            Some("block") => VolumeProtocol::Block,
            _ => VolumeProtocol::Nas,
        }
    }

    pub fn required_storage_pool(&self) -> Result<&str, ParameterError> {
        self.get_required("storagepool")
    }

    /// Whether this volume is a clone (of either a filesystem or a
    /// snapshot taken as a clone source).
    pub fn is_clone(&self) -> bool {
        self.clone_from().is_some()
    }

    /// Whether this volume is created directly from a snapshot (not via
    /// `cloneFrom`).
    pub fn is_snapshot(&self) -> bool {
        self.source_snapshot_name().is_some()
    }

    pub fn is_hyper_metro(&self) -> bool {
        self.hyper_metro_requested()
    }

    pub fn is_replication(&self) -> bool {
        self.replication_requested()
    }

    pub fn is_modify_volume(&self) -> bool {
        self.modify_volume_requested()
    }

    pub fn is_skip_nfs_share_and_qos(&self) -> bool {
        self.skip_nfs_share_and_qos()
    }

    /// Validates cross-field invariants that must hold before any network
    /// I/O is attempted.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.is_hyper_metro() && self.is_replication() {
            return Err(ParameterError::HyperMetroReplicationConflict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(pairs: &[(&str, &str)]) -> ParameterBundle {
        ParameterBundle::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_apply_when_unset() {
        let b = bundle(&[]);
        assert_eq!(b.alloc_type(), 1);
        assert_eq!(b.all_squash(), 1);
        assert_eq!(b.root_squash(), 1);
        assert_eq!(b.clone_speed(), 3);
        assert_eq!(b.access_krb5_ro(), -1);
    }

    #[test]
    fn access_krb5_maps_symbolic_values() {
        let b = bundle(&[("accessKrb5Rw", "privacy"), ("accessKrb5Ro", "none")]);
        assert_eq!(b.access_krb5_rw(), 2);
        assert_eq!(b.access_krb5_ro(), 0);
    }

    #[test]
    fn auth_client_defaults_to_absent_with_full_access() {
        let b = bundle(&[]);
        assert_eq!(b.auth_client(), None);
        assert_eq!(b.access_val(), 1);
    }

    #[test]
    fn auth_client_and_access_val_read_through() {
        let b = bundle(&[("authclient", "10.0.0.0/24"), ("accessval", "0")]);
        assert_eq!(b.auth_client(), Some("10.0.0.0/24"));
        assert_eq!(b.access_val(), 0);
    }

    #[test]
    fn derived_booleans_reflect_presence() {
        let b = bundle(&[("clonefrom", "fs1")]);
        assert!(b.is_clone());
        assert!(!b.is_snapshot());
    }

    #[test]
    fn hyper_metro_and_replication_conflict_rejected() {
        let b = bundle(&[("hypermetro", "true"), ("replication", "true")]);
        assert!(matches!(
            b.validate(),
            Err(ParameterError::HyperMetroReplicationConflict)
        ));
    }

    #[test]
    fn hyper_metro_alone_is_valid() {
        let b = bundle(&[("hypermetro", "true")]);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn modify_volume_key_is_capitalized() {
        let b = bundle(&[("ModifyVolume", "true")]);
        assert!(b.is_modify_volume());
    }

    #[test]
    fn snapshot_key_is_from_snapshot() {
        let b = bundle(&[("fromSnapshot", "snap-1")]);
        assert!(b.is_snapshot());
        assert_eq!(b.source_snapshot_name(), Some("snap-1"));
    }

    #[test]
    fn split_clone_requested_defaults_true_and_reads_through() {
        assert!(bundle(&[]).split_clone_requested());
        assert!(!bundle(&[("splitclone", "false")]).split_clone_requested());
    }

    #[test]
    fn volume_protocol_defaults_to_nas() {
        assert_eq!(bundle(&[]).volume_protocol(), VolumeProtocol::Nas);
        assert_eq!(
            bundle(&[("volumeType", "block")]).volume_protocol(),
            VolumeProtocol::Block
        );
    }
}
