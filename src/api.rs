//! The crate's single public entry point: takes a volume name, requested
//! capacity, and orchestrator parameter map, validates them, picks a
//! provisioning strategy, and runs it against one or two array sessions.

use std::collections::HashMap;

use anyhow::{Context, Result, ensure};

use crate::{
    cfg::config::BackendIdentity,
    client::session::Session,
    params::ParameterBundle,
    volume::{VolumeCreateContext, VolumeDescriptor, select_strategy},
};
use crate::volume::CreateVolume;

/// Creates (or, for `ModifyVolume`, updates) a volume per `raw_params`.
///
/// `standby` is required when `raw_params` requests `hypermetro` or
/// `replication`, and ignored otherwise.
pub async fn create_volume_from_parameters(
    volume_name: &str,
    capacity_sectors: u64,
    raw_params: HashMap<String, String>,
    backend: &BackendIdentity,
    active: &Session,
    standby: Option<&Session>,
) -> Result<VolumeDescriptor> {
    ensure!(!volume_name.is_empty(), "volume name must not be empty");
    ensure!(capacity_sectors > 0, "capacity_sectors must be greater than zero");

    let params = ParameterBundle::new(raw_params);
    params
        .validate()
        .context("validating volume creation parameters")?;

    let ctx = VolumeCreateContext {
        volume_name,
        capacity_sectors,
        params: &params,
        backend,
        active,
        standby,
    };

    let strategy = select_strategy(&params);
    strategy
        .create_volume(&ctx)
        .await
        .with_context(|| format!("creating volume {volume_name:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_name() {
        let backend = BackendIdentity {
            id: "b1".to_string(),
            storage_pool: "sp1".to_string(),
            remote_storage_pool: None,
            hypermetro_domain: None,
        };
        let cfg = crate::cfg::config::Config {
            management: crate::cfg::config::ManagementConfig {
                urls: vec!["https://10.0.0.1".to_string()],
                username: "admin".to_string(),
                password: "secret".to_string().into(),
                vstore_name: None,
            },
            backend: backend.clone(),
            runtime: Default::default(),
        };
        let session = Session::new(&cfg).unwrap();
        let result = create_volume_from_parameters(
            "",
            1024,
            HashMap::new(),
            &backend,
            &session,
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_zero_capacity() {
        let backend = BackendIdentity {
            id: "b1".to_string(),
            storage_pool: "sp1".to_string(),
            remote_storage_pool: None,
            hypermetro_domain: None,
        };
        let cfg = crate::cfg::config::Config {
            management: crate::cfg::config::ManagementConfig {
                urls: vec!["https://10.0.0.1".to_string()],
                username: "admin".to_string(),
                password: "secret".to_string().into(),
                vstore_name: None,
            },
            backend: backend.clone(),
            runtime: Default::default(),
        };
        let session = Session::new(&cfg).unwrap();
        let result = create_volume_from_parameters(
            "vol1",
            0,
            HashMap::new(),
            &backend,
            &session,
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_hypermetro_and_replication_together() {
        let backend = BackendIdentity {
            id: "b1".to_string(),
            storage_pool: "sp1".to_string(),
            remote_storage_pool: None,
            hypermetro_domain: None,
        };
        let cfg = crate::cfg::config::Config {
            management: crate::cfg::config::ManagementConfig {
                urls: vec!["https://10.0.0.1".to_string()],
                username: "admin".to_string(),
                password: "secret".to_string().into(),
                vstore_name: None,
            },
            backend: backend.clone(),
            runtime: Default::default(),
        };
        let session = Session::new(&cfg).unwrap();
        let mut params = HashMap::new();
        params.insert("hypermetro".to_string(), "true".to_string());
        params.insert("replication".to_string(), "true".to_string());
        let result =
            create_volume_from_parameters("vol1", 1024, params, &backend, &session, None).await;
        assert!(result.is_err());
    }
}
