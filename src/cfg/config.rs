// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Lower bound enforced on [`RuntimeConfig::max_client_threads`] (see §4.1 of
/// the design: the array's own session-concurrency limit is the real
/// constraint, this is just a sane floor).
pub const MIN_CONCURRENCY: u32 = 20;
/// Upper bound enforced on [`RuntimeConfig::max_client_threads`].
pub const MAX_CONCURRENCY: u32 = 1000;
/// Default admission-semaphore concurrency when unset.
pub const DEFAULT_CONCURRENCY: u32 = 50;

/// Top-level backend configuration: how to reach the array and how the
/// session client should behave once connected.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Array management endpoint and credentials.
    pub management: ManagementConfig,
    /// Backend identity and default placement.
    pub backend: BackendIdentity,
    /// Client runtime knobs (concurrency, timeouts, retry cadence).
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct ManagementConfig {
    /// Candidate base URLs, e.g. `https://10.0.0.1:8088`. Tried in order on
    /// login; on success the winning URL is rotated to the tail so the next
    /// login tries a fresh candidate first.
    pub urls: Vec<String>,
    /// Array management username.
    pub username: String,
    /// Array management password. Never logged or displayed.
    pub password: Redacted,
    /// Virtual store to scope the session to. `None` means the system
    /// vStore.
    #[serde(default)]
    pub vstore_name: Option<String>,
}

impl fmt::Debug for ManagementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementConfig")
            .field("urls", &self.urls)
            .field("username", &self.username)
            .field("password", &self.password)
            .field("vstore_name", &self.vstore_name)
            .finish()
    }
}

/// A string that never prints its contents via `Debug`/`Display`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Redacted(String);

impl Redacted {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Redacted(..)")
    }
}

impl From<String> for Redacted {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BackendIdentity {
    /// Backend identifier attached to log fields and returned volume
    /// metadata.
    pub id: String,
    /// Default storage pool used for local (or non-paired) provisioning.
    pub storage_pool: String,
    /// Storage pool used on the remote array for HyperMetro/replication
    /// pairing.
    #[serde(default)]
    pub remote_storage_pool: Option<String>,
    /// HyperMetro domain used when `hypermetro` is requested.
    #[serde(default)]
    pub hypermetro_domain: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RuntimeConfig {
    /// Bound on concurrent in-flight REST calls, clamped to
    /// `[MIN_CONCURRENCY, MAX_CONCURRENCY]`.
    #[serde(default = "default_concurrency")]
    pub max_client_threads: u32,
    /// Per-request timeout, used as the transport-level backstop.
    #[serde(default = "default_request_timeout", with = "serde_secs")]
    pub request_timeout: Duration,
    /// Number of `GetByName` polls attempted to recover an object after a
    /// system-busy / message-timeout response on a create path.
    #[serde(default = "default_system_busy_retries")]
    pub system_busy_retries: u32,
    /// Delay between system-busy recovery polls.
    #[serde(default = "default_system_busy_retry_interval", with = "serde_secs")]
    pub system_busy_retry_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_client_threads: default_concurrency(),
            request_timeout: default_request_timeout(),
            system_busy_retries: default_system_busy_retries(),
            system_busy_retry_interval: default_system_busy_retry_interval(),
        }
    }
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_system_busy_retries() -> u32 {
    10
}

fn default_system_busy_retry_interval() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(
            !self.management.urls.is_empty(),
            "management.urls must not be empty"
        );
        ensure!(
            !self.management.username.is_empty(),
            "management.username must not be empty"
        );
        ensure!(!self.backend.id.is_empty(), "backend.id must not be empty");
        ensure!(
            !self.backend.storage_pool.is_empty(),
            "backend.storage_pool must not be empty"
        );

        let clamped = self
            .runtime
            .max_client_threads
            .clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);
        if clamped != self.runtime.max_client_threads {
            tracing::warn!(
                configured = self.runtime.max_client_threads,
                clamped,
                "runtime.max_client_threads out of range, clamping"
            );
            self.runtime.max_client_threads = clamped;
        }

        Ok(())
    }
}

/// Serde helper for representing `Duration` as a number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
management:
  urls:
    - "https://10.0.0.1:8088"
    - "https://10.0.0.2:8088"
  username: admin
  password: secret
backend:
  id: backend-1
  storage_pool: sp1
"#
    }

    #[test]
    fn loads_defaults_for_runtime() {
        let mut cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        cfg.validate_and_normalize().unwrap();
        assert_eq!(cfg.runtime.max_client_threads, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.runtime.request_timeout, Duration::from_secs(60));
        assert_eq!(cfg.runtime.system_busy_retries, 10);
    }

    #[test]
    fn clamps_out_of_range_concurrency() {
        let mut cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        cfg.runtime.max_client_threads = 5;
        cfg.validate_and_normalize().unwrap();
        assert_eq!(cfg.runtime.max_client_threads, MIN_CONCURRENCY);

        cfg.runtime.max_client_threads = 5000;
        cfg.validate_and_normalize().unwrap();
        assert_eq!(cfg.runtime.max_client_threads, MAX_CONCURRENCY);
    }

    #[test]
    fn rejects_empty_urls() {
        let mut cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        cfg.management.urls.clear();
        assert!(cfg.validate_and_normalize().is_err());
    }

    #[test]
    fn redacted_debug_never_prints_secret() {
        let cfg: Config = serde_yaml::from_str(sample_yaml()).unwrap();
        let rendered = format!("{:?}", cfg.management);
        assert!(!rendered.contains("secret"));
    }
}
