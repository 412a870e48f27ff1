//! The storage-array session client: login/relogin, URL failover, and the
//! `Call`/`Get`/`Post`/`Put`/`Delete` primitives every resource-API module
//! is built on.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::{
    cfg::config::{Config, Redacted},
    client::{envelope::Envelope, semaphore::Admission, transport::build_http_client},
    errors::ArrayError,
};

/// Mutable session state established by login and refreshed by relogin.
#[derive(Debug, Clone, Default)]
struct Credentials {
    base_url: String,
    token: String,
    device_id: String,
    vstore_id: Option<String>,
}

/// A logged-in handle to one storage array's REST management API.
///
/// Cloning a `Session` is cheap: it shares the underlying HTTP client,
/// admission semaphore, and credential state with the original.
#[derive(Clone)]
pub struct Session {
    backend_id: String,
    http: Client,
    admission: Admission,
    urls: Arc<RwLock<Vec<String>>>,
    username: String,
    password: Redacted,
    vstore_name: Option<String>,
    creds: Arc<RwLock<Credentials>>,
    relogin_lock: Arc<Mutex<()>>,
    system_busy_retries: u32,
    system_busy_retry_interval: std::time::Duration,
    offline: Arc<AtomicBool>,
}

impl Session {
    /// Builds an un-authenticated client. Call [`Session::login`] before
    /// issuing any resource-API calls.
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = build_http_client(cfg.runtime.request_timeout)?;
        Ok(Self {
            backend_id: cfg.backend.id.clone(),
            http,
            admission: Admission::new(&cfg.runtime),
            urls: Arc::new(RwLock::new(cfg.management.urls.clone())),
            username: cfg.management.username.clone(),
            password: cfg.management.password.clone(),
            vstore_name: cfg.management.vstore_name.clone(),
            creds: Arc::new(RwLock::new(Credentials::default())),
            relogin_lock: Arc::new(Mutex::new(())),
            system_busy_retries: cfg.runtime.system_busy_retries,
            system_busy_retry_interval: cfg.runtime.system_busy_retry_interval,
            offline: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::Acquire)
    }

    /// Logs in against the first candidate URL that accepts the
    /// credentials. On success that URL is rotated to the tail of the
    /// candidate list so the next independent login attempt (e.g. after a
    /// process restart against the same config) tries a different
    /// candidate first.
    #[instrument(skip(self), fields(backend = %self.backend_id))]
    pub async fn login(&self) -> Result<(), ArrayError> {
        if self.is_offline() {
            return Err(ArrayError::BackendOffline(self.backend_id.clone()));
        }

        let candidates = self.urls.read().await.clone();
        let mut last_err = None;
        for (idx, base_url) in candidates.iter().enumerate() {
            match self.try_login_at(base_url).await {
                Ok(creds) => {
                    *self.creds.write().await = creds;
                    self.rotate_url_to_tail(idx).await;
                    info!(base_url, "logged in to array");
                    return Ok(());
                }
                Err(ArrayError::PermanentAuthFailure { code, description }) => {
                    self.offline.store(true, Ordering::Release);
                    return Err(ArrayError::PermanentAuthFailure { code, description });
                }
                Err(e) => {
                    warn!(base_url, error = %e, "login attempt failed, trying next candidate");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(ArrayError::Validation(
            "no management URLs configured".to_string(),
        )))
    }

    async fn try_login_at(&self, base_url: &str) -> Result<Credentials, ArrayError> {
        let mut body = json!({
            "username": self.username,
            "password": self.password.expose(),
            "scope": 0,
        });
        if let Some(vstore) = &self.vstore_name {
            body["vstorename"] = json!(vstore);
        }

        let url = format!("{base_url}/deviceManager/rest/xx/sessions");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ArrayError::Transport)?;
        let env: Envelope = resp.json().await.map_err(ArrayError::Decode)?;
        if !env.is_success() {
            return Err(env.application_error("login"));
        }

        let data = env.data_as::<Value>()?;
        let device_id = data["deviceid"]
            .as_str()
            .ok_or_else(|| {
                ArrayError::Validation("login response missing deviceid".to_string())
            })?
            .to_string();
        let token = data["iBaseToken"]
            .as_str()
            .ok_or_else(|| {
                ArrayError::Validation("login response missing iBaseToken".to_string())
            })?
            .to_string();
        let vstore_id = data["vstoreId"].as_str().map(str::to_string);

        Ok(Credentials {
            base_url: base_url.to_string(),
            token,
            device_id,
            vstore_id,
        })
    }

    async fn rotate_url_to_tail(&self, winning_idx: usize) {
        let mut urls = self.urls.write().await;
        if winning_idx < urls.len() {
            let url = urls.remove(winning_idx);
            urls.push(url);
        }
    }

    /// Double-checked-locking relogin: only one caller actually performs
    /// the login round trip; callers that arrive while another relogin is
    /// in flight simply wait for the lock and then observe the refreshed
    /// token without repeating the work.
    async fn relogin(&self, token_before: &str) -> Result<(), ArrayError> {
        let _guard = self.relogin_lock.lock().await;
        if self.creds.read().await.token != token_before {
            debug!("relogin already performed by another caller");
            return Ok(());
        }
        self.login().await
    }

    /// Best-effort logout. Failures are logged, not propagated: a failed
    /// logout must never block shutdown.
    #[instrument(skip(self), fields(backend = %self.backend_id))]
    pub async fn logout(&self) {
        let creds = self.creds.read().await.clone();
        if creds.token.is_empty() {
            return;
        }
        let url = format!(
            "{}/deviceManager/rest/{}/sessions",
            creds.base_url, creds.device_id
        );
        let _permit = self.admission.acquire().await;
        let result = self
            .http
            .delete(&url)
            .header("iBaseToken", &creds.token)
            .send()
            .await;
        if let Err(e) = result {
            warn!(error = %e, "logout request failed, ignoring");
        }
    }

    /// Issues one REST call, transparently handling relogin-and-retry on
    /// auth expiry or transport failure. `path` is relative to
    /// `/deviceManager/rest/<device-id>`.
    #[instrument(skip(self, body), fields(backend = %self.backend_id, %path))]
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Envelope, ArrayError> {
        if self.is_offline() {
            return Err(ArrayError::BackendOffline(self.backend_id.clone()));
        }

        let _permit = self.admission.acquire().await;
        match self.call_once(method.clone(), path, body.clone()).await {
            Ok(env) => Ok(env),
            Err(e) if e.triggers_relogin() => {
                let token_before = self.creds.read().await.token.clone();
                self.relogin(&token_before).await?;
                self.call_once(method, path, body).await
            }
            Err(e) => Err(e),
        }
    }

    async fn call_once(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Envelope, ArrayError> {
        let creds = self.creds.read().await.clone();
        let url = format!(
            "{}/deviceManager/rest/{}{}",
            creds.base_url, creds.device_id, path
        );
        let mut req = self.http.request(method, &url).header("iBaseToken", &creds.token);
        if let Some(b) = body {
            req = req.json(&b);
        }
        let resp = req.send().await.map_err(ArrayError::Transport)?;
        let env: Envelope = resp.json().await.map_err(ArrayError::Decode)?;
        if !env.is_success() {
            return Err(env.application_error(path));
        }
        Ok(env)
    }

    pub async fn get(&self, path: &str) -> Result<Envelope, ArrayError> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Envelope, ArrayError> {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Envelope, ArrayError> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> Result<Envelope, ArrayError> {
        self.call(Method::DELETE, path, body).await
    }

    /// The vStore ID resolved at login, if the session is scoped to a
    /// non-system vStore.
    pub async fn vstore_id(&self) -> Option<String> {
        self.creds.read().await.vstore_id.clone()
    }

    /// The configured vStore name, if the session is scoped to a
    /// non-system vStore. Unlike [`Session::vstore_id`], this is known
    /// from configuration before login and never requires an await.
    pub fn vstore_name(&self) -> Option<&str> {
        self.vstore_name.as_deref()
    }

    pub fn system_busy_retries(&self) -> u32 {
        self.system_busy_retries
    }

    pub fn system_busy_retry_interval(&self) -> std::time::Duration {
        self.system_busy_retry_interval
    }
}

/// Convenience for call sites that want a single `anyhow` error chain
/// rather than matching on [`ArrayError`] directly.
pub trait ArrayErrorContext<T> {
    fn op_context(self, op: &str) -> Result<T>;
}

impl<T> ArrayErrorContext<T> for Result<T, ArrayError> {
    fn op_context(self, op: &str) -> Result<T> {
        self.map_err(|e| anyhow::Error::new(e).context(op.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::config::{BackendIdentity, ManagementConfig, RuntimeConfig};

    fn test_config(urls: Vec<&str>) -> Config {
        Config {
            management: ManagementConfig {
                urls: urls.into_iter().map(str::to_string).collect(),
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

    #[tokio::test]
    async fn new_session_starts_online_and_unauthenticated() {
        let cfg = test_config(vec!["https://10.0.0.1:8088"]);
        let session = Session::new(&cfg).unwrap();
        assert!(!session.is_offline());
        assert!(session.vstore_id().await.is_none());
    }

    #[tokio::test]
    async fn rotate_url_to_tail_moves_winner_to_back() {
        let cfg = test_config(vec![
            "https://10.0.0.1:8088",
            "https://10.0.0.2:8088",
            "https://10.0.0.3:8088",
        ]);
        let session = Session::new(&cfg).unwrap();
        session.rotate_url_to_tail(1).await;
        let urls = session.urls.read().await.clone();
        assert_eq!(
            urls,
            vec![
                "https://10.0.0.1:8088".to_string(),
                "https://10.0.0.3:8088".to_string(),
                "https://10.0.0.2:8088".to_string(),
            ]
        );
    }
}
