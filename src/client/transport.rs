//! Builds the [`reqwest::Client`] shared by a [`super::session::Session`].
//!
//! The array's management certificate is typically self-signed, so TLS
//! verification is disabled; the cookie jar is enabled because some array
//! firmwares pin session affinity via a `Set-Cookie` in addition to the
//! `iBaseToken` header.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub fn build_http_client(request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(true)
        .cookie_store(true)
        .timeout(request_timeout)
        .build()
        .context("failed to build HTTP client")
}
