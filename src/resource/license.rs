//! Feature license checks: HyperMetro, replication, and similar licensed
//! features gate their strategies on these before issuing any create call.

use anyhow::Result;
use serde::Deserialize;

use crate::{client::session::Session, errors::ArrayError};

#[derive(Debug, Clone, Deserialize)]
struct LicenseFeature {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "STATUS")]
    status: String,
}

/// `STATUS` value meaning the feature is licensed and enabled.
const STATUS_NORMAL: &str = "Normal";

pub async fn is_feature_enabled(session: &Session, feature_name: &str) -> Result<bool, ArrayError> {
    let env = session.get("/license/feature").await?;
    let features: Vec<LicenseFeature> = env.data_as_list()?;
    Ok(features
        .iter()
        .any(|f| f.name == feature_name && f.status == STATUS_NORMAL))
}

pub async fn require_feature(
    session: &Session,
    feature_name: &'static str,
) -> Result<(), ArrayError> {
    if is_feature_enabled(session, feature_name).await? {
        Ok(())
    } else {
        Err(ArrayError::Validation(format!(
            "required license feature {feature_name:?} is not enabled"
        )))
    }
}
