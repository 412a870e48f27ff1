//! The array's `(error, data)` response envelope and the catalogue of
//! well-known error codes from §6 of the design.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::errors::ArrayError;

/// `{"error":{"code":<int>,"description":<string>}, "data":<object|array|null>}`
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub error: ErrorField,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct ErrorField {
    pub code: i64,
    #[serde(default)]
    pub description: String,
}

impl Envelope {
    /// `code == 0` is the only success code at the transport/envelope
    /// level; resource-API operations separately decide which non-zero
    /// codes are tolerable for their specific operation.
    pub fn is_success(&self) -> bool {
        self.error.code == 0
    }

    /// Deserializes `data` into `T`, mapping JSON errors to
    /// [`ArrayError::Decode`].
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ArrayError> {
        serde_json::from_value(self.data.clone()).map_err(ArrayError::Decode)
    }

    /// Deserializes `data` as a list of `T`. An absent or null `data` is
    /// treated as an empty list (the array omits `data` entirely on some
    /// empty list responses).
    pub fn data_as_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ArrayError> {
        if self.data.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(self.data.clone()).map_err(ArrayError::Decode)
    }

    /// Turns a non-zero envelope code into a typed [`ArrayError`], tagged
    /// with the operation name for diagnostics.
    pub fn application_error(&self, op: &str) -> ArrayError {
        match self.error.code {
            WRONG_PASSWORD | IP_LOCKED => ArrayError::PermanentAuthFailure {
                code: self.error.code,
                description: self.error.description.clone(),
            },
            AUTH_EXPIRED => ArrayError::AuthExpired,
            code => ArrayError::Application {
                op: op.to_string(),
                code,
                description: self.error.description.clone(),
            },
        }
    }
}

/// Application-level pseudo-code that signals the session token expired.
pub const AUTH_EXPIRED: i64 = -401;

pub const FILESYSTEM_NOT_EXIST: i64 = 1073752065;
pub const SHARE_NOT_EXIST: i64 = 1077939717;
pub const SHARE_PATH_INVALID: i64 = 1077939729;
pub const SHARE_ALREADY_EXIST: i64 = 1077939724;
pub const SHARE_PATH_ALREADY_EXIST: i64 = 1077940500;
pub const SYSTEM_BUSY: i64 = 1077949006;
pub const MSG_TIME_OUT: i64 = 1077949001;
pub const LUN_SNAPSHOT_NOT_EXIST: i64 = 1077937880;
pub const SNAPSHOT_NOT_ACTIVATED: i64 = 1077937891;
pub const CLONE_PAIR_NOT_EXIST: i64 = 1073798147;
pub const OBJECT_NOT_EXIST: i64 = 1077948996;
pub const OBJECT_ID_NOT_UNIQUE: i64 = 1077948997;
pub const OBJECT_NAME_ALREADY_EXIST: i64 = 1077948993;
pub const LUN_ALREADY_IN_GROUP: i64 = 1077936862;
pub const LUN_NOT_EXIST: i64 = 1077936859;
pub const HOST_ALREADY_IN_HOSTGROUP: i64 = 1077937501;
pub const HOST_NOT_IN_HOSTGROUP: i64 = 1073745412;
pub const HOST_NOT_EXIST: i64 = 1077937498;
pub const HOSTGROUP_NOT_EXIST: i64 = 1077937500;
pub const HOSTGROUP_NOT_IN_MAPPING: i64 = 1073804552;
pub const LUNGROUP_NOT_IN_MAPPING: i64 = 1073804554;
pub const HOSTGROUP_ALREADY_IN_MAPPING: i64 = 1073804556;
pub const LUNGROUP_ALREADY_IN_MAPPING: i64 = 1073804560;
pub const MAPPING_NOT_EXIST: i64 = 1077951819;
pub const HYPER_METRO_NOT_EXIST: i64 = 1077674242;
pub const LUN_COPY_NOT_EXIST: i64 = 1077950183;
pub const REPLICATION_NOT_EXIST: i64 = 1077937923;
pub const SNAPSHOT_PARENT_NOT_EXIST_V3: i64 = 1073754117;
pub const SNAPSHOT_PARENT_NOT_EXIST_V6: i64 = 1073754136;
pub const FS_SNAPSHOT_NOT_EXIST: i64 = 1073754118;
pub const EXCEED_FS_CAPACITY_UPPER: i64 = 1073844377;
pub const LESS_FS_CAPACITY_LOWER: i64 = 1073844376;
pub const WRONG_PASSWORD: i64 = 1077987870;
pub const IP_LOCKED: i64 = 1077949071;

/// True for the application codes that create-path operations should
/// recover from by polling `GetByName` instead of failing outright.
pub fn is_transient(code: i64) -> bool {
    matches!(code, SYSTEM_BUSY | MSG_TIME_OUT)
}
