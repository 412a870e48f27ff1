//! Volume-creation parameter bundle: a typed view plus untyped overflow over
//! the orchestrator-supplied key/value parameter map.

/// The parameter bundle, its typed getters, and derived strategy-selection
/// booleans.
pub mod bundle;

pub use bundle::{ParameterBundle, ParameterError, VolumeProtocol};
