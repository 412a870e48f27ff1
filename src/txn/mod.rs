//! The ordered-step transaction engine volume creators build their
//! rollback safety net on.

pub mod engine;

pub use engine::Transaction;
