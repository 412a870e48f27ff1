// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// The `(error, data)` response envelope and well-known error codes.
pub mod envelope;
/// Admission-control semaphore.
pub mod semaphore;
/// Session login/relogin/URL-failover and the `Call` primitives.
pub mod session;
/// `reqwest::Client` construction.
pub mod transport;

pub use session::Session;
