// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Black-box integration tests driving a [`support::fake_array`] stand-in
//! for a real storage array, since this crate has no live array to test
//! against in CI.

#![allow(clippy::all)]

mod support {
    pub mod fake_array;
}

mod integration_tests {
    pub mod filesystem_create;
    pub mod modify_volume;
    pub mod plain_create;
    pub mod session_flow;
}
