// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod api;

pub use api::{app, ApiError};
