// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Roster HTTP server.
//!
//! Exposes sign-in and session refresh for the identity bridge, bulk import
//! endpoints for administrators, and a health check.

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use error::ServerError;
pub use roster_server_config::ServerConfig;
