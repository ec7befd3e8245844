// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared-secret bearer authentication for machine-to-machine routes.

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};
use roster_common_config::SecretString;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::ServerError;

/// Expected token for one group of routes. With no token configured every
/// request is rejected.
#[derive(Clone)]
pub struct BearerToken {
	scope: &'static str,
	token: Option<SecretString>,
}

impl BearerToken {
	pub fn new(scope: &'static str, token: Option<SecretString>) -> Self {
		Self { scope, token }
	}

	fn verify(&self, presented: &str) -> bool {
		let Some(expected) = &self.token else {
			return false;
		};
		let expected = expected.expose().as_bytes();
		let presented = presented.as_bytes();
		expected.len() == presented.len() && bool::from(expected.ct_eq(presented))
	}
}

pub async fn bearer_auth_middleware(
	State(expected): State<BearerToken>,
	request: Request,
	next: Next,
) -> Response {
	if expected.token.is_none() {
		warn!(scope = expected.scope, "auth failed: no token configured");
		return ServerError::Unauthorized.into_response();
	}

	let token = request
		.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
		.map(str::trim);

	let Some(token) = token else {
		warn!(scope = expected.scope, "auth failed: missing or malformed Authorization header");
		return ServerError::Unauthorized.into_response();
	};

	if !expected.verify(token) {
		warn!(scope = expected.scope, "auth failed: invalid token");
		return ServerError::Unauthorized.into_response();
	}

	next.run(request).await
}
