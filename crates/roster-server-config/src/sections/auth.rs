// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-in gate configuration.

use roster_common_config::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
	/// Domain that sign-in emails must belong to. `None` disables the check;
	/// sentinel values are interpreted by the allowlist itself.
	pub allowed_email_domain: Option<String>,
	/// Shared secret the identity bridge presents when calling the sign-in
	/// endpoints. Without it those endpoints reject every request.
	pub callback_token: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub allowed_email_domain: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.allowed_email_domain.is_some() {
			self.allowed_email_domain = other.allowed_email_domain;
		}
	}

	pub fn finalize(self, callback_token: Option<SecretString>) -> AuthConfig {
		AuthConfig {
			allowed_email_domain: self
				.allowed_email_domain
				.map(|d| d.trim().to_string())
				.filter(|d| !d.is_empty()),
			callback_token,
		}
	}
}
