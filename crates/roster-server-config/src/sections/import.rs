// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk import configuration.

use roster_common_config::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ImportConfig {
	pub enabled: bool,
	/// Bearer token required on the bulk import endpoints.
	pub token: Option<SecretString>,
}

impl Default for ImportConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			token: None,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
}

impl ImportConfigLayer {
	pub fn merge(&mut self, other: ImportConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
	}

	pub fn finalize(self, token: Option<SecretString>) -> ImportConfig {
		ImportConfig {
			enabled: self.enabled.unwrap_or(true),
			token,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_enabled_by_default() {
		let config = ImportConfigLayer::default().finalize(None);
		assert!(config.enabled);
		assert!(config.token.is_none());
	}

	#[test]
	fn test_disabled() {
		let layer = ImportConfigLayer {
			enabled: Some(false),
		};
		assert!(!layer.finalize(None).enabled);
	}
}
