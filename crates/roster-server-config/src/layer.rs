// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, ImportConfigLayer, LoggingConfigLayer,
	ProvisioningConfigLayer,
};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
	#[serde(default)]
	pub import: Option<ImportConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
		merge_option(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_option(
			&mut self.provisioning,
			other.provisioning,
			ProvisioningConfigLayer::merge,
		);
		merge_option(&mut self.import, other.import, ImportConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_other_keeps_base() {
		let mut base = ServerConfigLayer {
			auth: Some(AuthConfigLayer {
				allowed_email_domain: Some("company.com".to_string()),
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer::default());
		assert_eq!(
			base.auth.unwrap().allowed_email_domain.as_deref(),
			Some("company.com")
		);
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			provisioning: Some(ProvisioningConfigLayer {
				employee_id_prefix: Some("STAFF".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.provisioning.unwrap().employee_id_prefix.as_deref(),
			Some("STAFF")
		);
	}

	#[test]
	fn test_parse_toml_layer() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
[auth]
allowed_email_domain = "company.com"

[provisioning]
default_department = "Unassigned"
employee_id_width = 5

[import]
enabled = false
"#,
		)
		.unwrap();
		assert_eq!(
			layer.auth.unwrap().allowed_email_domain.as_deref(),
			Some("company.com")
		);
		let provisioning = layer.provisioning.unwrap();
		assert_eq!(provisioning.default_department.as_deref(), Some("Unassigned"));
		assert_eq!(provisioning.employee_id_width, Some(5));
		assert_eq!(layer.import.unwrap().enabled, Some(false));
		assert!(layer.http.is_none());
	}
}
