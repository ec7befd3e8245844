// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee provisioning defaults.

use serde::Deserialize;

const DEFAULT_DEPARTMENT: &str = "General";
const DEFAULT_EMPLOYEE_ID_PREFIX: &str = "EMP";
const DEFAULT_EMPLOYEE_ID_WIDTH: usize = 4;
const DEFAULT_EMPLOYEE_ID_MAX_ATTEMPTS: u32 = 5;

/// Settings applied when an employee record is created for a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningConfig {
	/// Department assigned to auto-provisioned employees.
	pub default_department: String,
	/// Employee identifiers are `{prefix}{sequence}`, e.g. `EMP0007`.
	pub employee_id_prefix: String,
	/// Minimum number of digits in the sequence part.
	pub employee_id_width: usize,
	/// Inserts attempted before giving up on identifier collisions.
	pub employee_id_max_attempts: u32,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		ProvisioningConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub default_department: Option<String>,
	#[serde(default)]
	pub employee_id_prefix: Option<String>,
	#[serde(default)]
	pub employee_id_width: Option<usize>,
	#[serde(default)]
	pub employee_id_max_attempts: Option<u32>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.default_department.is_some() {
			self.default_department = other.default_department;
		}
		if other.employee_id_prefix.is_some() {
			self.employee_id_prefix = other.employee_id_prefix;
		}
		if other.employee_id_width.is_some() {
			self.employee_id_width = other.employee_id_width;
		}
		if other.employee_id_max_attempts.is_some() {
			self.employee_id_max_attempts = other.employee_id_max_attempts;
		}
	}

	pub fn finalize(self) -> ProvisioningConfig {
		ProvisioningConfig {
			default_department: self
				.default_department
				.unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
			employee_id_prefix: self
				.employee_id_prefix
				.unwrap_or_else(|| DEFAULT_EMPLOYEE_ID_PREFIX.to_string()),
			employee_id_width: self.employee_id_width.unwrap_or(DEFAULT_EMPLOYEE_ID_WIDTH),
			employee_id_max_attempts: self
				.employee_id_max_attempts
				.unwrap_or(DEFAULT_EMPLOYEE_ID_MAX_ATTEMPTS),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ProvisioningConfig::default();
		assert_eq!(config.default_department, "General");
		assert_eq!(config.employee_id_prefix, "EMP");
		assert_eq!(config.employee_id_width, 4);
		assert_eq!(config.employee_id_max_attempts, 5);
	}

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base = ProvisioningConfigLayer {
			default_department: Some("Operations".to_string()),
			employee_id_width: Some(6),
			..Default::default()
		};
		base.merge(ProvisioningConfigLayer {
			employee_id_width: Some(5),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.default_department, "Operations");
		assert_eq!(config.employee_id_width, 5);
	}
}
