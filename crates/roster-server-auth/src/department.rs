// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DepartmentId;

/// An organizational unit. Names are unique and departments are only ever
/// created lazily, never removed by provisioning or import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
	pub id: DepartmentId,
	pub name: String,
	pub description: Option<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Department {
	/// An active department named `name` (trimmed) with the stock description.
	pub fn new(name: &str) -> Self {
		let name = name.trim().to_string();
		let now = Utc::now();
		Self {
			id: DepartmentId::generate(),
			description: Some(format!("{name} department")),
			name,
			is_active: true,
			created_at: now,
			updated_at: now,
		}
	}
}
