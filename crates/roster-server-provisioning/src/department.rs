// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use roster_server_auth::Department;
use roster_server_db::{DbError, DepartmentStore};

use crate::error::ProvisioningError;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDepartment {
	pub department: Department,
	/// False when the department already existed, including when a concurrent
	/// request created it first.
	pub created: bool,
}

/// Find-or-create for departments, keyed by trimmed name.
#[derive(Clone)]
pub struct DepartmentResolver {
	departments: Arc<dyn DepartmentStore>,
}

impl DepartmentResolver {
	pub fn new(departments: Arc<dyn DepartmentStore>) -> Self {
		Self { departments }
	}

	pub async fn resolve(&self, name: &str) -> Result<Department> {
		Ok(self.resolve_with_status(name).await?.department)
	}

	/// Like [`resolve`](Self::resolve), also reporting whether this call
	/// created the department.
	#[tracing::instrument(skip(self), fields(name = %name.trim()))]
	pub async fn resolve_with_status(&self, name: &str) -> Result<ResolvedDepartment> {
		let name = name.trim();
		if name.is_empty() {
			return Err(ProvisioningError::InvalidRequest(
				"department name is empty".to_string(),
			));
		}

		if let Some(department) = self.departments.get_department_by_name(name).await? {
			return Ok(ResolvedDepartment {
				department,
				created: false,
			});
		}

		let department = Department::new(name);
		match self.departments.create_department(&department).await {
			Ok(()) => {
				tracing::info!(department_id = %department.id, "created department");
				Ok(ResolvedDepartment {
					department,
					created: true,
				})
			}
			Err(DbError::Conflict(_)) => {
				let existing = self
					.departments
					.get_department_by_name(name)
					.await?
					.ok_or_else(|| {
						ProvisioningError::UnresolvedConflict(format!(
							"department {name} conflicted but is missing"
						))
					})?;
				Ok(ResolvedDepartment {
					department: existing,
					created: false,
				})
			}
			Err(e) => Err(e.into()),
		}
	}
}
