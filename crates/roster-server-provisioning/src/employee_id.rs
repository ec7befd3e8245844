// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use roster_server_db::EmployeeStore;

use crate::{ProvisioningError, Result};

/// `EMP` + 4 → `EMP0042`. Sequences wider than `width` are not truncated.
pub fn format_employee_id(prefix: &str, width: usize, sequence: u64) -> String {
	format!("{prefix}{sequence:0width$}")
}

/// Produces candidate employee IDs.
///
/// Candidates are one past the highest existing sequence for the prefix. The
/// store's unique constraint is what guarantees uniqueness; callers retry with
/// a higher `attempt` when a candidate is taken.
#[derive(Clone)]
pub struct EmployeeIdGenerator {
	employees: Arc<dyn EmployeeStore>,
	prefix: String,
	width: usize,
}

impl EmployeeIdGenerator {
	pub fn new(employees: Arc<dyn EmployeeStore>, prefix: impl Into<String>, width: usize) -> Self {
		Self {
			employees,
			prefix: prefix.into(),
			width,
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Candidate for the given zero-based attempt.
	#[tracing::instrument(skip(self), fields(prefix = %self.prefix))]
	pub async fn next(&self, attempt: u32) -> Result<String> {
		let max = self
			.employees
			.max_employee_sequence(&self.prefix)
			.await?
			.unwrap_or(0);
		let sequence = max
			.checked_add(1)
			.and_then(|next| next.checked_add(u64::from(attempt)))
			.ok_or_else(|| ProvisioningError::EmployeeIdSequenceOverflow {
				prefix: self.prefix.clone(),
			})?;
		Ok(format_employee_id(&self.prefix, self.width, sequence))
	}
}
