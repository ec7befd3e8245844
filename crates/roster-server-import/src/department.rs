// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_server_provisioning::{DepartmentResolver, ProvisioningError};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, RecordError, RecordErrorKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentImportReport {
	pub created: usize,
	pub skipped: usize,
	pub created_departments: Vec<String>,
	pub skipped_departments: Vec<String>,
	pub errors: Vec<RecordError>,
}

impl DepartmentImportReport {
	pub fn error_messages(&self) -> Vec<String> {
		self.errors.iter().map(ToString::to_string).collect()
	}
}

/// Accepts a JSON array of names or `{"departments": [...]}`.
pub fn parse_department_json(body: &[u8]) -> Result<Vec<String>, ImportError> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Payload {
		List(Vec<String>),
		Wrapped { departments: Vec<String> },
	}

	Ok(match serde_json::from_slice::<Payload>(body)? {
		Payload::List(names) | Payload::Wrapped { departments: names } => names,
	})
}

/// One name per line. Blank lines are dropped.
pub fn parse_department_lines(text: &str) -> Vec<String> {
	text.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect()
}

/// Creates departments from a flat list of names.
#[derive(Clone)]
pub struct DepartmentImporter {
	departments: DepartmentResolver,
}

impl DepartmentImporter {
	pub fn new(departments: DepartmentResolver) -> Self {
		Self { departments }
	}

	/// Names that already exist, including repeats within the batch, are
	/// reported as skipped.
	#[tracing::instrument(skip(self, names), fields(names = names.len()))]
	pub async fn import(&self, names: &[String]) -> Result<DepartmentImportReport, ImportError> {
		if names.is_empty() {
			return Err(ImportError::EmptyBatch);
		}

		let mut report = DepartmentImportReport::default();
		for (offset, raw) in names.iter().enumerate() {
			let index = offset + 1;
			let name = raw.trim();
			if name.is_empty() {
				report.errors.push(RecordError::new(
					index,
					None,
					RecordErrorKind::Validation,
					"Empty department name skipped",
				));
				continue;
			}

			match self.departments.resolve_with_status(name).await {
				Ok(resolved) if resolved.created => {
					report.created += 1;
					report.created_departments.push(resolved.department.name);
				}
				Ok(resolved) => {
					report.skipped += 1;
					report.skipped_departments.push(resolved.department.name);
				}
				Err(ProvisioningError::Database(e)) if e.is_unavailable() => {
					tracing::error!(error = %e, index, "database unavailable, aborting import");
					return Err(ImportError::Storage(e));
				}
				Err(e) => {
					tracing::error!(error = %e, department = %name, "failed to import department");
					report.errors.push(RecordError::new(
						index,
						None,
						RecordErrorKind::Storage,
						format!("Failed to create department {name}"),
					));
				}
			}
		}

		tracing::info!(
			created = report.created,
			skipped = report.skipped,
			errors = report.errors.len(),
			"department import finished"
		);
		Ok(report)
	}
}
