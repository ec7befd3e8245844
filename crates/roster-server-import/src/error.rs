// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use roster_server_db::DbError;
use serde::Serialize;

/// Failures that stop a whole batch. Per-record problems are [`RecordError`]s.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
	#[error("batch is empty")]
	EmptyBatch,

	#[error("invalid input: {0}")]
	InvalidFormat(String),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),

	#[error("storage unavailable: {0}")]
	Storage(#[source] DbError),
}

impl From<serde_json::Error> for ImportError {
	fn from(e: serde_json::Error) -> Self {
		ImportError::InvalidFormat(e.to_string())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorKind {
	Validation,
	Conflict,
	Storage,
}

/// A problem with one record. The rest of the batch still runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
	/// 1-based position in the input.
	pub index: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	pub kind: RecordErrorKind,
	pub message: String,
}

impl RecordError {
	pub(crate) fn new(
		index: usize,
		email: Option<&str>,
		kind: RecordErrorKind,
		message: impl Into<String>,
	) -> Self {
		Self {
			index,
			email: email.map(str::to_string),
			kind,
			message: message.into(),
		}
	}
}

impl fmt::Display for RecordError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.email {
			Some(email) => write!(f, "Record {} ({}): {}", self.index, email, self.message),
			None => write!(f, "Record {}: {}", self.index, self.message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_email_when_known() {
		let err = RecordError::new(
			3,
			Some("c@company.com"),
			RecordErrorKind::Validation,
			"employeeId is required",
		);
		assert_eq!(
			err.to_string(),
			"Record 3 (c@company.com): employeeId is required"
		);

		let err = RecordError::new(2, None, RecordErrorKind::Validation, "email is required");
		assert_eq!(err.to_string(), "Record 2: email is required");
	}
}
