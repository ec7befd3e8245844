// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_server_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("user not found: {0}")]
	UserNotFound(String),

	#[error("invalid request: {0}")]
	InvalidRequest(String),

	/// A uniqueness conflict was reported but the conflicting row could not
	/// be read back.
	#[error("unresolved conflict: {0}")]
	UnresolvedConflict(String),

	/// The highest stored sequence for the prefix leaves no room for another.
	#[error("employee ID sequence for prefix {prefix} is exhausted")]
	EmployeeIdSequenceOverflow { prefix: String },

	#[error("no free employee ID after {attempts} attempts")]
	EmployeeIdExhausted { attempts: u32 },
}
