// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	/// True when the database itself could not be reached, as opposed to a
	/// statement failing. Batch operations stop on these.
	pub fn is_unavailable(&self) -> bool {
		matches!(
			self,
			DbError::Sqlx(
				sqlx::Error::PoolTimedOut
					| sqlx::Error::PoolClosed
					| sqlx::Error::Io(_)
					| sqlx::Error::WorkerCrashed
			)
		)
	}
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pool_failures_are_unavailable() {
		assert!(DbError::Sqlx(sqlx::Error::PoolClosed).is_unavailable());
		assert!(DbError::Sqlx(sqlx::Error::PoolTimedOut).is_unavailable());
	}

	#[test]
	fn statement_failures_are_not_unavailable() {
		assert!(!DbError::Sqlx(sqlx::Error::RowNotFound).is_unavailable());
		assert!(!DbError::Conflict("dup".to_string()).is_unavailable());
	}
}
