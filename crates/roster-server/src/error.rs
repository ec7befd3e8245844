// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use roster_server_db::DbError;
use roster_server_import::ImportError;
use roster_server_provisioning::ProvisioningError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Invalid request: {0}")]
	BadRequest(String),

	#[error("Unauthorized")]
	Unauthorized,

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl From<ProvisioningError> for ServerError {
	fn from(e: ProvisioningError) -> Self {
		match e {
			ProvisioningError::Database(db) => ServerError::Db(db),
			ProvisioningError::UserNotFound(id) => ServerError::NotFound(format!("User {id}")),
			ProvisioningError::InvalidRequest(msg) => ServerError::BadRequest(msg),
			other => ServerError::Internal(other.to_string()),
		}
	}
}

impl From<ImportError> for ServerError {
	fn from(e: ImportError) -> Self {
		match e {
			ImportError::EmptyBatch => {
				ServerError::BadRequest("At least one record is required".to_string())
			}
			ImportError::InvalidFormat(msg) => ServerError::BadRequest(msg),
			ImportError::Csv(e) => ServerError::BadRequest(format!("Invalid CSV: {e}")),
			ImportError::Storage(db) => ServerError::Db(db),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, message) = match self {
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"Internal server error".to_string(),
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"Internal server error".to_string(),
				)
			}
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"Unauthorized".to_string(),
			),
		};

		(
			status,
			Json(ErrorResponse {
				error: error.to_string(),
				message,
			}),
		)
			.into_response()
	}
}
