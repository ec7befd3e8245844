// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk import handlers. The body format is chosen by `Content-Type`.

use axum::{
	body::Bytes,
	extract::State,
	http::{header::CONTENT_TYPE, HeaderMap},
	Json,
};
use roster_server_import::{
	parse_department_json, parse_department_lines, parse_employee_csv, parse_employee_json,
};
use serde::Serialize;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImportResponse {
	pub success: bool,
	pub created: usize,
	pub updated: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentImportResponse {
	pub success: bool,
	pub created: usize,
	pub skipped: usize,
	pub created_departments: Vec<String>,
	pub skipped_departments: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<String>>,
}

fn content_type(headers: &HeaderMap) -> String {
	headers
		.get(CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.unwrap_or("application/json")
		.to_ascii_lowercase()
}

fn body_text(body: &Bytes) -> Result<&str, ServerError> {
	std::str::from_utf8(body).map_err(|_| ServerError::BadRequest("Body is not valid UTF-8".to_string()))
}

fn non_empty(errors: Vec<String>) -> Option<Vec<String>> {
	(!errors.is_empty()).then_some(errors)
}

/// POST /api/employees/bulk-import
pub async fn import_employees(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<EmployeeImportResponse>, ServerError> {
	let records = if content_type(&headers).contains("csv") {
		parse_employee_csv(body_text(&body)?)?
	} else {
		parse_employee_json(&body)?
	};

	let report = state.reconciler.reconcile(&records).await?;
	Ok(Json(EmployeeImportResponse {
		success: true,
		created: report.created,
		updated: report.updated,
		errors: non_empty(report.error_messages()),
	}))
}

/// POST /api/departments/bulk-import
pub async fn import_departments(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<DepartmentImportResponse>, ServerError> {
	let names = if content_type(&headers).starts_with("text/") {
		parse_department_lines(body_text(&body)?)
	} else {
		parse_department_json(&body)?
	};

	let report = state.department_importer.import(&names).await?;
	let errors = non_empty(report.error_messages());
	Ok(Json(DepartmentImportResponse {
		success: true,
		created: report.created,
		skipped: report.skipped,
		created_departments: report.created_departments,
		skipped_departments: report.skipped_departments,
		errors,
	}))
}
