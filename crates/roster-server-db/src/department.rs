// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use roster_server_auth::{Department, DepartmentId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::user::{parse_timestamp, parse_uuid};

#[async_trait]
pub trait DepartmentStore: Send + Sync {
	async fn create_department(&self, department: &Department) -> Result<(), DbError>;
	async fn get_department_by_id(&self, id: &DepartmentId) -> Result<Option<Department>, DbError>;
	async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>, DbError>;
	async fn list_departments(&self) -> Result<Vec<Department>, DbError>;
}

#[derive(Clone)]
pub struct DepartmentRepository {
	pool: SqlitePool,
}

impl DepartmentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// `DbError::Conflict` if a department with the same name exists.
	#[tracing::instrument(skip(self, department), fields(department_id = %department.id, name = %department.name))]
	pub async fn create_department(&self, department: &Department) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO departments (id, name, description, is_active, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(department.id.to_string())
		.bind(&department.name)
		.bind(&department.description)
		.bind(department.is_active)
		.bind(department.created_at.to_rfc3339())
		.bind(department.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
				DbError::Conflict(format!("Department '{}' already exists", department.name))
			}
			_ => DbError::Sqlx(e),
		})?;

		Ok(())
	}

	#[tracing::instrument(skip(self), fields(department_id = %id))]
	pub async fn get_department_by_id(
		&self,
		id: &DepartmentId,
	) -> Result<Option<Department>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, is_active, created_at, updated_at
			FROM departments
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_department(&r)).transpose()
	}

	/// Exact match on the trimmed name.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, is_active, created_at, updated_at
			FROM departments
			WHERE name = ?
			"#,
		)
		.bind(name.trim())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_department(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_departments(&self) -> Result<Vec<Department>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, description, is_active, created_at, updated_at
			FROM departments
			ORDER BY name ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_department).collect()
	}
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
	async fn create_department(&self, department: &Department) -> Result<(), DbError> {
		DepartmentRepository::create_department(self, department).await
	}

	async fn get_department_by_id(&self, id: &DepartmentId) -> Result<Option<Department>, DbError> {
		DepartmentRepository::get_department_by_id(self, id).await
	}

	async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>, DbError> {
		DepartmentRepository::get_department_by_name(self, name).await
	}

	async fn list_departments(&self) -> Result<Vec<Department>, DbError> {
		DepartmentRepository::list_departments(self).await
	}
}

fn row_to_department(row: &sqlx::sqlite::SqliteRow) -> Result<Department, DbError> {
	let id_str: String = row.get("id");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(Department {
		id: DepartmentId::new(parse_uuid(&id_str)?),
		name: row.get("name"),
		description: row.get("description"),
		is_active: row.get("is_active"),
		created_at: parse_timestamp(&created_at_str)?,
		updated_at: parse_timestamp(&updated_at_str)?,
	})
}
