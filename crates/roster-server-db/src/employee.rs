// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use roster_server_auth::{
	AdminEmployeeUpdate, DepartmentId, Employee, EmployeeProfile, EmployeeRecordId, Role,
	SelfServiceEmployeeUpdate, UserId,
};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::DbError;
use crate::user::{parse_timestamp, parse_uuid};

const EMPLOYEE_COLUMNS: &str = r#"
	id, user_id, employee_id, department_id, first_name, last_name, position, join_date,
	phone_number, date_of_birth, address, city, state, zip_code, country,
	emergency_contact_name, emergency_contact_phone, emergency_contact_relation,
	married, marriage_anniversary, alternate_email, pan_card_url,
	bank_account_holder_name, bank_account_number, bank_ifsc_code,
	created_at, updated_at
"#;

/// Result of inserting an employee record.
///
/// The two unique keys are reported separately because callers react to them
/// differently: a second record for the same user is a benign race, a taken
/// employee ID means a new ID is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeInsert {
	Inserted,
	UserAlreadyProvisioned,
	EmployeeIdTaken,
}

/// One bulk-import row, resolved to a user and department.
#[derive(Debug, Clone)]
pub struct EmployeeImport {
	/// Written to the user row.
	pub display_name: String,
	/// Written to the user row when present.
	pub role: Option<Role>,
	/// Inserted when the user has no employee record yet.
	pub new_employee: Employee,
	/// Applied when the user already has one. Its `employee_id` is ignored.
	pub update: AdminEmployeeUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
	Created(Employee),
	Updated(Employee),
	/// The requested employee ID belongs to another user. Nothing was written.
	EmployeeIdTaken { owner: UserId },
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
	async fn create_employee(&self, employee: &Employee) -> Result<EmployeeInsert, DbError>;
	async fn get_employee_by_id(&self, id: &EmployeeRecordId)
		-> Result<Option<Employee>, DbError>;
	async fn get_employee_by_user_id(&self, user_id: &UserId)
		-> Result<Option<Employee>, DbError>;
	async fn get_employee_by_employee_id(
		&self,
		employee_id: &str,
	) -> Result<Option<Employee>, DbError>;
	async fn max_employee_sequence(&self, prefix: &str) -> Result<Option<u64>, DbError>;
	async fn import_employee(&self, import: &EmployeeImport) -> Result<ImportOutcome, DbError>;
	async fn update_employee(
		&self,
		id: &EmployeeRecordId,
		update: &AdminEmployeeUpdate,
	) -> Result<Option<Employee>, DbError>;
	async fn update_own_employee(
		&self,
		user_id: &UserId,
		update: &SelfServiceEmployeeUpdate,
	) -> Result<Option<Employee>, DbError>;
	async fn count_employees(&self) -> Result<i64, DbError>;
}

#[derive(Clone)]
pub struct EmployeeRepository {
	pool: SqlitePool,
}

impl EmployeeRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, employee), fields(user_id = %employee.user_id, employee_id = %employee.employee_id))]
	pub async fn create_employee(&self, employee: &Employee) -> Result<EmployeeInsert, DbError> {
		let mut conn = self.pool.acquire().await?;
		insert_employee(&mut conn, employee).await
	}

	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get_employee_by_id(
		&self,
		id: &EmployeeRecordId,
	) -> Result<Option<Employee>, DbError> {
		let mut conn = self.pool.acquire().await?;
		fetch_employee(&mut conn, "id", &id.to_string()).await
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_employee_by_user_id(
		&self,
		user_id: &UserId,
	) -> Result<Option<Employee>, DbError> {
		let mut conn = self.pool.acquire().await?;
		fetch_employee(&mut conn, "user_id", &user_id.to_string()).await
	}

	#[tracing::instrument(skip(self), fields(employee_id = %employee_id))]
	pub async fn get_employee_by_employee_id(
		&self,
		employee_id: &str,
	) -> Result<Option<Employee>, DbError> {
		let mut conn = self.pool.acquire().await?;
		fetch_employee(&mut conn, "employee_id", employee_id).await
	}

	/// Highest numeric suffix among employee IDs of the form `{prefix}{digits}`.
	///
	/// IDs with the prefix but a non-numeric remainder are ignored.
	#[tracing::instrument(skip(self), fields(prefix = %prefix))]
	pub async fn max_employee_sequence(&self, prefix: &str) -> Result<Option<u64>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT employee_id FROM employees
			WHERE substr(employee_id, 1, length(?)) = ?
			"#,
		)
		.bind(prefix)
		.bind(prefix)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.iter()
			.filter_map(|row| {
				let id: String = row.get("employee_id");
				let digits = id.strip_prefix(prefix)?;
				if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
					return None;
				}
				digits.parse::<u64>().ok()
			})
			.max())
	}

	/// Upsert one imported row in a single transaction.
	///
	/// The user row is written first so SQLite takes the write lock before any
	/// read. An existing employee for the user is updated; its `user_id` and
	/// `employee_id` never change. Otherwise the row is inserted, unless its
	/// employee ID already belongs to someone else, in which case the whole
	/// record is rolled back.
	#[tracing::instrument(
		skip(self, import),
		fields(user_id = %import.new_employee.user_id, employee_id = %import.new_employee.employee_id)
	)]
	pub async fn import_employee(&self, import: &EmployeeImport) -> Result<ImportOutcome, DbError> {
		let user_id = import.new_employee.user_id;
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE users
			SET display_name = ?, role = COALESCE(?, role), updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&import.display_name)
		.bind(import.role.map(|r| r.as_str()))
		.bind(Utc::now().to_rfc3339())
		.bind(user_id.to_string())
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("User {user_id} not found")));
		}

		let existing = fetch_employee(&mut tx, "user_id", &user_id.to_string()).await?;
		let existing = match existing {
			Some(existing) => Some(existing),
			None => {
				let taken_by =
					fetch_employee(&mut tx, "employee_id", &import.new_employee.employee_id).await?;
				if let Some(owner) = taken_by {
					tracing::debug!(owner = %owner.user_id, "employee ID owned by another user");
					return Ok(ImportOutcome::EmployeeIdTaken {
						owner: owner.user_id,
					});
				}

				match insert_employee(&mut tx, &import.new_employee).await? {
					EmployeeInsert::Inserted => {
						tx.commit().await?;
						tracing::debug!("employee created from import");
						return Ok(ImportOutcome::Created(import.new_employee.clone()));
					}
					EmployeeInsert::UserAlreadyProvisioned => {
						fetch_employee(&mut tx, "user_id", &user_id.to_string()).await?
					}
					EmployeeInsert::EmployeeIdTaken => {
						let owner =
							fetch_employee(&mut tx, "employee_id", &import.new_employee.employee_id)
								.await?
								.map(|e| e.user_id)
								.ok_or_else(|| {
									DbError::Internal("employee ID conflict without owner".to_string())
								})?;
						return Ok(ImportOutcome::EmployeeIdTaken { owner });
					}
				}
			}
		};

		let existing = existing.ok_or_else(|| {
			DbError::Internal(format!("employee for user {user_id} vanished mid-transaction"))
		})?;

		let update = AdminEmployeeUpdate {
			employee_id: None,
			..import.update.clone()
		};
		apply_admin_update(&mut tx, &existing.id, &update).await?;
		let updated = fetch_employee(&mut tx, "id", &existing.id.to_string())
			.await?
			.ok_or_else(|| DbError::NotFound(format!("Employee {} not found", existing.id)))?;
		tx.commit().await?;

		tracing::debug!("employee updated from import");
		Ok(ImportOutcome::Updated(updated))
	}

	/// Administrative edit. Returns `None` when the record does not exist.
	///
	/// # Errors
	/// `DbError::Conflict` if a new `employee_id` is already in use.
	#[tracing::instrument(skip(self, update), fields(id = %id))]
	pub async fn update_employee(
		&self,
		id: &EmployeeRecordId,
		update: &AdminEmployeeUpdate,
	) -> Result<Option<Employee>, DbError> {
		let mut conn = self.pool.acquire().await?;
		if !apply_admin_update(&mut conn, id, update).await? {
			return Ok(None);
		}
		fetch_employee(&mut conn, "id", &id.to_string()).await
	}

	/// Self-service edit of the caller's own record, contact fields only.
	#[tracing::instrument(skip(self, update), fields(user_id = %user_id))]
	pub async fn update_own_employee(
		&self,
		user_id: &UserId,
		update: &SelfServiceEmployeeUpdate,
	) -> Result<Option<Employee>, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE employees SET
				phone_number = COALESCE(?, phone_number),
				address = COALESCE(?, address),
				city = COALESCE(?, city),
				state = COALESCE(?, state),
				zip_code = COALESCE(?, zip_code),
				country = COALESCE(?, country),
				emergency_contact_name = COALESCE(?, emergency_contact_name),
				emergency_contact_phone = COALESCE(?, emergency_contact_phone),
				emergency_contact_relation = COALESCE(?, emergency_contact_relation),
				updated_at = ?
			WHERE user_id = ?
			"#,
		)
		.bind(&update.phone_number)
		.bind(&update.address)
		.bind(&update.city)
		.bind(&update.state)
		.bind(&update.zip_code)
		.bind(&update.country)
		.bind(&update.emergency_contact_name)
		.bind(&update.emergency_contact_phone)
		.bind(&update.emergency_contact_relation)
		.bind(Utc::now().to_rfc3339())
		.bind(user_id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}
		self.get_employee_by_user_id(user_id).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_employees(&self) -> Result<i64, DbError> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM employees")
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("count"))
	}
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
	async fn create_employee(&self, employee: &Employee) -> Result<EmployeeInsert, DbError> {
		EmployeeRepository::create_employee(self, employee).await
	}

	async fn get_employee_by_id(
		&self,
		id: &EmployeeRecordId,
	) -> Result<Option<Employee>, DbError> {
		EmployeeRepository::get_employee_by_id(self, id).await
	}

	async fn get_employee_by_user_id(
		&self,
		user_id: &UserId,
	) -> Result<Option<Employee>, DbError> {
		EmployeeRepository::get_employee_by_user_id(self, user_id).await
	}

	async fn get_employee_by_employee_id(
		&self,
		employee_id: &str,
	) -> Result<Option<Employee>, DbError> {
		EmployeeRepository::get_employee_by_employee_id(self, employee_id).await
	}

	async fn max_employee_sequence(&self, prefix: &str) -> Result<Option<u64>, DbError> {
		EmployeeRepository::max_employee_sequence(self, prefix).await
	}

	async fn import_employee(&self, import: &EmployeeImport) -> Result<ImportOutcome, DbError> {
		EmployeeRepository::import_employee(self, import).await
	}

	async fn update_employee(
		&self,
		id: &EmployeeRecordId,
		update: &AdminEmployeeUpdate,
	) -> Result<Option<Employee>, DbError> {
		EmployeeRepository::update_employee(self, id, update).await
	}

	async fn update_own_employee(
		&self,
		user_id: &UserId,
		update: &SelfServiceEmployeeUpdate,
	) -> Result<Option<Employee>, DbError> {
		EmployeeRepository::update_own_employee(self, user_id, update).await
	}

	async fn count_employees(&self) -> Result<i64, DbError> {
		EmployeeRepository::count_employees(self).await
	}
}

async fn insert_employee(
	conn: &mut SqliteConnection,
	employee: &Employee,
) -> Result<EmployeeInsert, DbError> {
	let profile = &employee.profile;
	let result = sqlx::query(
		r#"
		INSERT INTO employees (
			id, user_id, employee_id, department_id, first_name, last_name, position, join_date,
			phone_number, date_of_birth, address, city, state, zip_code, country,
			emergency_contact_name, emergency_contact_phone, emergency_contact_relation,
			married, marriage_anniversary, alternate_email, pan_card_url,
			bank_account_holder_name, bank_account_number, bank_ifsc_code,
			created_at, updated_at
		)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(employee.id.to_string())
	.bind(employee.user_id.to_string())
	.bind(&employee.employee_id)
	.bind(employee.department_id.map(|d| d.to_string()))
	.bind(&employee.first_name)
	.bind(&employee.last_name)
	.bind(&employee.position)
	.bind(employee.join_date.to_string())
	.bind(&profile.phone_number)
	.bind(profile.date_of_birth.map(|d| d.to_string()))
	.bind(&profile.address)
	.bind(&profile.city)
	.bind(&profile.state)
	.bind(&profile.zip_code)
	.bind(&profile.country)
	.bind(&profile.emergency_contact_name)
	.bind(&profile.emergency_contact_phone)
	.bind(&profile.emergency_contact_relation)
	.bind(profile.married)
	.bind(profile.marriage_anniversary.map(|d| d.to_string()))
	.bind(&profile.alternate_email)
	.bind(&profile.pan_card_url)
	.bind(&profile.bank_account_holder_name)
	.bind(&profile.bank_account_number)
	.bind(&profile.bank_ifsc_code)
	.bind(employee.created_at.to_rfc3339())
	.bind(employee.updated_at.to_rfc3339())
	.execute(&mut *conn)
	.await;

	match result {
		Ok(_) => Ok(EmployeeInsert::Inserted),
		Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
			let message = db_err.message();
			if message.contains("employees.user_id") {
				Ok(EmployeeInsert::UserAlreadyProvisioned)
			} else if message.contains("employees.employee_id") {
				Ok(EmployeeInsert::EmployeeIdTaken)
			} else {
				Err(DbError::Conflict(message.to_string()))
			}
		}
		Err(e) => Err(DbError::Sqlx(e)),
	}
}

/// Returns whether a row was updated.
async fn apply_admin_update(
	conn: &mut SqliteConnection,
	id: &EmployeeRecordId,
	update: &AdminEmployeeUpdate,
) -> Result<bool, DbError> {
	let result = sqlx::query(
		r#"
		UPDATE employees SET
			employee_id = COALESCE(?, employee_id),
			department_id = COALESCE(?, department_id),
			first_name = COALESCE(?, first_name),
			last_name = COALESCE(?, last_name),
			position = COALESCE(?, position),
			join_date = COALESCE(?, join_date),
			phone_number = COALESCE(?, phone_number),
			date_of_birth = COALESCE(?, date_of_birth),
			address = COALESCE(?, address),
			city = COALESCE(?, city),
			state = COALESCE(?, state),
			zip_code = COALESCE(?, zip_code),
			country = COALESCE(?, country),
			emergency_contact_name = COALESCE(?, emergency_contact_name),
			emergency_contact_phone = COALESCE(?, emergency_contact_phone),
			emergency_contact_relation = COALESCE(?, emergency_contact_relation),
			married = COALESCE(?, married),
			marriage_anniversary = COALESCE(?, marriage_anniversary),
			alternate_email = COALESCE(?, alternate_email),
			pan_card_url = COALESCE(?, pan_card_url),
			bank_account_holder_name = COALESCE(?, bank_account_holder_name),
			bank_account_number = COALESCE(?, bank_account_number),
			bank_ifsc_code = COALESCE(?, bank_ifsc_code),
			updated_at = ?
		WHERE id = ?
		"#,
	)
	.bind(&update.employee_id)
	.bind(update.department_id.map(|d| d.to_string()))
	.bind(&update.first_name)
	.bind(&update.last_name)
	.bind(&update.position)
	.bind(update.join_date.map(|d| d.to_string()))
	.bind(&update.phone_number)
	.bind(update.date_of_birth.map(|d| d.to_string()))
	.bind(&update.address)
	.bind(&update.city)
	.bind(&update.state)
	.bind(&update.zip_code)
	.bind(&update.country)
	.bind(&update.emergency_contact_name)
	.bind(&update.emergency_contact_phone)
	.bind(&update.emergency_contact_relation)
	.bind(update.married)
	.bind(update.marriage_anniversary.map(|d| d.to_string()))
	.bind(&update.alternate_email)
	.bind(&update.pan_card_url)
	.bind(&update.bank_account_holder_name)
	.bind(&update.bank_account_number)
	.bind(&update.bank_ifsc_code)
	.bind(Utc::now().to_rfc3339())
	.bind(id.to_string())
	.execute(&mut *conn)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			DbError::Conflict("Employee ID already in use".to_string())
		}
		_ => DbError::Sqlx(e),
	})?;

	Ok(result.rows_affected() > 0)
}

/// `column` is always one of a fixed set of unique columns.
async fn fetch_employee(
	conn: &mut SqliteConnection,
	column: &'static str,
	value: &str,
) -> Result<Option<Employee>, DbError> {
	let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE {column} = ?");
	let row = sqlx::query(&sql)
		.bind(value)
		.fetch_optional(&mut *conn)
		.await?;

	row.map(|r| row_to_employee(&r)).transpose()
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
	NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| DbError::Internal(e.to_string()))
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>, DbError> {
	value.as_deref().map(parse_date).transpose()
}

fn row_to_employee(row: &SqliteRow) -> Result<Employee, DbError> {
	let id_str: String = row.get("id");
	let user_id_str: String = row.get("user_id");
	let department_id_str: Option<String> = row.get("department_id");
	let join_date_str: String = row.get("join_date");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(Employee {
		id: EmployeeRecordId::new(parse_uuid(&id_str)?),
		user_id: UserId::new(parse_uuid(&user_id_str)?),
		employee_id: row.get("employee_id"),
		department_id: department_id_str
			.as_deref()
			.map(parse_uuid)
			.transpose()?
			.map(DepartmentId::new),
		first_name: row.get("first_name"),
		last_name: row.get("last_name"),
		position: row.get("position"),
		join_date: parse_date(&join_date_str)?,
		profile: EmployeeProfile {
			phone_number: row.get("phone_number"),
			date_of_birth: parse_optional_date(row.get("date_of_birth"))?,
			address: row.get("address"),
			city: row.get("city"),
			state: row.get("state"),
			zip_code: row.get("zip_code"),
			country: row.get("country"),
			emergency_contact_name: row.get("emergency_contact_name"),
			emergency_contact_phone: row.get("emergency_contact_phone"),
			emergency_contact_relation: row.get("emergency_contact_relation"),
			married: row.get("married"),
			marriage_anniversary: parse_optional_date(row.get("marriage_anniversary"))?,
			alternate_email: row.get("alternate_email"),
			pan_card_url: row.get("pan_card_url"),
			bank_account_holder_name: row.get("bank_account_holder_name"),
			bank_account_number: row.get("bank_account_number"),
			bank_ifsc_code: row.get("bank_ifsc_code"),
		},
		created_at: parse_timestamp(&created_at_str)?,
		updated_at: parse_timestamp(&updated_at_str)?,
	})
}
