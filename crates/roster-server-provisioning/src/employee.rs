// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::Utc;
use roster_server_auth::{split_display_name, Employee, EmployeeProfile, EmployeeRecordId, User};
use roster_server_db::{EmployeeInsert, EmployeeStore};

use crate::department::DepartmentResolver;
use crate::employee_id::EmployeeIdGenerator;
use crate::error::ProvisioningError;
use crate::Result;

const DEFAULT_POSITION: &str = "Employee";

/// Ensures every user has exactly one employee record.
///
/// Runs after authentication on every sign-in, so it must be cheap and
/// idempotent when the record already exists.
#[derive(Clone)]
pub struct EmployeeProvisioner {
	employees: Arc<dyn EmployeeStore>,
	departments: DepartmentResolver,
	ids: EmployeeIdGenerator,
	default_department: String,
	max_attempts: u32,
}

impl EmployeeProvisioner {
	pub fn new(
		employees: Arc<dyn EmployeeStore>,
		departments: DepartmentResolver,
		ids: EmployeeIdGenerator,
		default_department: impl Into<String>,
		max_attempts: u32,
	) -> Self {
		Self {
			employees,
			departments,
			ids,
			default_department: default_department.into(),
			max_attempts: max_attempts.max(1),
		}
	}

	/// Return the user's employee record, creating it if missing.
	///
	/// New records get a name split from the display name, the default
	/// department, position `Employee`, today's join date and a generated
	/// employee ID. If a concurrent call creates the record first, that record
	/// is returned.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn ensure_employee(&self, user: &User) -> Result<Employee> {
		if let Some(existing) = self.employees.get_employee_by_user_id(&user.id).await? {
			return Ok(existing);
		}

		let (first_name, last_name) = split_display_name(&user.display_name, &user.email);
		let department = self.departments.resolve(&self.default_department).await?;

		for attempt in 0..self.max_attempts {
			let employee_id = self.ids.next(attempt).await?;
			let now = Utc::now();
			let employee = Employee {
				id: EmployeeRecordId::generate(),
				user_id: user.id,
				employee_id,
				department_id: Some(department.id),
				first_name: first_name.clone(),
				last_name: last_name.clone(),
				position: DEFAULT_POSITION.to_string(),
				join_date: now.date_naive(),
				profile: EmployeeProfile::default(),
				created_at: now,
				updated_at: now,
			};

			match self.employees.create_employee(&employee).await? {
				EmployeeInsert::Inserted => {
					tracing::info!(employee_id = %employee.employee_id, "provisioned employee record");
					return Ok(employee);
				}
				EmployeeInsert::UserAlreadyProvisioned => {
					tracing::debug!("employee record created concurrently, using existing");
					return self
						.employees
						.get_employee_by_user_id(&user.id)
						.await?
						.ok_or_else(|| {
							ProvisioningError::UnresolvedConflict(format!(
								"employee for user {} conflicted but is missing",
								user.id
							))
						});
				}
				EmployeeInsert::EmployeeIdTaken => {
					tracing::debug!(
						attempt,
						employee_id = %employee.employee_id,
						"employee ID taken, retrying"
					);
				}
			}
		}

		tracing::error!(
			attempts = self.max_attempts,
			prefix = %self.ids.prefix(),
			"could not allocate an employee ID"
		);
		Err(ProvisioningError::EmployeeIdExhausted {
			attempts: self.max_attempts,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use roster_server_auth::{
		AdminEmployeeUpdate, EmployeeRecordId, SelfServiceEmployeeUpdate, UserId,
	};
	use roster_server_db::testing::create_test_pool;
	use roster_server_db::{
		DbError, DepartmentRepository, EmployeeImport, EmployeeRepository, ImportOutcome,
		UserRepository,
	};
	use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

	/// Wraps a real repository and lets tests inject a stale lookup or
	/// permanently taken IDs.
	struct ScriptedEmployeeStore {
		inner: EmployeeRepository,
		stale_user_lookup: AtomicBool,
		always_taken: bool,
		create_calls: AtomicU32,
	}

	impl ScriptedEmployeeStore {
		fn new(inner: EmployeeRepository) -> Self {
			Self {
				inner,
				stale_user_lookup: AtomicBool::new(false),
				always_taken: false,
				create_calls: AtomicU32::new(0),
			}
		}
	}

	#[async_trait]
	impl EmployeeStore for ScriptedEmployeeStore {
		async fn create_employee(
			&self,
			employee: &Employee,
		) -> std::result::Result<EmployeeInsert, DbError> {
			self.create_calls.fetch_add(1, Ordering::SeqCst);
			if self.always_taken {
				return Ok(EmployeeInsert::EmployeeIdTaken);
			}
			self.inner.create_employee(employee).await
		}

		async fn get_employee_by_id(
			&self,
			id: &EmployeeRecordId,
		) -> std::result::Result<Option<Employee>, DbError> {
			self.inner.get_employee_by_id(id).await
		}

		async fn get_employee_by_user_id(
			&self,
			user_id: &UserId,
		) -> std::result::Result<Option<Employee>, DbError> {
			if self.stale_user_lookup.swap(false, Ordering::SeqCst) {
				return Ok(None);
			}
			self.inner.get_employee_by_user_id(user_id).await
		}

		async fn get_employee_by_employee_id(
			&self,
			employee_id: &str,
		) -> std::result::Result<Option<Employee>, DbError> {
			self.inner.get_employee_by_employee_id(employee_id).await
		}

		async fn max_employee_sequence(
			&self,
			prefix: &str,
		) -> std::result::Result<Option<u64>, DbError> {
			self.inner.max_employee_sequence(prefix).await
		}

		async fn import_employee(
			&self,
			import: &EmployeeImport,
		) -> std::result::Result<ImportOutcome, DbError> {
			self.inner.import_employee(import).await
		}

		async fn update_employee(
			&self,
			id: &EmployeeRecordId,
			update: &AdminEmployeeUpdate,
		) -> std::result::Result<Option<Employee>, DbError> {
			self.inner.update_employee(id, update).await
		}

		async fn update_own_employee(
			&self,
			user_id: &UserId,
			update: &SelfServiceEmployeeUpdate,
		) -> std::result::Result<Option<Employee>, DbError> {
			self.inner.update_own_employee(user_id, update).await
		}

		async fn count_employees(&self) -> std::result::Result<i64, DbError> {
			self.inner.count_employees().await
		}
	}

	struct Harness {
		users: UserRepository,
		departments: Arc<DepartmentRepository>,
		employees: EmployeeRepository,
	}

	async fn harness() -> Harness {
		let pool = create_test_pool().await;
		Harness {
			users: UserRepository::new(pool.clone()),
			departments: Arc::new(DepartmentRepository::new(pool.clone())),
			employees: EmployeeRepository::new(pool),
		}
	}

	fn provisioner_over(h: &Harness, store: Arc<dyn EmployeeStore>) -> EmployeeProvisioner {
		EmployeeProvisioner::new(
			store.clone(),
			DepartmentResolver::new(h.departments.clone()),
			EmployeeIdGenerator::new(store, "EMP", 4),
			"General",
			5,
		)
	}

	async fn seed_user(h: &Harness, email: &str, name: &str) -> User {
		let user = User::new(email, name);
		h.users.create_user(&user).await.unwrap();
		user
	}

	#[tokio::test]
	async fn test_provisions_with_defaults() {
		let h = harness().await;
		let user = seed_user(&h, "grace.hopper@company.com", "Grace Brewster Hopper").await;
		let provisioner = provisioner_over(&h, Arc::new(h.employees.clone()));

		let employee = provisioner.ensure_employee(&user).await.unwrap();
		assert_eq!(employee.user_id, user.id);
		assert_eq!(employee.employee_id, "EMP0001");
		assert_eq!(employee.first_name, "Grace");
		assert_eq!(employee.last_name, "Brewster Hopper");
		assert_eq!(employee.position, "Employee");
		assert_eq!(employee.join_date, Utc::now().date_naive());

		let general = h
			.departments
			.get_department_by_name("General")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(employee.department_id, Some(general.id));
	}

	#[tokio::test]
	async fn test_second_call_is_a_no_op() {
		let h = harness().await;
		let user = seed_user(&h, "a@company.com", "A B").await;
		let provisioner = provisioner_over(&h, Arc::new(h.employees.clone()));

		let first = provisioner.ensure_employee(&user).await.unwrap();
		let second = provisioner.ensure_employee(&user).await.unwrap();
		assert_eq!(first.id, second.id);
		assert_eq!(first.employee_id, second.employee_id);
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_ids_are_sequential_across_users() {
		let h = harness().await;
		let provisioner = provisioner_over(&h, Arc::new(h.employees.clone()));

		let mut ids = Vec::new();
		for i in 0..3 {
			let user = seed_user(&h, &format!("u{i}@company.com"), "U").await;
			ids.push(provisioner.ensure_employee(&user).await.unwrap().employee_id);
		}
		assert_eq!(ids, vec!["EMP0001", "EMP0002", "EMP0003"]);
	}

	#[tokio::test]
	async fn test_user_conflict_returns_winner() {
		let h = harness().await;
		let user = seed_user(&h, "a@company.com", "A B").await;
		let direct = provisioner_over(&h, Arc::new(h.employees.clone()));
		let winner = direct.ensure_employee(&user).await.unwrap();

		let store = ScriptedEmployeeStore::new(h.employees.clone());
		store.stale_user_lookup.store(true, Ordering::SeqCst);
		let provisioner = provisioner_over(&h, Arc::new(store));

		let employee = provisioner.ensure_employee(&user).await.unwrap();
		assert_eq!(employee.id, winner.id);
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_gives_up_after_bounded_attempts() {
		let h = harness().await;
		let user = seed_user(&h, "a@company.com", "A B").await;
		let mut store = ScriptedEmployeeStore::new(h.employees.clone());
		store.always_taken = true;
		let store = Arc::new(store);
		let provisioner = provisioner_over(&h, store.clone());

		let err = provisioner.ensure_employee(&user).await.unwrap_err();
		assert!(matches!(
			err,
			ProvisioningError::EmployeeIdExhausted { attempts: 5 }
		));
		assert_eq!(store.create_calls.load(Ordering::SeqCst), 5);
	}

	#[tokio::test]
	async fn test_concurrent_provisioning_creates_one_record() {
		let h = harness().await;
		let user = seed_user(&h, "a@company.com", "A B").await;
		let provisioner = provisioner_over(&h, Arc::new(h.employees.clone()));

		let (a, b) = tokio::join!(
			provisioner.ensure_employee(&user),
			provisioner.ensure_employee(&user),
		);
		assert_eq!(a.unwrap().id, b.unwrap().id);
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}
}
