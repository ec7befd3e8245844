// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::Utc;
use roster_server_auth::{AdminEmployeeUpdate, Employee, EmployeeProfile, EmployeeRecordId};
use roster_server_db::{DbError, EmployeeImport, EmployeeStore, ImportOutcome};
use roster_server_provisioning::{DepartmentResolver, IdentityLinker, ProvisioningError};
use serde::Serialize;

use crate::error::{ImportError, RecordError, RecordErrorKind};
use crate::record::{EmployeeRecord, ValidRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
	pub created: usize,
	pub updated: usize,
	pub errors: Vec<RecordError>,
}

impl ReconcileReport {
	pub fn error_messages(&self) -> Vec<String> {
		self.errors.iter().map(ToString::to_string).collect()
	}
}

/// Applies a batch of employee records to the directory.
///
/// Records are processed one at a time in input order. A record that fails
/// validation or conflicts with another user's employee ID is reported and
/// skipped; the batch only stops when the database cannot be reached.
#[derive(Clone)]
pub struct BulkReconciler {
	departments: DepartmentResolver,
	linker: IdentityLinker,
	employees: Arc<dyn EmployeeStore>,
}

/// Why a single record was not applied.
enum Failure {
	Record(RecordErrorKind, String),
	Abort(DbError),
}

impl From<DbError> for Failure {
	fn from(e: DbError) -> Self {
		if e.is_unavailable() {
			Failure::Abort(e)
		} else {
			tracing::error!(error = %e, "storage error while importing record");
			Failure::Record(RecordErrorKind::Storage, "Internal storage error".to_string())
		}
	}
}

impl From<ProvisioningError> for Failure {
	fn from(e: ProvisioningError) -> Self {
		match e {
			ProvisioningError::Database(db) => db.into(),
			ProvisioningError::InvalidRequest(message) => {
				Failure::Record(RecordErrorKind::Validation, message)
			}
			other => {
				tracing::error!(error = %other, "provisioning error while importing record");
				Failure::Record(RecordErrorKind::Storage, "Internal storage error".to_string())
			}
		}
	}
}

enum Applied {
	Created,
	Updated,
}

impl BulkReconciler {
	pub fn new(
		departments: DepartmentResolver,
		linker: IdentityLinker,
		employees: Arc<dyn EmployeeStore>,
	) -> Self {
		Self {
			departments,
			linker,
			employees,
		}
	}

	#[tracing::instrument(skip(self, records), fields(records = records.len()))]
	pub async fn reconcile(&self, records: &[EmployeeRecord]) -> Result<ReconcileReport, ImportError> {
		if records.is_empty() {
			return Err(ImportError::EmptyBatch);
		}

		let mut report = ReconcileReport::default();
		for (offset, record) in records.iter().enumerate() {
			let index = offset + 1;
			let label = record.email_label();

			let valid = match record.validate() {
				Ok(valid) => valid,
				Err(message) => {
					tracing::debug!(index, %message, "record failed validation");
					report.errors.push(RecordError::new(
						index,
						label.as_deref(),
						RecordErrorKind::Validation,
						message,
					));
					continue;
				}
			};

			match self.apply(&valid).await {
				Ok(Applied::Created) => report.created += 1,
				Ok(Applied::Updated) => report.updated += 1,
				Err(Failure::Record(kind, message)) => {
					report.errors.push(RecordError::new(
						index,
						Some(&valid.email),
						kind,
						message,
					));
				}
				Err(Failure::Abort(e)) => {
					tracing::error!(error = %e, index, "database unavailable, aborting import");
					return Err(ImportError::Storage(e));
				}
			}
		}

		tracing::info!(
			created = report.created,
			updated = report.updated,
			errors = report.errors.len(),
			"employee import finished"
		);
		Ok(report)
	}

	async fn apply(&self, record: &ValidRecord) -> Result<Applied, Failure> {
		let department = self.departments.resolve(&record.department).await?;
		let linked = self
			.linker
			.link_identity(&record.email, &record.display_name())
			.await?;

		let now = Utc::now();
		let new_employee = Employee {
			id: EmployeeRecordId::generate(),
			user_id: linked.user.id,
			employee_id: record.employee_id.clone(),
			department_id: Some(department.id),
			first_name: record.first_name.clone(),
			last_name: record.last_name.clone(),
			position: record.position.clone(),
			join_date: record.join_date,
			profile: EmployeeProfile {
				phone_number: record.phone_number.clone(),
				date_of_birth: record.date_of_birth,
				address: record.address.clone(),
				city: record.city.clone(),
				state: record.state.clone(),
				zip_code: record.zip_code.clone(),
				country: record.country.clone(),
				emergency_contact_name: record.emergency_contact_name.clone(),
				emergency_contact_phone: record.emergency_contact_phone.clone(),
				emergency_contact_relation: record.emergency_contact_relation.clone(),
				married: record.married.unwrap_or(false),
				marriage_anniversary: record.marriage_anniversary,
				alternate_email: record.alternate_email.clone(),
				pan_card_url: record.pan_card_url.clone(),
				bank_account_holder_name: record.bank_account_holder_name.clone(),
				bank_account_number: record.bank_account_number.clone(),
				bank_ifsc_code: record.bank_ifsc_code.clone(),
			},
			created_at: now,
			updated_at: now,
		};
		let update = AdminEmployeeUpdate {
			employee_id: None,
			department_id: Some(department.id),
			first_name: Some(record.first_name.clone()),
			last_name: Some(record.last_name.clone()),
			position: Some(record.position.clone()),
			join_date: Some(record.join_date),
			phone_number: record.phone_number.clone(),
			date_of_birth: record.date_of_birth,
			address: record.address.clone(),
			city: record.city.clone(),
			state: record.state.clone(),
			zip_code: record.zip_code.clone(),
			country: record.country.clone(),
			emergency_contact_name: record.emergency_contact_name.clone(),
			emergency_contact_phone: record.emergency_contact_phone.clone(),
			emergency_contact_relation: record.emergency_contact_relation.clone(),
			married: record.married,
			marriage_anniversary: record.marriage_anniversary,
			alternate_email: record.alternate_email.clone(),
			pan_card_url: record.pan_card_url.clone(),
			bank_account_holder_name: record.bank_account_holder_name.clone(),
			bank_account_number: record.bank_account_number.clone(),
			bank_ifsc_code: record.bank_ifsc_code.clone(),
		};

		let import = EmployeeImport {
			display_name: record.display_name(),
			role: record.role,
			new_employee,
			update,
		};

		match self.employees.import_employee(&import).await? {
			ImportOutcome::Created(employee) => {
				tracing::debug!(employee_id = %employee.employee_id, "created employee from import");
				Ok(Applied::Created)
			}
			ImportOutcome::Updated(employee) => {
				tracing::debug!(employee_id = %employee.employee_id, "updated employee from import");
				Ok(Applied::Updated)
			}
			ImportOutcome::EmployeeIdTaken { owner } => {
				tracing::warn!(
					employee_id = %record.employee_id,
					owner = %owner,
					"employee ID belongs to another user"
				);
				Err(Failure::Record(
					RecordErrorKind::Conflict,
					format!("Employee ID {} already exists", record.employee_id),
				))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_server_auth::Role;
	use roster_server_db::testing::create_test_pool;
	use roster_server_db::{DepartmentRepository, EmployeeRepository, UserRepository};

	struct Harness {
		reconciler: BulkReconciler,
		users: Arc<UserRepository>,
		departments: Arc<DepartmentRepository>,
		employees: Arc<EmployeeRepository>,
	}

	async fn harness() -> Harness {
		let pool = create_test_pool().await;
		let users = Arc::new(UserRepository::new(pool.clone()));
		let departments = Arc::new(DepartmentRepository::new(pool.clone()));
		let employees = Arc::new(EmployeeRepository::new(pool));
		let reconciler = BulkReconciler::new(
			DepartmentResolver::new(departments.clone()),
			IdentityLinker::new(users.clone()),
			employees.clone(),
		);
		Harness {
			reconciler,
			users,
			departments,
			employees,
		}
	}

	fn record(n: u32, department: &str) -> EmployeeRecord {
		EmployeeRecord {
			first_name: Some(format!("First{n}")),
			last_name: Some(format!("Last{n}")),
			email: Some(format!("person{n}@company.com")),
			department: Some(department.to_string()),
			position: Some("Engineer".to_string()),
			employee_id: Some(format!("EMP{n:04}")),
			join_date: Some("2024-01-15".to_string()),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_partial_batch_success() {
		let h = harness().await;
		let mut records: Vec<_> = (1..=5).map(|n| record(n, "Engineering")).collect();
		records[2].employee_id = None;

		let report = h.reconciler.reconcile(&records).await.unwrap();
		assert_eq!(report.created, 4);
		assert_eq!(report.updated, 0);
		assert_eq!(report.errors.len(), 1);

		let err = &report.errors[0];
		assert_eq!(err.index, 3);
		assert_eq!(err.email.as_deref(), Some("person3@company.com"));
		assert_eq!(err.kind, RecordErrorKind::Validation);
		assert_eq!(
			report.error_messages(),
			vec!["Record 3 (person3@company.com): employeeId is required".to_string()]
		);
		assert_eq!(h.employees.count_employees().await.unwrap(), 4);
	}

	#[tokio::test]
	async fn test_mistyped_json_record_does_not_abort_batch() {
		let h = harness().await;
		let body = br#"[
			{"firstName":"Ada","lastName":"Lovelace","email":"ada@company.com","department":"Engineering","position":"Engineer","employeeId":"EMP1001","joinDate":"2024-01-15"},
			{"firstName":"Bob","lastName":"Stone","email":"bob@company.com","department":"Engineering","position":"Engineer","employeeId":1002,"joinDate":"2024-01-15"},
			{"firstName":"Cy","lastName":"Young","email":"cy@company.com","department":"Sales","position":"Rep","employeeId":"EMP1003","joinDate":"2024-01-15"}
		]"#;
		let records = crate::parse_employee_json(body).unwrap();

		let report = h.reconciler.reconcile(&records).await.unwrap();
		assert_eq!(report.created, 2);
		assert_eq!(report.errors.len(), 1);
		let err = &report.errors[0];
		assert_eq!(err.index, 2);
		assert_eq!(err.email.as_deref(), Some("bob@company.com"));
		assert_eq!(err.kind, RecordErrorKind::Validation);

		for id in ["EMP1001", "EMP1003"] {
			assert!(h.employees.get_employee_by_employee_id(id).await.unwrap().is_some());
		}
		assert!(h.users.get_user_by_email("bob@company.com").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_new_department_is_shared() {
		let h = harness().await;
		let records = vec![record(1, "Research"), record(2, "Research")];

		let report = h.reconciler.reconcile(&records).await.unwrap();
		assert_eq!(report.created, 2);

		let departments = h.departments.list_departments().await.unwrap();
		assert_eq!(departments.len(), 1);
		let research = &departments[0];
		for n in [1, 2] {
			let employee = h
				.employees
				.get_employee_by_employee_id(&format!("EMP{n:04}"))
				.await
				.unwrap()
				.unwrap();
			assert_eq!(employee.department_id, Some(research.id));
		}
	}

	#[tokio::test]
	async fn test_reimport_updates_existing_employee() {
		let h = harness().await;
		let first = h.reconciler.reconcile(&[record(1, "Engineering")]).await.unwrap();
		assert_eq!(first.created, 1);
		let before = h
			.employees
			.get_employee_by_employee_id("EMP0001")
			.await
			.unwrap()
			.unwrap();

		let mut changed = record(1, "Engineering");
		changed.position = Some("Staff Engineer".to_string());
		changed.employee_id = Some("EMP9999".to_string());
		let second = h.reconciler.reconcile(&[changed]).await.unwrap();
		assert_eq!(second.created, 0);
		assert_eq!(second.updated, 1);

		let after = h
			.employees
			.get_employee_by_user_id(&before.user_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(after.id, before.id);
		assert_eq!(after.employee_id, "EMP0001");
		assert_eq!(after.position, "Staff Engineer");
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_employee_id_owned_by_someone_else() {
		let h = harness().await;
		h.reconciler.reconcile(&[record(1, "Engineering")]).await.unwrap();

		let mut clash = record(2, "Engineering");
		clash.employee_id = Some("EMP0001".to_string());
		let report = h.reconciler.reconcile(&[clash]).await.unwrap();

		assert_eq!(report.created, 0);
		assert_eq!(report.errors.len(), 1);
		assert_eq!(report.errors[0].kind, RecordErrorKind::Conflict);
		assert_eq!(report.errors[0].message, "Employee ID EMP0001 already exists");
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_import_sets_display_name_and_role() {
		let h = harness().await;
		let mut admin = record(1, "Engineering");
		admin.role = Some("admin".to_string());
		h.reconciler.reconcile(&[admin]).await.unwrap();

		let user = h
			.users
			.get_user_by_email("person1@company.com")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(user.display_name, "First1 Last1");
		assert_eq!(user.role, Role::Admin);

		// A record without a role leaves the stored role alone.
		h.reconciler.reconcile(&[record(1, "Engineering")]).await.unwrap();
		let user = h.users.get_user_by_id(&user.id).await.unwrap().unwrap();
		assert_eq!(user.role, Role::Admin);
	}

	#[tokio::test]
	async fn test_empty_batch_is_rejected() {
		let h = harness().await;
		assert!(matches!(
			h.reconciler.reconcile(&[]).await,
			Err(ImportError::EmptyBatch)
		));
	}

	#[tokio::test]
	async fn test_unavailable_database_aborts_batch() {
		let pool = create_test_pool().await;
		let reconciler = BulkReconciler::new(
			DepartmentResolver::new(Arc::new(DepartmentRepository::new(pool.clone()))),
			IdentityLinker::new(Arc::new(UserRepository::new(pool.clone()))),
			Arc::new(EmployeeRepository::new(pool.clone())),
		);
		pool.close().await;

		let result = reconciler
			.reconcile(&[record(1, "Engineering"), record(2, "Engineering")])
			.await;
		assert!(matches!(result, Err(ImportError::Storage(_))));
	}
}
