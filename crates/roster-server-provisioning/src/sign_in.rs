// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use roster_server_auth::{AllowlistDecision, DenyReason, DomainAllowlist, Employee, SessionClaims};
use roster_server_db::UserStore;
use serde::Deserialize;

use crate::employee::EmployeeProvisioner;
use crate::error::ProvisioningError;
use crate::identity::IdentityLinker;
use crate::Result;

/// Identity asserted by the external provider after its own verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
	Allowed {
		claims: SessionClaims,
		is_new_user: bool,
		/// `None` when provisioning failed; the sign-in still succeeds.
		employee: Option<Employee>,
	},
	Denied(DenyReason),
}

/// Sign-in orchestration: gate, link, then provision.
#[derive(Clone)]
pub struct SignInService {
	allowlist: DomainAllowlist,
	linker: IdentityLinker,
	provisioner: EmployeeProvisioner,
	users: Arc<dyn UserStore>,
}

impl SignInService {
	pub fn new(
		allowlist: DomainAllowlist,
		linker: IdentityLinker,
		provisioner: EmployeeProvisioner,
		users: Arc<dyn UserStore>,
	) -> Self {
		Self {
			allowlist,
			linker,
			provisioner,
			users,
		}
	}

	pub fn allowlist(&self) -> &DomainAllowlist {
		&self.allowlist
	}

	/// Decide and complete a sign-in.
	///
	/// A denial is an `Ok` outcome. Errors are only returned when the user
	/// cannot be linked, since no claims can be issued without a user row.
	#[tracing::instrument(skip(self, identity), fields(email = %identity.email))]
	pub async fn sign_in(&self, identity: &VerifiedIdentity) -> Result<SignInOutcome> {
		if let AllowlistDecision::Deny(reason) = self.allowlist.check(&identity.email) {
			tracing::warn!(reason = reason.code(), "sign-in denied by domain allowlist");
			return Ok(SignInOutcome::Denied(reason));
		}

		let linked = self
			.linker
			.link_identity(&identity.email, &identity.display_name)
			.await?;
		let claims = SessionClaims::from(&linked.user);

		let employee = match self.provisioner.ensure_employee(&linked.user).await {
			Ok(employee) => Some(employee),
			Err(e) => {
				tracing::error!(error = %e, user_id = %linked.user.id, "employee provisioning failed");
				None
			}
		};

		tracing::info!(
			user_id = %claims.user_id,
			role = %claims.role,
			is_new_user = linked.is_new_user,
			"sign-in completed"
		);
		Ok(SignInOutcome::Allowed {
			claims,
			is_new_user: linked.is_new_user,
			employee,
		})
	}

	/// Re-issue claims from the current user row, picking up role changes
	/// made since the session was issued.
	#[tracing::instrument(skip(self, claims), fields(user_id = %claims.user_id))]
	pub async fn refresh_session(&self, claims: &SessionClaims) -> Result<SessionClaims> {
		let user = self
			.users
			.get_user_by_id(&claims.user_id)
			.await?
			.ok_or_else(|| ProvisioningError::UserNotFound(claims.user_id.to_string()))?;

		if user.role != claims.role {
			tracing::info!(from = %claims.role, to = %user.role, "role changed since session was issued");
		}
		Ok(SessionClaims::from(&user))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::department::DepartmentResolver;
	use crate::employee_id::EmployeeIdGenerator;
	use chrono::{NaiveDate, Utc};
	use roster_server_auth::{EmployeeProfile, EmployeeRecordId, Role, User, UserId};
	use roster_server_db::testing::create_test_pool;
	use roster_server_db::{DepartmentRepository, EmployeeRepository, UserRepository};

	struct Harness {
		service: SignInService,
		users: Arc<UserRepository>,
		employees: Arc<EmployeeRepository>,
	}

	async fn harness(domain: Option<&str>, default_department: &str) -> Harness {
		let pool = create_test_pool().await;
		let users = Arc::new(UserRepository::new(pool.clone()));
		let departments = Arc::new(DepartmentRepository::new(pool.clone()));
		let employees = Arc::new(EmployeeRepository::new(pool));

		let provisioner = EmployeeProvisioner::new(
			employees.clone(),
			DepartmentResolver::new(departments),
			EmployeeIdGenerator::new(employees.clone(), "EMP", 4),
			default_department,
			5,
		);
		let service = SignInService::new(
			DomainAllowlist::new(domain),
			IdentityLinker::new(users.clone()),
			provisioner,
			users.clone(),
		);
		Harness {
			service,
			users,
			employees,
		}
	}

	fn identity(email: &str, name: &str) -> VerifiedIdentity {
		VerifiedIdentity {
			email: email.to_string(),
			display_name: name.to_string(),
		}
	}

	fn expect_allowed(outcome: SignInOutcome) -> (SessionClaims, bool, Option<Employee>) {
		match outcome {
			SignInOutcome::Allowed {
				claims,
				is_new_user,
				employee,
			} => (claims, is_new_user, employee),
			SignInOutcome::Denied(reason) => panic!("unexpected denial: {reason:?}"),
		}
	}

	#[tokio::test]
	async fn test_allowed_sign_in_links_and_provisions() {
		let h = harness(Some("company.com"), "General").await;

		let outcome = h
			.service
			.sign_in(&identity("Jane@Company.com", "Jane Doe"))
			.await
			.unwrap();
		let (claims, is_new, employee) = expect_allowed(outcome);

		assert!(is_new);
		assert_eq!(claims.email, "jane@company.com");
		assert_eq!(claims.role, Role::User);
		let employee = employee.unwrap();
		assert_eq!(employee.user_id, claims.user_id);
		assert_eq!(employee.first_name, "Jane");
	}

	#[tokio::test]
	async fn test_denied_domain_creates_nothing() {
		let h = harness(Some("company.com"), "General").await;

		let outcome = h
			.service
			.sign_in(&identity("user@other.com", "Outsider"))
			.await
			.unwrap();
		assert_eq!(
			outcome,
			SignInOutcome::Denied(DenyReason::DomainNotAllowed {
				domain: "other.com".to_string()
			})
		);
		assert_eq!(h.users.count_users().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_missing_email_is_denied() {
		let h = harness(None, "General").await;
		let outcome = h.service.sign_in(&identity("", "Ghost")).await.unwrap();
		assert_eq!(outcome, SignInOutcome::Denied(DenyReason::MissingEmail));
	}

	#[tokio::test]
	async fn test_repeat_sign_in_keeps_one_employee() {
		let h = harness(None, "General").await;

		let (first, _, first_employee) = expect_allowed(
			h.service
				.sign_in(&identity("a@company.com", "A B"))
				.await
				.unwrap(),
		);
		let (second, is_new, second_employee) = expect_allowed(
			h.service
				.sign_in(&identity("a@company.com", "A B"))
				.await
				.unwrap(),
		);

		assert!(!is_new);
		assert_eq!(first.user_id, second.user_id);
		assert_eq!(first_employee.unwrap().id, second_employee.unwrap().id);
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_concurrent_first_sign_ins() {
		let h = harness(Some("company.com"), "General").await;
		let who = identity("race@company.com", "Race Condition");

		let (a, b) = tokio::join!(h.service.sign_in(&who), h.service.sign_in(&who));
		let (a, _, ea) = expect_allowed(a.unwrap());
		let (b, _, eb) = expect_allowed(b.unwrap());

		assert_eq!(a.user_id, b.user_id);
		assert_eq!(ea.unwrap().id, eb.unwrap().id);
		assert_eq!(h.users.count_users().await.unwrap(), 1);
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_provisioning_failure_does_not_block_sign_in() {
		// A blank default department makes provisioning fail every time.
		let h = harness(None, "   ").await;

		let (claims, is_new, employee) = expect_allowed(
			h.service
				.sign_in(&identity("a@company.com", "A"))
				.await
				.unwrap(),
		);
		assert!(is_new);
		assert!(employee.is_none());
		assert_eq!(claims.email, "a@company.com");
		assert_eq!(h.employees.count_employees().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_exhausted_id_sequence_does_not_block_sign_in() {
		let h = harness(None, "General").await;
		let existing = User::new("old@company.com", "Old Timer");
		h.users.create_user(&existing).await.unwrap();
		let now = Utc::now();
		h.employees
			.create_employee(&Employee {
				id: EmployeeRecordId::generate(),
				user_id: existing.id,
				employee_id: format!("EMP{}", u64::MAX),
				department_id: None,
				first_name: "Old".to_string(),
				last_name: "Timer".to_string(),
				position: "Employee".to_string(),
				join_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
				profile: EmployeeProfile::default(),
				created_at: now,
				updated_at: now,
			})
			.await
			.unwrap();

		let (claims, is_new, employee) = expect_allowed(
			h.service
				.sign_in(&identity("new@company.com", "New Person"))
				.await
				.unwrap(),
		);
		assert!(is_new);
		assert!(employee.is_none());
		assert_eq!(claims.email, "new@company.com");
		assert_eq!(h.employees.count_employees().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_refresh_picks_up_role_change() {
		let h = harness(None, "General").await;
		let (claims, _, _) = expect_allowed(
			h.service
				.sign_in(&identity("boss@company.com", "Boss"))
				.await
				.unwrap(),
		);
		assert_eq!(claims.role, Role::User);

		h.users.update_role(&claims.user_id, Role::Admin).await.unwrap();

		// Issued claims are a snapshot until refreshed.
		assert_eq!(claims.role, Role::User);
		let refreshed = h.service.refresh_session(&claims).await.unwrap();
		assert_eq!(refreshed.role, Role::Admin);
		assert_eq!(refreshed.user_id, claims.user_id);
	}

	#[tokio::test]
	async fn test_refresh_for_unknown_user() {
		let h = harness(None, "General").await;
		let claims = SessionClaims {
			user_id: UserId::generate(),
			email: "gone@company.com".to_string(),
			role: Role::User,
		};
		let err = h.service.refresh_session(&claims).await.unwrap_err();
		assert!(matches!(err, ProvisioningError::UserNotFound(_)));
	}
}
