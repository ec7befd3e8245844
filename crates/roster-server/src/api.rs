// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use roster_common_config::SecretString;
use roster_server_auth::DomainAllowlist;
use roster_server_config::ServerConfig;
use roster_server_db::{DepartmentRepository, EmployeeRepository, UserRepository};
use roster_server_import::{BulkReconciler, DepartmentImporter};
use roster_server_provisioning::{
	DepartmentResolver, EmployeeIdGenerator, EmployeeProvisioner, IdentityLinker, SignInService,
};
use sqlx::SqlitePool;

use crate::auth_middleware::{bearer_auth_middleware, BearerToken};
use crate::routes;

#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<UserRepository>,
	pub employee_repo: Arc<EmployeeRepository>,
	pub sign_in: Arc<SignInService>,
	pub reconciler: Arc<BulkReconciler>,
	pub department_importer: Arc<DepartmentImporter>,
	pub callback_token: Option<SecretString>,
	pub import_token: Option<SecretString>,
	pub import_enabled: bool,
}

/// Wire repositories and services from a migrated pool.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let user_repo = Arc::new(UserRepository::new(pool.clone()));
	let employee_repo = Arc::new(EmployeeRepository::new(pool.clone()));

	let departments = DepartmentResolver::new(Arc::new(DepartmentRepository::new(pool.clone())));
	let linker = IdentityLinker::new(user_repo.clone());
	let provisioner = EmployeeProvisioner::new(
		employee_repo.clone(),
		departments.clone(),
		EmployeeIdGenerator::new(
			employee_repo.clone(),
			config.provisioning.employee_id_prefix.clone(),
			config.provisioning.employee_id_width,
		),
		config.provisioning.default_department.clone(),
		config.provisioning.employee_id_max_attempts,
	);

	let sign_in = SignInService::new(
		DomainAllowlist::new(config.auth.allowed_email_domain.as_deref()),
		linker.clone(),
		provisioner,
		user_repo.clone(),
	);
	match sign_in.allowlist().domain() {
		Some(domain) => tracing::info!(domain, "email domain allowlist enabled"),
		None => tracing::warn!("email domain allowlist disabled, any verified email may sign in"),
	}

	let reconciler = BulkReconciler::new(departments.clone(), linker, employee_repo.clone());
	let department_importer = DepartmentImporter::new(departments);

	AppState {
		pool,
		user_repo,
		employee_repo,
		sign_in: Arc::new(sign_in),
		reconciler: Arc::new(reconciler),
		department_importer: Arc::new(department_importer),
		callback_token: config.auth.callback_token.clone(),
		import_token: config.import.token.clone(),
		import_enabled: config.import.enabled,
	}
}

pub fn create_router(state: AppState) -> Router {
	let auth = Router::new()
		.route("/auth/sign-in", post(routes::auth::sign_in))
		.route("/auth/session/refresh", post(routes::auth::refresh_session))
		.route_layer(middleware::from_fn_with_state(
			BearerToken::new("auth", state.callback_token.clone()),
			bearer_auth_middleware,
		));

	let mut router = Router::new()
		.route("/health", get(routes::health::health_check))
		.merge(auth);

	if state.import_enabled {
		let import = Router::new()
			.route(
				"/api/employees/bulk-import",
				post(routes::import::import_employees),
			)
			.route(
				"/api/departments/bulk-import",
				post(routes::import::import_departments),
			)
			.route_layer(middleware::from_fn_with_state(
				BearerToken::new("import", state.import_token.clone()),
				bearer_auth_middleware,
			));
		router = router.merge(import);
	}

	router.with_state(state)
}
