// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Roster server binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_server::{create_app_state, create_router, AppState, ServerConfig};
use roster_server_import::{
	parse_department_json, parse_department_lines, parse_employee_csv, parse_employee_json,
};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Roster server - identity provisioning and employee directory import.
#[derive(Parser, Debug)]
#[command(name = "roster-server", about = "Roster directory server", version)]
struct Args {
	/// Config file to use instead of /etc/roster/server.toml
	#[arg(long, global = true, env = "ROSTER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Import employees from a CSV or JSON file
	ImportEmployees {
		/// `.csv` files are parsed as CSV, anything else as JSON
		file: PathBuf,
	},
	/// Import departments from a JSON array or a file with one name per line
	ImportDepartments { file: PathBuf },
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let command = args.command.unwrap_or(Command::Serve);
	if let Command::Version = command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => roster_server_config::load_config_with_file(path),
		None => roster_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let pool = roster_server_db::create_pool(&config.database.url)
		.await
		.context("failed to open database")?;
	roster_server_db::run_migrations(&pool)
		.await
		.context("failed to run migrations")?;

	let state = create_app_state(pool, &config);

	match command {
		Command::Serve => serve(state, &config).await,
		Command::ImportEmployees { file } => import_employees(&state, &file).await,
		Command::ImportDepartments { file } => import_departments(&state, &file).await,
		Command::Version => Ok(()),
	}
}

async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;

	tracing::info!(
		addr = %addr,
		base_url = %config.http.base_url,
		database = %config.database.url,
		"starting roster-server"
	);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("server error")?;

	tracing::info!("server stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
	tracing::info!("shutdown signal received");
}

fn is_csv(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn is_json(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

async fn import_employees(state: &AppState, file: &Path) -> anyhow::Result<()> {
	let contents = tokio::fs::read_to_string(file)
		.await
		.with_context(|| format!("failed to read {}", file.display()))?;
	let records = if is_csv(file) {
		parse_employee_csv(&contents)?
	} else {
		parse_employee_json(contents.as_bytes())?
	};

	let report = state.reconciler.reconcile(&records).await?;
	println!(
		"Processed {} records: {} created, {} updated, {} errors",
		records.len(),
		report.created,
		report.updated,
		report.errors.len()
	);
	for error in report.error_messages() {
		println!("  {error}");
	}
	Ok(())
}

async fn import_departments(state: &AppState, file: &Path) -> anyhow::Result<()> {
	let contents = tokio::fs::read_to_string(file)
		.await
		.with_context(|| format!("failed to read {}", file.display()))?;
	let names = if is_json(file) {
		parse_department_json(contents.as_bytes())?
	} else {
		parse_department_lines(&contents)
	};

	let report = state.department_importer.import(&names).await?;
	println!(
		"Processed {} names: {} created, {} skipped, {} errors",
		names.len(),
		report.created,
		report.skipped,
		report.errors.len()
	);
	for name in &report.created_departments {
		println!("  + {name}");
	}
	for error in report.error_messages() {
		println!("  {error}");
	}
	Ok(())
}
