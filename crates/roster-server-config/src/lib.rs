// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Roster server.
//!
//! Sources are merged in precedence order:
//! 1. Environment variables (`ROSTER_SERVER_*`)
//! 2. Config file (`/etc/roster/server.toml` or an explicit path)
//! 3. Built-in defaults
//!
//! Secrets (`ROSTER_SERVER_IMPORT_TOKEN`, `ROSTER_SERVER_AUTH_CALLBACK_TOKEN`)
//! only come from the environment and support the `*_FILE` convention.

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use roster_common_config::load_secret_env;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub provisioning: ProvisioningConfig,
	pub import: ImportConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration using the system config file.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let callback_token = load_secret_env("ROSTER_SERVER_AUTH_CALLBACK_TOKEN")?;
	let import_token = load_secret_env("ROSTER_SERVER_IMPORT_TOKEN")?;

	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		auth: layer.auth.unwrap_or_default().finalize(callback_token),
		provisioning: layer.provisioning.unwrap_or_default().finalize(),
		import: layer.import.unwrap_or_default().finalize(import_token),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		allowed_email_domain = config.auth.allowed_email_domain.as_deref().unwrap_or("<any>"),
		import_enabled = config.import.enabled,
		import_token_configured = config.import.token.is_some(),
		"Server configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	let provisioning = &config.provisioning;

	if provisioning.default_department.trim().is_empty() {
		return Err(ConfigError::Validation(
			"default_department must not be empty".to_string(),
		));
	}
	if provisioning.employee_id_prefix.is_empty()
		|| provisioning.employee_id_prefix.chars().any(|c| c.is_ascii_digit())
	{
		return Err(ConfigError::Validation(format!(
			"employee_id_prefix '{}' must be non-empty and contain no digits",
			provisioning.employee_id_prefix
		)));
	}
	if !(1..=12).contains(&provisioning.employee_id_width) {
		return Err(ConfigError::InvalidValue {
			key: "employee_id_width".to_string(),
			message: format!("{} is outside 1..=12", provisioning.employee_id_width),
		});
	}
	if provisioning.employee_id_max_attempts == 0 {
		return Err(ConfigError::InvalidValue {
			key: "employee_id_max_attempts".to_string(),
			message: "must be at least 1".to_string(),
		});
	}

	Ok(())
}
