// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, ImportConfigLayer, LoggingConfigLayer,
	ProvisioningConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/roster/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!(path = %self.path.display(), "parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `ROSTER_SERVER_<FIELD>`. `ALLOWED_EMAIL_DOMAIN` is honoured
/// when the prefixed variable is absent.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("ROSTER_SERVER_HOST"),
				port: env_parse("ROSTER_SERVER_PORT")?,
				base_url: env_var("ROSTER_SERVER_BASE_URL"),
			}),
			database: Some(DatabaseConfigLayer {
				url: env_var("ROSTER_SERVER_DATABASE_URL"),
			}),
			auth: Some(AuthConfigLayer {
				allowed_email_domain: env_var("ROSTER_SERVER_ALLOWED_EMAIL_DOMAIN")
					.or_else(|| env_var("ALLOWED_EMAIL_DOMAIN")),
			}),
			provisioning: Some(ProvisioningConfigLayer {
				default_department: env_var("ROSTER_SERVER_DEFAULT_DEPARTMENT"),
				employee_id_prefix: env_var("ROSTER_SERVER_EMPLOYEE_ID_PREFIX"),
				employee_id_width: env_parse("ROSTER_SERVER_EMPLOYEE_ID_WIDTH")?,
				employee_id_max_attempts: env_parse("ROSTER_SERVER_EMPLOYEE_ID_MAX_ATTEMPTS")?,
			}),
			import: Some(ImportConfigLayer {
				enabled: env_bool("ROSTER_SERVER_IMPORT_ENABLED"),
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("ROSTER_SERVER_LOG_LEVEL"),
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("cannot parse '{v}'"),
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_empty_layer() {
		let layer = TomlSource::new("/nonexistent/roster/server.toml")
			.load()
			.unwrap();
		assert!(layer.http.is_none());
		assert!(layer.auth.is_none());
	}

	#[test]
	fn test_toml_file_is_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http]\nport = 9001\n\n[auth]\nallowed_email_domain = \"corp.example\"").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9001));
		assert_eq!(
			layer.auth.unwrap().allowed_email_domain.as_deref(),
			Some("corp.example")
		);
	}

	#[test]
	fn test_invalid_toml_is_reported_with_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_parse_rejects_garbage() {
		std::env::set_var("ROSTER_TEST_CONFIG_BAD_PORT", "eighty");
		let err = env_parse::<u16>("ROSTER_TEST_CONFIG_BAD_PORT").unwrap_err();
		assert!(err.to_string().contains("ROSTER_TEST_CONFIG_BAD_PORT"));
		std::env::remove_var("ROSTER_TEST_CONFIG_BAD_PORT");
	}
}
