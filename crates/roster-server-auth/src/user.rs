// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Users and email handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// A person who can sign in.
///
/// Users are keyed by normalized email. They are created on first sign-in or
/// by a bulk import and never deleted by provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub display_name: String,
	pub role: Role,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// A new user with the default role. `email` is normalized; a blank
	/// `display_name` falls back to the email's local part.
	pub fn new(email: &str, display_name: &str) -> Self {
		let email = normalize_email(email);
		let display_name = match display_name.trim() {
			"" => email_local_part(&email).to_string(),
			name => name.to_string(),
		};
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email,
			display_name,
			role: Role::User,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Trim and lowercase. All email comparisons go through this.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Text before the last `@`, or the whole input when there is none.
pub fn email_local_part(email: &str) -> &str {
	match email.rfind('@') {
		Some(idx) => &email[..idx],
		None => email,
	}
}

/// Text after the last `@`, or `""` when there is none.
pub fn email_domain(email: &str) -> &str {
	match email.rfind('@') {
		Some(idx) => &email[idx + 1..],
		None => "",
	}
}

/// Derives `(first_name, last_name)` for an auto-provisioned employee.
///
/// The first whitespace-separated token of the display name becomes the first
/// name and the remainder the last name. A blank display name falls back to
/// the email local part, then to `"Employee"`; a missing remainder yields
/// `"Name"`.
pub fn split_display_name(display_name: &str, email: &str) -> (String, String) {
	let source = match display_name.trim() {
		"" => match email_local_part(email.trim()) {
			"" => "Employee",
			local => local,
		},
		name => name,
	};

	let mut parts = source.split_whitespace();
	let first = parts.next().unwrap_or("Employee").to_string();
	let rest = parts.collect::<Vec<_>>().join(" ");
	let last = if rest.is_empty() {
		"Name".to_string()
	} else {
		rest
	};
	(first, last)
}
