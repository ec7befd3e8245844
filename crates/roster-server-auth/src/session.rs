// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session claims.
//!
//! Claims are a snapshot of the user row taken when the session is issued or
//! refreshed. A role change made afterwards is only visible once the session
//! is refreshed; issued claims are never rewritten in place.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
	pub user_id: UserId,
	pub email: String,
	pub role: Role,
}

impl SessionClaims {
	pub fn is_admin(&self) -> bool {
		self.role.is_admin()
	}
}

impl From<&User> for SessionClaims {
	fn from(user: &User) -> Self {
		Self {
			user_id: user.id,
			email: user.email.clone(),
			role: user.role,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn claims_snapshot_user_row() {
		let mut user = User::new("admin@company.com", "Ada Admin");
		user.role = Role::Admin;

		let claims = SessionClaims::from(&user);
		assert_eq!(claims.user_id, user.id);
		assert_eq!(claims.email, "admin@company.com");
		assert!(claims.is_admin());
	}

	#[test]
	fn claims_json_shape() {
		let user = User::new("u@company.com", "U");
		let json = serde_json::to_value(SessionClaims::from(&user)).unwrap();
		assert_eq!(json["email"], "u@company.com");
		assert_eq!(json["role"], "USER");
		assert!(json["userId"].is_string());
	}
}
