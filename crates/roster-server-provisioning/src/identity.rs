// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use roster_server_auth::{normalize_email, User};
use roster_server_db::{DbError, UserStore};

use crate::error::ProvisioningError;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedIdentity {
	pub user: User,
	pub is_new_user: bool,
}

/// Resolves a verified identity to its [`User`], creating the user on first
/// sight.
///
/// Linking never changes an existing user's role or display name.
#[derive(Clone)]
pub struct IdentityLinker {
	users: Arc<dyn UserStore>,
}

impl IdentityLinker {
	pub fn new(users: Arc<dyn UserStore>) -> Self {
		Self { users }
	}

	/// Find the user for `email`, or create one with the default role.
	///
	/// Two first-time sign-ins racing on the same email both end up with the
	/// same user: the loser's insert hits the unique constraint and it reads
	/// back the winner's row.
	#[tracing::instrument(skip(self, display_name), fields(email = %email))]
	pub async fn link_identity(&self, email: &str, display_name: &str) -> Result<LinkedIdentity> {
		let email = normalize_email(email);
		if email.is_empty() {
			return Err(ProvisioningError::InvalidRequest(
				"email is required".to_string(),
			));
		}

		if let Some(user) = self.users.get_user_by_email(&email).await? {
			tracing::debug!(user_id = %user.id, "identity linked to existing user");
			return Ok(LinkedIdentity {
				user,
				is_new_user: false,
			});
		}

		let user = User::new(&email, display_name);
		match self.users.create_user(&user).await {
			Ok(()) => {
				tracing::info!(user_id = %user.id, "created user for new identity");
				Ok(LinkedIdentity {
					user,
					is_new_user: true,
				})
			}
			Err(DbError::Conflict(_)) => {
				let existing = self.users.get_user_by_email(&email).await?.ok_or_else(|| {
					ProvisioningError::UnresolvedConflict(format!("user {email} conflicted but is missing"))
				})?;
				tracing::debug!(user_id = %existing.id, "lost user creation race, using existing user");
				Ok(LinkedIdentity {
					user: existing,
					is_new_user: false,
				})
			}
			Err(e) => Err(e.into()),
		}
	}
}
