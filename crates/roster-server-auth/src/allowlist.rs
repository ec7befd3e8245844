// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email-domain gate applied before an identity is linked.

use crate::user::{email_domain, normalize_email};

/// Configured values that switch the check off.
const DISABLED_SENTINELS: &[&str] = &["disabled", "*"];

/// Decides whether an email may sign in.
///
/// The domain is fixed at construction. An unset, blank, `"disabled"` or
/// `"*"` domain allows every email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAllowlist {
	domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowlistDecision {
	Allow,
	Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
	MissingEmail,
	/// `domain` is whatever followed the last `@` in the rejected email.
	DomainNotAllowed { domain: String },
}

impl DomainAllowlist {
	pub fn new(configured: Option<&str>) -> Self {
		let domain = configured
			.map(|d| d.trim().trim_start_matches('@').to_lowercase())
			.filter(|d| !d.is_empty())
			.filter(|d| !DISABLED_SENTINELS.iter().any(|s| d.eq_ignore_ascii_case(s)));
		Self { domain }
	}

	pub fn allow_all() -> Self {
		Self { domain: None }
	}

	pub fn domain(&self) -> Option<&str> {
		self.domain.as_deref()
	}

	pub fn is_enforced(&self) -> bool {
		self.domain.is_some()
	}

	pub fn check(&self, email: &str) -> AllowlistDecision {
		let email = normalize_email(email);
		if email.is_empty() {
			return AllowlistDecision::Deny(DenyReason::MissingEmail);
		}

		let Some(domain) = &self.domain else {
			return AllowlistDecision::Allow;
		};

		let suffix_ok = email
			.strip_suffix(domain.as_str())
			.is_some_and(|head| head.ends_with('@'));
		if suffix_ok {
			AllowlistDecision::Allow
		} else {
			AllowlistDecision::Deny(DenyReason::DomainNotAllowed {
				domain: email_domain(&email).to_string(),
			})
		}
	}
}

impl AllowlistDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, AllowlistDecision::Allow)
	}
}

impl DenyReason {
	/// Error code placed in the redirect query.
	pub fn code(&self) -> &'static str {
		match self {
			DenyReason::MissingEmail => "MissingEmail",
			DenyReason::DomainNotAllowed { .. } => "EmailNotAllowed",
		}
	}

	/// Path of the sign-in error page this denial redirects to, e.g.
	/// `/auth/error?error=EmailNotAllowed&domain=other.com`.
	pub fn redirect_path(&self) -> String {
		let mut query = url::form_urlencoded::Serializer::new(String::new());
		query.append_pair("error", self.code());
		if let DenyReason::DomainNotAllowed { domain } = self {
			query.append_pair("domain", domain);
		}
		format!("/auth/error?{}", query.finish())
	}
}
