// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core directory types for Roster.
//!
//! - ID newtypes and [`Role`] in [`types`]
//! - [`User`], [`Department`] and [`Employee`] entities
//! - [`DomainAllowlist`], the email-domain gate applied at sign-in
//! - [`SessionClaims`], the identity stamped into a session after linking
//! - [`AdminEmployeeUpdate`] and [`SelfServiceEmployeeUpdate`], the two field
//!   sets an employee record can be edited through

pub mod allowlist;
pub mod department;
pub mod employee;
pub mod session;
pub mod types;
pub mod user;

pub use allowlist::{AllowlistDecision, DenyReason, DomainAllowlist};
pub use department::Department;
pub use employee::{AdminEmployeeUpdate, Employee, EmployeeProfile, SelfServiceEmployeeUpdate};
pub use session::SessionClaims;
pub use types::{DepartmentId, EmployeeRecordId, Role, RoleParseError, UserId};
pub use user::{email_domain, email_local_part, normalize_email, split_display_name, User};
