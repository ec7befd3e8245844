// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity linking and employee provisioning for Roster.
//!
//! Sign-in runs in two phases:
//! 1. Authentication: [`DomainAllowlist`](roster_server_auth::DomainAllowlist)
//!    check, then [`IdentityLinker`] resolves or creates the user.
//! 2. Provisioning: [`EmployeeProvisioner`] makes sure the user has exactly one
//!    employee record. Failures here are logged and never fail the sign-in.
//!
//! Every creation path is race-safe without locks: write, and on a uniqueness
//! conflict re-read and continue with whatever won.

mod department;
mod employee;
mod employee_id;
mod error;
mod identity;
mod sign_in;

pub use department::{DepartmentResolver, ResolvedDepartment};
pub use employee::EmployeeProvisioner;
pub use employee_id::{format_employee_id, EmployeeIdGenerator};
pub use error::ProvisioningError;
pub use identity::{IdentityLinker, LinkedIdentity};
pub use sign_in::{SignInOutcome, SignInService, VerifiedIdentity};

pub type Result<T> = std::result::Result<T, ProvisioningError>;
