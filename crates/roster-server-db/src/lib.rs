// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Roster server.
//!
//! Each entity has a `*Store` trait (the seam services depend on) and a
//! SQLite-backed `*Repository` implementing it. Repository methods carry the
//! tracing instrumentation; trait impls delegate to them.
//!
//! Uniqueness is enforced by the schema. Repositories translate constraint
//! violations into [`DbError::Conflict`], or into a typed outcome where the
//! caller needs to know which key collided ([`EmployeeInsert`]).

pub mod department;
pub mod employee;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod user;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use department::{DepartmentRepository, DepartmentStore};
pub use employee::{EmployeeImport, EmployeeInsert, EmployeeRepository, EmployeeStore, ImportOutcome};
pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::{create_pool, ping};
pub use user::{UserRepository, UserStore};
