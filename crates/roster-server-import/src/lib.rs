// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk reconciliation of employee and department lists.
//!
//! Input arrives as JSON or CSV ([`parse_employee_json`],
//! [`parse_employee_csv`]), is validated per record, and is applied by
//! [`BulkReconciler`]. Bad records are collected in the report; only an
//! unreachable database stops a batch.

pub mod csv_records;
pub mod department;
pub mod error;
pub mod reconcile;
pub mod record;

pub use csv_records::parse_employee_csv;
pub use department::{
	parse_department_json, parse_department_lines, DepartmentImportReport, DepartmentImporter,
};
pub use error::{ImportError, RecordError, RecordErrorKind};
pub use reconcile::{BulkReconciler, ReconcileReport};
pub use record::{parse_employee_json, EmployeeRecord, ValidRecord};
