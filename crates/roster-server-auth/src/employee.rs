// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee records and the field sets they can be edited through.
//!
//! Editing is split by who is doing it:
//! - [`AdminEmployeeUpdate`] covers every mutable field.
//! - [`SelfServiceEmployeeUpdate`] covers contact details only. It rejects
//!   unknown fields on deserialization, so a user cannot smuggle in a
//!   position or department change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DepartmentId, EmployeeRecordId, UserId};

/// The employee record linked one-to-one with a [`crate::User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
	pub id: EmployeeRecordId,
	pub user_id: UserId,
	/// Human-readable identifier, unique across the directory (`EMP0042`).
	pub employee_id: String,
	pub department_id: Option<DepartmentId>,
	pub first_name: String,
	pub last_name: String,
	pub position: String,
	pub join_date: NaiveDate,
	#[serde(flatten)]
	pub profile: EmployeeProfile,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Employee {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}
}

/// Optional personal details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
	pub phone_number: Option<String>,
	pub date_of_birth: Option<NaiveDate>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub zip_code: Option<String>,
	pub country: Option<String>,
	pub emergency_contact_name: Option<String>,
	pub emergency_contact_phone: Option<String>,
	pub emergency_contact_relation: Option<String>,
	#[serde(default)]
	pub married: bool,
	pub marriage_anniversary: Option<NaiveDate>,
	pub alternate_email: Option<String>,
	pub pan_card_url: Option<String>,
	pub bank_account_holder_name: Option<String>,
	pub bank_account_number: Option<String>,
	#[serde(rename = "bankIFSCCode", alias = "bankIfscCode")]
	pub bank_ifsc_code: Option<String>,
}

/// Administrative edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminEmployeeUpdate {
	pub employee_id: Option<String>,
	pub department_id: Option<DepartmentId>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub position: Option<String>,
	pub join_date: Option<NaiveDate>,
	pub phone_number: Option<String>,
	pub date_of_birth: Option<NaiveDate>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub zip_code: Option<String>,
	pub country: Option<String>,
	pub emergency_contact_name: Option<String>,
	pub emergency_contact_phone: Option<String>,
	pub emergency_contact_relation: Option<String>,
	pub married: Option<bool>,
	pub marriage_anniversary: Option<NaiveDate>,
	pub alternate_email: Option<String>,
	pub pan_card_url: Option<String>,
	pub bank_account_holder_name: Option<String>,
	pub bank_account_number: Option<String>,
	#[serde(rename = "bankIFSCCode", alias = "bankIfscCode")]
	pub bank_ifsc_code: Option<String>,
}

/// Edit an employee may make to their own record. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelfServiceEmployeeUpdate {
	pub phone_number: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub zip_code: Option<String>,
	pub country: Option<String>,
	pub emergency_contact_name: Option<String>,
	pub emergency_contact_phone: Option<String>,
	pub emergency_contact_relation: Option<String>,
}

impl AdminEmployeeUpdate {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

impl SelfServiceEmployeeUpdate {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}
