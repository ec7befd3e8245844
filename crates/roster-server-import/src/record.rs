// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk-import records and their validation.

use chrono::{DateTime, NaiveDate};
use roster_server_auth::{normalize_email, Role};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ImportError;

/// One employee as supplied by an administrator.
///
/// Everything is optional at this stage so a bad record can be reported
/// instead of failing the whole payload; [`EmployeeRecord::validate`] decides
/// what is actually required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub email: Option<String>,
	pub department: Option<String>,
	pub position: Option<String>,
	pub employee_id: Option<String>,
	pub join_date: Option<String>,
	pub role: Option<String>,
	pub phone_number: Option<String>,
	pub date_of_birth: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub zip_code: Option<String>,
	pub country: Option<String>,
	pub emergency_contact_name: Option<String>,
	pub emergency_contact_phone: Option<String>,
	pub emergency_contact_relation: Option<String>,
	pub married: Option<bool>,
	pub marriage_anniversary: Option<String>,
	pub alternate_email: Option<String>,
	pub pan_card_url: Option<String>,
	pub bank_account_holder_name: Option<String>,
	pub bank_account_number: Option<String>,
	#[serde(rename = "bankIFSCCode", alias = "bankIfscCode")]
	pub bank_ifsc_code: Option<String>,
	/// Why the source object could not be read into this shape.
	#[serde(skip)]
	pub(crate) malformed: Option<String>,
}

/// A record that passed validation. Strings are trimmed and blank optionals
/// are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub department: String,
	pub position: String,
	pub employee_id: String,
	pub join_date: NaiveDate,
	pub role: Option<Role>,
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
	pub bank_ifsc_code: Option<String>,
}

impl ValidRecord {
	pub fn display_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}
}

impl EmployeeRecord {
	/// The normalized email, if one was supplied. Used to label errors even
	/// when validation fails.
	pub fn email_label(&self) -> Option<String> {
		clean(&self.email).map(|e| normalize_email(&e))
	}

	/// Check required fields and formats. Returns the first problem found.
	pub fn validate(&self) -> Result<ValidRecord, String> {
		if let Some(reason) = &self.malformed {
			return Err(format!("malformed record: {reason}"));
		}

		let email = required(&self.email, "email")?;
		if !looks_like_email(&email) {
			return Err(format!("email {email} is not a valid address"));
		}

		let role = match clean(&self.role) {
			Some(raw) => Some(
				raw.parse::<Role>()
					.map_err(|_| format!("role must be ADMIN or USER, got {raw}"))?,
			),
			None => None,
		};

		Ok(ValidRecord {
			email: normalize_email(&email),
			first_name: required(&self.first_name, "firstName")?,
			last_name: required(&self.last_name, "lastName")?,
			department: required(&self.department, "department")?,
			position: required(&self.position, "position")?,
			employee_id: required(&self.employee_id, "employeeId")?,
			join_date: parse_date(&required(&self.join_date, "joinDate")?, "joinDate")?,
			role,
			phone_number: clean(&self.phone_number),
			date_of_birth: optional_date(&self.date_of_birth, "dateOfBirth")?,
			address: clean(&self.address),
			city: clean(&self.city),
			state: clean(&self.state),
			zip_code: clean(&self.zip_code),
			country: clean(&self.country),
			emergency_contact_name: clean(&self.emergency_contact_name),
			emergency_contact_phone: clean(&self.emergency_contact_phone),
			emergency_contact_relation: clean(&self.emergency_contact_relation),
			married: self.married,
			marriage_anniversary: optional_date(&self.marriage_anniversary, "marriageAnniversary")?,
			alternate_email: clean(&self.alternate_email),
			pan_card_url: clean(&self.pan_card_url),
			bank_account_holder_name: clean(&self.bank_account_holder_name),
			bank_account_number: clean(&self.bank_account_number),
			bank_ifsc_code: clean(&self.bank_ifsc_code),
		})
	}
}

/// Accepts a bare JSON array or `{"employees": [...]}`.
///
/// Only the envelope can fail the payload. An element with the wrong shape
/// becomes a record that fails validation with the decode error.
pub fn parse_employee_json(body: &[u8]) -> Result<Vec<EmployeeRecord>, ImportError> {
	let items = match serde_json::from_slice::<Value>(body)? {
		Value::Array(items) => items,
		Value::Object(mut object) => match object.remove("employees") {
			Some(Value::Array(items)) => items,
			_ => return Err(unexpected_envelope()),
		},
		_ => return Err(unexpected_envelope()),
	};

	Ok(items.into_iter().map(record_from_value).collect())
}

fn unexpected_envelope() -> ImportError {
	ImportError::InvalidFormat(
		"expected an array of employees or an object with an employees array".to_string(),
	)
}

fn record_from_value(value: Value) -> EmployeeRecord {
	let email = value.get("email").and_then(Value::as_str).map(str::to_string);
	serde_json::from_value(value).unwrap_or_else(|e: serde_json::Error| EmployeeRecord {
		email,
		malformed: Some(e.to_string()),
		..Default::default()
	})
}

fn clean(value: &Option<String>) -> Option<String> {
	value
		.as_deref()
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_string)
}

fn required(value: &Option<String>, field: &str) -> Result<String, String> {
	clean(value).ok_or_else(|| format!("{field} is required"))
}

fn looks_like_email(email: &str) -> bool {
	if email.chars().any(char::is_whitespace) {
		return false;
	}
	match email.rsplit_once('@') {
		Some((local, domain)) => {
			!local.is_empty()
				&& domain.contains('.')
				&& !domain.starts_with('.')
				&& !domain.ends_with('.')
		}
		None => false,
	}
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date is taken.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, String> {
	let raw = raw.trim();
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
		.map_err(|_| format!("{field} must be a date (YYYY-MM-DD), got {raw}"))
}

fn optional_date(value: &Option<String>, field: &str) -> Result<Option<NaiveDate>, String> {
	clean(value).map(|raw| parse_date(&raw, field)).transpose()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn complete() -> EmployeeRecord {
		EmployeeRecord {
			first_name: Some("Ada".to_string()),
			last_name: Some("Lovelace".to_string()),
			email: Some("Ada@Company.com".to_string()),
			department: Some("Engineering".to_string()),
			position: Some("Engineer".to_string()),
			employee_id: Some("EMP0100".to_string()),
			join_date: Some("2024-03-01".to_string()),
			..Default::default()
		}
	}

	#[test]
	fn complete_record_is_valid() {
		let valid = complete().validate().unwrap();
		assert_eq!(valid.email, "ada@company.com");
		assert_eq!(valid.display_name(), "Ada Lovelace");
		assert_eq!(valid.join_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
		assert_eq!(valid.role, None);
	}

	#[test]
	fn missing_required_field_is_named() {
		let mut record = complete();
		record.employee_id = Some("  ".to_string());
		assert_eq!(record.validate().unwrap_err(), "employeeId is required");

		let mut record = complete();
		record.position = None;
		assert_eq!(record.validate().unwrap_err(), "position is required");
	}

	#[test]
	fn rejects_malformed_email() {
		for bad in ["ada", "ada@", "@company.com", "ada@company", "a da@company.com"] {
			let mut record = complete();
			record.email = Some(bad.to_string());
			assert!(record.validate().is_err(), "{bad} should be rejected");
		}
	}

	#[test]
	fn accepts_rfc3339_join_date() {
		let mut record = complete();
		record.join_date = Some("2024-03-01T09:30:00Z".to_string());
		assert_eq!(
			record.validate().unwrap().join_date,
			NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
		);
	}

	#[test]
	fn rejects_unparseable_dates() {
		let mut record = complete();
		record.join_date = Some("March 1st".to_string());
		assert!(record.validate().unwrap_err().contains("joinDate"));

		let mut record = complete();
		record.date_of_birth = Some("31/12/1990".to_string());
		assert!(record.validate().unwrap_err().contains("dateOfBirth"));
	}

	#[test]
	fn role_is_case_insensitive() {
		let mut record = complete();
		record.role = Some("admin".to_string());
		assert_eq!(record.validate().unwrap().role, Some(Role::Admin));

		record.role = Some("superuser".to_string());
		assert!(record.validate().unwrap_err().contains("role"));
	}

	#[test]
	fn json_accepts_array_and_wrapped_forms() {
		let array = br#"[{"email":"a@company.com","bankIFSCCode":"IFSC1"}]"#;
		let records = parse_employee_json(array).unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].bank_ifsc_code.as_deref(), Some("IFSC1"));

		let wrapped = br#"{"employees":[{"email":"a@company.com"},{"email":"b@company.com"}]}"#;
		assert_eq!(parse_employee_json(wrapped).unwrap().len(), 2);

		assert!(matches!(
			parse_employee_json(b"{\"people\": []}"),
			Err(ImportError::InvalidFormat(_))
		));
		assert!(matches!(
			parse_employee_json(b"\"employees\""),
			Err(ImportError::InvalidFormat(_))
		));
	}

	#[test]
	fn mistyped_element_fails_only_its_own_record() {
		let body = br#"[
			{"email":"a@company.com","employeeId":"EMP0001"},
			{"email":"B@company.com","employeeId":1002},
			{"email":"c@company.com","married":"yes"},
			42
		]"#;
		let records = parse_employee_json(body).unwrap();
		assert_eq!(records.len(), 4);

		assert_eq!(records[0].employee_id.as_deref(), Some("EMP0001"));
		assert_eq!(records[0].malformed, None);

		let err = records[1].validate().unwrap_err();
		assert!(err.starts_with("malformed record: invalid type"), "{err}");
		assert_eq!(records[1].email_label().as_deref(), Some("b@company.com"));

		assert!(records[2].validate().unwrap_err().starts_with("malformed record"));
		assert!(records[3].validate().is_err());
		assert_eq!(records[3].email_label(), None);
	}

	proptest! {
		#[test]
		fn iso_dates_always_parse(y in 1900i32..2100, m in 1u32..=12, d in 1u32..=28) {
			let raw = format!("{y:04}-{m:02}-{d:02}");
			prop_assert_eq!(
				parse_date(&raw, "joinDate").unwrap(),
				NaiveDate::from_ymd_opt(y, m, d).unwrap()
			);
		}
	}
}
