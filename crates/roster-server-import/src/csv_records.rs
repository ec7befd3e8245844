// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! CSV ingestion for employee records.
//!
//! Header matching ignores case, spaces, underscores and hyphens, so
//! `First Name`, `first_name` and `firstName` all map to the same field.
//! Each field also accepts a few common aliases.

use std::collections::HashMap;

use crate::error::ImportError;
use crate::record::EmployeeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
	Email,
	FullName,
	Role,
	FirstName,
	LastName,
	PhoneNumber,
	DateOfBirth,
	Department,
	Position,
	EmployeeId,
	JoinDate,
	Address,
	City,
	State,
	ZipCode,
	Country,
	EmergencyContactName,
	EmergencyContactPhone,
	EmergencyContactRelation,
	Married,
	MarriageAnniversary,
	AlternateEmail,
	PanCardUrl,
	BankAccountHolderName,
	BankAccountNumber,
	BankIfscCode,
}

/// Aliases in normalized form (see [`normalize_header`]).
const ALIASES: &[(Field, &[&str])] = &[
	(Field::Email, &["email", "emailaddress", "useremail", "mail"]),
	(Field::FullName, &["name", "fullname", "username"]),
	(Field::Role, &["role", "userrole", "accesslevel"]),
	(Field::FirstName, &["firstname", "fname", "givenname"]),
	(Field::LastName, &["lastname", "lname", "surname", "familyname"]),
	(Field::PhoneNumber, &["phonenumber", "phone", "mobile", "contact"]),
	(Field::DateOfBirth, &["dateofbirth", "dob", "birthdate"]),
	(Field::Department, &["department", "dept", "team"]),
	(Field::Position, &["position", "title", "jobtitle"]),
	(Field::EmployeeId, &["employeeid", "empid", "staffid"]),
	(Field::JoinDate, &["joindate", "startdate", "hiredate", "joiningdate"]),
	(Field::Address, &["address", "street", "streetaddress"]),
	(Field::City, &["city"]),
	(Field::State, &["state", "province"]),
	(Field::ZipCode, &["zipcode", "zip", "postalcode"]),
	(Field::Country, &["country"]),
	(
		Field::EmergencyContactName,
		&["emergencycontactname", "emergencycontact", "emergencyname", "ecname"],
	),
	(
		Field::EmergencyContactPhone,
		&["emergencycontactphone", "emergencyphone", "ecphone"],
	),
	(
		Field::EmergencyContactRelation,
		&[
			"emergencycontactrelation",
			"emergencyrelation",
			"emergencyrelationship",
			"ecrelation",
		],
	),
	(Field::Married, &["married", "maritalstatus"]),
	(Field::MarriageAnniversary, &["marriageanniversary", "anniversary"]),
	(Field::AlternateEmail, &["alternateemail", "personalemail"]),
	(Field::PanCardUrl, &["pancardurl", "pancard"]),
	(
		Field::BankAccountHolderName,
		&["bankaccountholdername", "accountholdername"],
	),
	(Field::BankAccountNumber, &["bankaccountnumber", "accountnumber"]),
	(Field::BankIfscCode, &["bankifsccode", "ifsccode", "ifsc"]),
];

/// Lowercase and keep only letters and digits.
pub fn normalize_header(header: &str) -> String {
	header
		.chars()
		.filter(char::is_ascii_alphanumeric)
		.map(|c| c.to_ascii_lowercase())
		.collect()
}

fn field_for(header: &str) -> Option<Field> {
	let normalized = normalize_header(header);
	ALIASES
		.iter()
		.find(|(_, aliases)| aliases.contains(&normalized.as_str()))
		.map(|(field, _)| *field)
}

/// Parse a CSV document with a header row into records.
///
/// Unknown columns are ignored. If several columns map to one field, the
/// first wins. A `name` column fills in first and last name
/// when those columns are absent or blank.
pub fn parse_employee_csv(text: &str) -> Result<Vec<EmployeeRecord>, ImportError> {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(text.as_bytes());

	let mut columns: HashMap<Field, usize> = HashMap::new();
	for (idx, header) in reader.headers()?.iter().enumerate() {
		if let Some(field) = field_for(header) {
			columns.entry(field).or_insert(idx);
		}
	}
	if !columns.contains_key(&Field::Email) {
		return Err(ImportError::InvalidFormat(
			"CSV has no email column".to_string(),
		));
	}

	let mut records = Vec::new();
	for (row, result) in reader.records().enumerate() {
		let row_record = result?;
		let get = |field: Field| -> Option<String> {
			columns
				.get(&field)
				.and_then(|&idx| row_record.get(idx))
				.filter(|v| !v.is_empty())
				.map(str::to_string)
		};

		let mut record = EmployeeRecord {
			first_name: get(Field::FirstName),
			last_name: get(Field::LastName),
			email: get(Field::Email),
			department: get(Field::Department),
			position: get(Field::Position),
			employee_id: get(Field::EmployeeId),
			join_date: get(Field::JoinDate),
			role: get(Field::Role),
			phone_number: get(Field::PhoneNumber),
			date_of_birth: get(Field::DateOfBirth),
			address: get(Field::Address),
			city: get(Field::City),
			state: get(Field::State),
			zip_code: get(Field::ZipCode),
			country: get(Field::Country),
			emergency_contact_name: get(Field::EmergencyContactName),
			emergency_contact_phone: get(Field::EmergencyContactPhone),
			emergency_contact_relation: get(Field::EmergencyContactRelation),
			married: None,
			marriage_anniversary: get(Field::MarriageAnniversary),
			alternate_email: get(Field::AlternateEmail),
			pan_card_url: get(Field::PanCardUrl),
			bank_account_holder_name: get(Field::BankAccountHolderName),
			bank_account_number: get(Field::BankAccountNumber),
			bank_ifsc_code: get(Field::BankIfscCode),
			malformed: None,
		};

		if let Some(raw) = get(Field::Married) {
			record.married = parse_flag(&raw);
			if record.married.is_none() {
				tracing::warn!(row = row + 1, value = %raw, "unrecognized married value ignored");
			}
		}

		if let Some(full_name) = get(Field::FullName) {
			let mut parts = full_name.split_whitespace();
			if record.first_name.is_none() {
				record.first_name = parts.next().map(str::to_string);
			} else {
				parts.next();
			}
			if record.last_name.is_none() {
				let rest = parts.collect::<Vec<_>>().join(" ");
				if !rest.is_empty() {
					record.last_name = Some(rest);
				}
			}
		}

		records.push(record);
	}

	tracing::debug!(rows = records.len(), columns = columns.len(), "parsed employee CSV");
	Ok(records)
}

fn parse_flag(raw: &str) -> Option<bool> {
	match raw.to_ascii_lowercase().as_str() {
		"true" | "yes" | "y" | "1" | "married" => Some(true),
		"false" | "no" | "n" | "0" | "single" | "unmarried" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn maps_aliases_regardless_of_case_and_separators() {
		let csv = "Email Address,First Name,last_name,Dept,Job Title,Emp-ID,Hire Date,ROLE\n\
			ada@company.com,Ada,Lovelace,Engineering,Engineer,EMP0100,2024-03-01,admin\n";
		let records = parse_employee_csv(csv).unwrap();
		assert_eq!(records.len(), 1);

		let r = &records[0];
		assert_eq!(r.email.as_deref(), Some("ada@company.com"));
		assert_eq!(r.first_name.as_deref(), Some("Ada"));
		assert_eq!(r.last_name.as_deref(), Some("Lovelace"));
		assert_eq!(r.department.as_deref(), Some("Engineering"));
		assert_eq!(r.position.as_deref(), Some("Engineer"));
		assert_eq!(r.employee_id.as_deref(), Some("EMP0100"));
		assert_eq!(r.join_date.as_deref(), Some("2024-03-01"));
		assert_eq!(r.role.as_deref(), Some("admin"));
	}

	#[test]
	fn camel_case_headers_match() {
		let csv = "email,firstName,lastName,employeeId,bankIFSCCode\n\
			a@company.com,A,B,EMP1,IFSC0001\n";
		let r = &parse_employee_csv(csv).unwrap()[0];
		assert_eq!(r.employee_id.as_deref(), Some("EMP1"));
		assert_eq!(r.bank_ifsc_code.as_deref(), Some("IFSC0001"));
	}

	#[test]
	fn full_name_fills_missing_names() {
		let csv = "email,name,first_name\n\
			a@company.com,Grace Brewster Hopper,\n\
			b@company.com,Alan Turing,Al\n";
		let records = parse_employee_csv(csv).unwrap();
		assert_eq!(records[0].first_name.as_deref(), Some("Grace"));
		assert_eq!(records[0].last_name.as_deref(), Some("Brewster Hopper"));
		assert_eq!(records[1].first_name.as_deref(), Some("Al"));
		assert_eq!(records[1].last_name.as_deref(), Some("Turing"));
	}

	#[test]
	fn blank_cells_are_none_and_short_rows_are_tolerated() {
		let csv = "email,phone,city\na@company.com,  ,Pune\nb@company.com\n";
		let records = parse_employee_csv(csv).unwrap();
		assert_eq!(records[0].phone_number, None);
		assert_eq!(records[0].city.as_deref(), Some("Pune"));
		assert_eq!(records[1].city, None);
	}

	#[test]
	fn married_column_is_parsed_leniently() {
		let csv = "email,married\na@company.com,Yes\nb@company.com,no\nc@company.com,maybe\n";
		let records = parse_employee_csv(csv).unwrap();
		assert_eq!(records[0].married, Some(true));
		assert_eq!(records[1].married, Some(false));
		assert_eq!(records[2].married, None);
	}

	#[test]
	fn missing_email_column_is_rejected() {
		let err = parse_employee_csv("first_name,last_name\nA,B\n").unwrap_err();
		assert!(matches!(err, ImportError::InvalidFormat(_)));
	}

	proptest! {
		#[test]
		fn normalize_header_is_idempotent(header in "[A-Za-z _-]{0,24}") {
			let once = normalize_header(&header);
			prop_assert_eq!(normalize_header(&once), once.clone());
			prop_assert!(once.chars().all(|c| c.is_ascii_lowercase()));
		}
	}
}
