// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-in and session refresh, called by the identity bridge after the
//! provider has verified the user.

use axum::{
	extract::State,
	response::{IntoResponse, Redirect, Response},
	Json,
};
use roster_server_auth::SessionClaims;
use roster_server_provisioning::{SignInOutcome, VerifiedIdentity};
use serde::Serialize;

use crate::api::AppState;
use crate::error::ServerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
	pub claims: SessionClaims,
	pub is_new_user: bool,
	/// Absent when provisioning failed; sign-in still succeeds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub employee_id: Option<String>,
}

/// POST /auth/sign-in
///
/// Allowed identities get their session claims. Denied identities are sent
/// to the error page with a reason code.
pub async fn sign_in(
	State(state): State<AppState>,
	Json(identity): Json<VerifiedIdentity>,
) -> Result<Response, ServerError> {
	match state.sign_in.sign_in(&identity).await? {
		SignInOutcome::Allowed {
			claims,
			is_new_user,
			employee,
		} => Ok(Json(SignInResponse {
			claims,
			is_new_user,
			employee_id: employee.map(|e| e.employee_id),
		})
		.into_response()),
		SignInOutcome::Denied(reason) => Ok(Redirect::to(&reason.redirect_path()).into_response()),
	}
}

/// POST /auth/session/refresh
pub async fn refresh_session(
	State(state): State<AppState>,
	Json(claims): Json<SessionClaims>,
) -> Result<Json<SessionClaims>, ServerError> {
	Ok(Json(state.sign_in.refresh_session(&claims).await?))
}
