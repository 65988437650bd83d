use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::validation::ValidationError;
use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("validation: {0}")]
	Validation(#[from] ValidationError),
	#[error("malformed body: {0}")]
	MalformedBody(#[from] JsonRejection),
	#[error("store submission: {0}")]
	StoreSubmission(#[source] StoreError),
	#[error("list submissions: {0}")]
	ListSubmissions(#[source] StoreError),
}

#[derive(serde::Serialize)]
pub struct Failure {
	pub success: bool,
	pub message: &'static str,
}

impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
			ApiError::StoreSubmission(_) | ApiError::ListSubmissions(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> &'static str {
		match self {
			ApiError::Validation(_) => "Name, email, and message are required",
			ApiError::MalformedBody(_) => "Invalid request body",
			ApiError::StoreSubmission(_) => "Server error. Please try again later.",
			ApiError::ListSubmissions(_) => "Server error",
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!("request failed: {self}");
		} else {
			tracing::debug!("request rejected: {self}");
		}

		(
			status,
			Json(Failure {
				success: false,
				message: self.message(),
			}),
		)
			.into_response()
	}
}
