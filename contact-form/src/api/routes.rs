use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::error::ApiError;
use super::validation::ContactRequest;
use crate::database::{Contact, ContactStore, NewContact};
use crate::global::Global;
use crate::notifications::notify_submission;

#[derive(Debug, serde::Serialize)]
pub struct Health {
	pub message: &'static str,
	pub status: &'static str,
}

#[derive(Debug, serde::Serialize)]
pub struct Submitted {
	pub success: bool,
	pub message: &'static str,
}

#[derive(Debug, serde::Serialize)]
pub struct Contacts {
	pub success: bool,
	pub data: Vec<Contact>,
}

/// Always OK, the store is not consulted.
pub async fn health() -> Json<Health> {
	Json(Health {
		message: "Server is running!",
		status: "OK",
	})
}

pub async fn submit_contact(
	State(global): State<Arc<Global>>,
	request: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<Submitted>, ApiError> {
	let Json(request) = request?;
	let contact = NewContact::try_from(request)?;

	let contact = global.store().create(contact).await.map_err(ApiError::StoreSubmission)?;
	tracing::info!(id = %contact.id, "received contact submission");

	let message = if notify_submission(global.notifier(), &global.config().notifier, &contact).await {
		"Message sent successfully! I will contact you soon."
	} else {
		"Message received! I will contact you soon."
	};

	Ok(Json(Submitted { success: true, message }))
}

pub async fn list_contacts(State(global): State<Arc<Global>>) -> Result<Json<Contacts>, ApiError> {
	let data = global.store().list_all().await.map_err(ApiError::ListSubmissions)?;

	Ok(Json(Contacts { success: true, data }))
}
