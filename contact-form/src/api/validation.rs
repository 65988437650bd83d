use crate::database::NewContact;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("missing required field: {0}")]
	MissingField(&'static str),
}

/// The submitted form. Every field is optional here so that a missing field
/// is reported as a validation error rather than a malformed body.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ContactRequest {
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub subject: Option<String>,
	pub message: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
	value
		.filter(|value| !value.is_empty())
		.ok_or(ValidationError::MissingField(field))
}

impl TryFrom<ContactRequest> for NewContact {
	type Error = ValidationError;

	fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
		Ok(Self {
			name: required(request.name, "name")?,
			email: required(request.email, "email")?,
			phone: request.phone.unwrap_or_default(),
			subject: request.subject.unwrap_or_default(),
			message: required(request.message, "message")?,
		})
	}
}
