use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Email, Notifier, NotifierError};
use crate::config::{SmtpProviderConfig, SmtpTls};

pub struct SmtpNotifier {
	host: String,
	transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpNotifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SmtpNotifier").field("host", &self.host).finish_non_exhaustive()
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SmtpNotifierError {
	#[error("transport: {0}")]
	Transport(#[from] lettre::transport::smtp::Error),
	#[error("address: {0}")]
	Address(#[from] lettre::address::AddressError),
	#[error("message: {0}")]
	Message(#[from] lettre::error::Error),
	#[error("server rejected the connection test")]
	ConnectionTest,
}

impl SmtpNotifier {
	#[tracing::instrument(skip(config), name = "SmtpNotifier::new", fields(host = %config.host), err)]
	pub fn new(config: &SmtpProviderConfig) -> Result<Self, NotifierError> {
		tracing::debug!("setting up smtp notifier");

		let mut builder = match config.tls {
			SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
			SmtpTls::Starttls => {
				AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(SmtpNotifierError::from)?
			}
			SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(SmtpNotifierError::from)?,
		};

		if let Some(port) = config.port {
			builder = builder.port(port);
		}

		if let Some(username) = config.username.as_ref().filter(|username| !username.is_empty()) {
			builder = builder.credentials(Credentials::new(
				username.clone(),
				config.password.clone().unwrap_or_default(),
			));
		}

		Ok(Self {
			host: config.host.clone(),
			transport: builder.timeout(Some(config.timeout)).build(),
		})
	}

	fn message(email: &Email) -> Result<Message, SmtpNotifierError> {
		Ok(Message::builder()
			.from(email.from.parse::<Mailbox>()?)
			.to(email.to.parse::<Mailbox>()?)
			.subject(email.subject.as_str())
			.header(ContentType::TEXT_HTML)
			.body(email.html.clone())?)
	}
}

impl Notifier for SmtpNotifier {
	fn name(&self) -> &str {
		"smtp"
	}

	#[tracing::instrument(skip_all, name = "SmtpNotifier::send", fields(host = %self.host, subject = %email.subject), err)]
	async fn send(&self, email: &Email) -> Result<(), NotifierError> {
		let message = Self::message(email)?;

		self.transport.send(message).await.map_err(SmtpNotifierError::from)?;

		Ok(())
	}

	async fn verify(&self) -> Result<(), NotifierError> {
		if self.transport.test_connection().await.map_err(SmtpNotifierError::from)? {
			Ok(())
		} else {
			Err(SmtpNotifierError::ConnectionTest.into())
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn email(to: &str) -> Email {
		Email {
			from: "Site <owner@example.com>".into(),
			to: to.into(),
			subject: "Hello".into(),
			html: "<p>Hi</p>".into(),
		}
	}

	#[test]
	fn builds_html_message() {
		let message = SmtpNotifier::message(&email("visitor@example.com")).unwrap();
		let formatted = String::from_utf8(message.formatted()).unwrap();

		assert!(formatted.contains("Subject: Hello"));
		assert!(formatted.contains("Content-Type: text/html"));
		assert!(formatted.contains("To: visitor@example.com"));
	}

	#[test]
	fn rejects_invalid_recipient() {
		assert!(matches!(
			SmtpNotifier::message(&email("not an address")),
			Err(SmtpNotifierError::Address(_))
		));
	}

	#[tokio::test]
	async fn unreachable_relay_fails_send() {
		let notifier = SmtpNotifier::new(&SmtpProviderConfig {
			host: "127.0.0.1".into(),
			port: Some(1),
			tls: SmtpTls::None,
			username: None,
			password: None,
			timeout: Duration::from_millis(500),
		})
		.unwrap();

		assert!(notifier.send(&email("visitor@example.com")).await.is_err());
		assert!(notifier.verify().await.is_err());
	}
}
