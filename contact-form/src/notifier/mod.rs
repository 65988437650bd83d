use self::http::{HttpNotifier, HttpNotifierError};
use self::memory::MemoryNotifier;
use self::smtp::{SmtpNotifier, SmtpNotifierError};
use crate::config::ProviderConfig;

pub mod http;
pub mod memory;
pub mod smtp;

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
	#[error("smtp: {0}")]
	Smtp(#[from] SmtpNotifierError),
	#[error("http: {0}")]
	Http(#[from] HttpNotifierError),
}

/// A rendered html email.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Email {
	pub from: String,
	pub to: String,
	pub subject: String,
	pub html: String,
}

pub trait Notifier {
	fn name(&self) -> &str;

	fn send(&self, email: &Email) -> impl std::future::Future<Output = Result<(), NotifierError>> + Send;

	/// Checks that the provider is reachable and accepts our credentials
	fn verify(&self) -> impl std::future::Future<Output = Result<(), NotifierError>> + Send {
		async { Ok(()) }
	}
}

#[derive(Debug)]
pub enum AnyNotifier {
	Smtp(SmtpNotifier),
	Http(HttpNotifier),
	Memory(MemoryNotifier),
}

impl Notifier for AnyNotifier {
	fn name(&self) -> &str {
		match self {
			AnyNotifier::Smtp(notifier) => notifier.name(),
			AnyNotifier::Http(notifier) => notifier.name(),
			AnyNotifier::Memory(notifier) => notifier.name(),
		}
	}

	async fn send(&self, email: &Email) -> Result<(), NotifierError> {
		match self {
			AnyNotifier::Smtp(notifier) => notifier.send(email).await,
			AnyNotifier::Http(notifier) => notifier.send(email).await,
			AnyNotifier::Memory(notifier) => notifier.send(email).await,
		}
	}

	async fn verify(&self) -> Result<(), NotifierError> {
		match self {
			AnyNotifier::Smtp(notifier) => notifier.verify().await,
			AnyNotifier::Http(notifier) => notifier.verify().await,
			AnyNotifier::Memory(notifier) => notifier.verify().await,
		}
	}
}

pub fn build_notifier(config: &ProviderConfig) -> Result<AnyNotifier, NotifierError> {
	match config {
		ProviderConfig::Smtp(smtp) => Ok(AnyNotifier::Smtp(SmtpNotifier::new(smtp)?)),
		ProviderConfig::Http(http) => Ok(AnyNotifier::Http(HttpNotifier::new(http)?)),
		ProviderConfig::Memory(memory) => Ok(AnyNotifier::Memory(MemoryNotifier::new(memory))),
	}
}
