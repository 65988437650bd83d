use std::collections::VecDeque;

use tokio::sync::RwLock;

use super::{Email, Notifier, NotifierError};
use crate::config::MemoryProviderConfig;

/// Keeps sent emails in process. Useful when running without a mail
/// provider, every email is also logged.
#[derive(Debug)]
pub struct MemoryNotifier {
	capacity: usize,
	outbox: RwLock<VecDeque<Email>>,
}

impl MemoryNotifier {
	pub fn new(config: &MemoryProviderConfig) -> Self {
		tracing::debug!("setting up memory notifier");
		Self {
			capacity: config.capacity.unwrap_or(usize::MAX),
			outbox: RwLock::new(VecDeque::new()),
		}
	}

	/// Emails sent so far, oldest first.
	pub async fn outbox(&self) -> Vec<Email> {
		self.outbox.read().await.iter().cloned().collect()
	}
}

impl Notifier for MemoryNotifier {
	fn name(&self) -> &str {
		"memory"
	}

	async fn send(&self, email: &Email) -> Result<(), NotifierError> {
		tracing::info!(to = %email.to, subject = %email.subject, "email kept in memory");

		if self.capacity == 0 {
			return Ok(());
		}

		let mut outbox = self.outbox.write().await;
		while outbox.len() >= self.capacity {
			outbox.pop_front();
		}
		outbox.push_back(email.clone());

		Ok(())
	}
}
