use anyhow::Context;

use crate::config::ContactFormConfig;
use crate::database::{build_store, AnyContactStore, ContactStore};
use crate::notifier::{build_notifier, AnyNotifier, Notifier};

pub struct Global {
	config: ContactFormConfig,
	store: AnyContactStore,
	notifier: AnyNotifier,
}

impl Global {
	pub async fn new(config: ContactFormConfig) -> anyhow::Result<Self> {
		tracing::debug!("setting up contact store");
		let store = build_store(&config.database);

		tracing::debug!("setting up notifier");
		let notifier = build_notifier(&config.notifier.provider).context("notifier")?;

		if config.notifier.from.is_empty() {
			tracing::warn!("notifier.from is not set, emails will likely be rejected");
		}

		Ok(Self {
			config,
			store,
			notifier,
		})
	}

	/// Logs whether the store and the email provider are reachable. Neither
	/// result stops startup.
	pub async fn check_connectivity(&self) {
		if self.store.healthy().await {
			tracing::info!(store = self.store.name(), "contact store reachable");
		} else {
			tracing::warn!(store = self.store.name(), "contact store unreachable, submissions will fail until it is");
		}

		match self.notifier.verify().await {
			Ok(()) => tracing::info!(provider = self.notifier.name(), "email provider ready"),
			Err(err) => tracing::warn!(provider = self.notifier.name(), "email provider check failed: {err}"),
		}
	}

	pub fn config(&self) -> &ContactFormConfig {
		&self.config
	}

	pub fn store(&self) -> &AnyContactStore {
		&self.store
	}

	pub fn notifier(&self) -> &AnyNotifier {
		&self.notifier
	}
}
