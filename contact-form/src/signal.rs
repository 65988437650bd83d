use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use tokio::signal::unix::{Signal, SignalKind};

/// How the drain after the first shutdown signal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	/// Everything in flight finished.
	Drained,
	/// The timeout elapsed first.
	TimedOut,
	/// A second signal arrived first.
	Forced(SignalKind),
}

/// Waits on any of a set of unix signals.
#[derive(Default)]
pub struct SignalHandler {
	signals: Vec<(SignalKind, Signal)>,
}

impl SignalHandler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Listens for SIGINT and SIGTERM.
	pub fn shutdown() -> std::io::Result<Self> {
		Self::new()
			.with_signal(SignalKind::interrupt())?
			.with_signal(SignalKind::terminate())
	}

	pub fn with_signal(mut self, kind: SignalKind) -> std::io::Result<Self> {
		if self.signals.iter().any(|(k, _)| k == &kind) {
			return Ok(self);
		}

		self.signals.push((kind, tokio::signal::unix::signal(kind)?));

		Ok(self)
	}

	/// Resolves with the next signal received. Returns `None` straight away
	/// when no signal is registered.
	pub async fn recv(&mut self) -> Option<SignalKind> {
		if self.signals.is_empty() {
			return None;
		}

		let (kind, _, _) = futures::future::select_all(
			self.signals
				.iter_mut()
				.map(|(kind, signal)| Box::pin(signal.recv().map(|_| *kind))),
		)
		.await;

		Some(kind)
	}

	/// Waits for `drain` to finish, giving up after `timeout` or on the next
	/// signal, whichever comes first.
	pub async fn drain(&mut self, timeout: Duration, drain: impl Future) -> Shutdown {
		let forced = async {
			match self.recv().await {
				Some(kind) => kind,
				None => std::future::pending().await,
			}
		};

		tokio::select! {
			kind = forced => Shutdown::Forced(kind),
			result = tokio::time::timeout(timeout, drain) => match result {
				Ok(_) => Shutdown::Drained,
				Err(_) => Shutdown::TimedOut,
			},
		}
	}
}
