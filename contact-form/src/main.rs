use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use self::config::ContactFormConfig;
use self::global::Global;
use self::settings::cli::{Cli, Matches};
use self::signal::{Shutdown, SignalHandler};

mod api;
mod config;
mod database;
mod global;
mod logging;
mod notifications;
mod notifier;
mod settings;
mod signal;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = match Cli::new(&ContactFormConfig::default()).and_then(Cli::parse) {
		Ok(Matches::Run(config)) => config,
		Ok(Matches::Generated(file)) => {
			println!("wrote default configuration to {file}");
			return;
		}
		Err(err) => {
			if let Some(err) = err.downcast_ref::<clap::Error>() {
				err.exit();
			}

			match logging::init(&Default::default()) {
				Ok(()) => tracing::error!("failed to load configuration: {err:#}"),
				Err(_) => eprintln!("failed to load configuration: {err:#}"),
			}
			std::process::exit(1);
		}
	};

	if let Err(err) = logging::init(&config.logging) {
		eprintln!("failed to initialize logging: {err}");
		std::process::exit(1);
	}

	tracing::info!("starting contact form");

	let shutdown_timeout = config.shutdown_timeout;

	let global = Arc::new({
		match Global::new(config).await {
			Ok(global) => global,
			Err(err) => {
				tracing::error!("error setting up global: {err:#}");
				std::process::exit(1);
			}
		}
	});

	tokio::spawn({
		let global = global.clone();
		async move { global.check_connectivity().await }
	});

	let mut signal = match SignalHandler::shutdown() {
		Ok(signal) => signal,
		Err(err) => {
			tracing::error!("failed to register signal handlers: {err}");
			std::process::exit(1);
		}
	};

	let shutdown = CancellationToken::new();
	let mut server = tokio::spawn(api::run(global.clone(), shutdown.clone()));

	tokio::select! {
		_ = signal.recv() => {
			tracing::info!("received signal, shutting down");
		}
		result = &mut server => {
			match result {
				Ok(Ok(())) => tracing::warn!("api stopped unexpectedly without error"),
				Ok(Err(err)) => tracing::error!("api failed: {err:#}"),
				Err(err) => tracing::error!("api task failed: {err}"),
			}
			std::process::exit(1);
		}
	}

	shutdown.cancel();

	match signal.drain(shutdown_timeout, server).await {
		Shutdown::Drained => tracing::info!("contact form stopped"),
		Shutdown::TimedOut => tracing::warn!("shutdown timed out, forcing exit"),
		Shutdown::Forced(_) => tracing::warn!("received signal again, forcing exit"),
	}

	std::process::exit(0);
}
