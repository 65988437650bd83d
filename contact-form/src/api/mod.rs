use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::global::Global;

pub mod error;
pub mod routes;
pub mod validation;

fn cors(config: &ApiConfig) -> CorsLayer {
	let origins = config
		.cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse::<HeaderValue>() {
			Ok(origin) => Some(origin),
			Err(err) => {
				tracing::warn!("ignoring invalid cors origin {origin:?}: {err}");
				None
			}
		})
		.collect::<Vec<_>>();

	CorsLayer::new()
		.allow_origin(origins)
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE])
		.allow_credentials(true)
}

pub fn router(global: Arc<Global>) -> Router {
	let config = &global.config().api;

	Router::new()
		.route("/api/health", get(routes::health))
		.route("/api/contact", post(routes::submit_contact))
		.route("/api/contacts", get(routes::list_contacts))
		.layer(TimeoutLayer::new(config.request_timeout))
		.layer(cors(config))
		.layer(TraceLayer::new_for_http())
		.with_state(global)
}

/// Serves the api until `shutdown` is cancelled, then drains open requests.
pub async fn run(global: Arc<Global>, shutdown: CancellationToken) -> anyhow::Result<()> {
	let bind = global.config().api.bind();
	let listener = TcpListener::bind(bind).await.with_context(|| format!("bind {bind}"))?;

	tracing::info!("api listening on {}", listener.local_addr().context("local addr")?);

	axum::serve(listener, router(global))
		.with_graceful_shutdown(async move { shutdown.cancelled().await })
		.await
		.context("api server")
}
