use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::{
	ContactFormConfig, DatabaseConfig, HttpProviderConfig, MemoryProviderConfig, MemoryStoreConfig, MongoStoreConfig,
	NotifierConfig, ProviderConfig,
};
use crate::global::Global;
use crate::notifier::{AnyNotifier, Email};

/// Memory store and memory notifier, nothing leaves the process.
pub fn memory_config() -> ContactFormConfig {
	ContactFormConfig {
		database: DatabaseConfig::Memory(MemoryStoreConfig::default()),
		notifier: NotifierConfig {
			from: "owner@example.com".into(),
			owner_name: "Jane Doe".into(),
			provider: ProviderConfig::Memory(MemoryProviderConfig::default()),
			..Default::default()
		},
		..Default::default()
	}
}

/// A store that rejects every write.
pub fn full_store_config() -> ContactFormConfig {
	ContactFormConfig {
		database: DatabaseConfig::Memory(MemoryStoreConfig { capacity: Some(0) }),
		..memory_config()
	}
}

/// A mongo store nothing is listening for.
pub fn unreachable_store_config() -> ContactFormConfig {
	mongo_config("mongodb://127.0.0.1:1/contact-form")
}

pub fn mongo_config(uri: &str) -> ContactFormConfig {
	ContactFormConfig {
		database: DatabaseConfig::Mongo(MongoStoreConfig {
			uri: uri.into(),
			database: None,
			collection: "contacts".into(),
			server_selection_timeout: Duration::from_millis(100),
		}),
		..memory_config()
	}
}

/// An email api nothing is listening for.
pub fn unreachable_notifier_config() -> ContactFormConfig {
	let mut config = memory_config();
	config.notifier.provider = ProviderConfig::Http(HttpProviderConfig {
		url: "http://127.0.0.1:1/emails".parse().unwrap(),
		api_key: Some("key".into()),
		headers: Default::default(),
		timeout: Duration::from_millis(500),
	});
	config
}

pub async fn global(config: ContactFormConfig) -> Arc<Global> {
	Arc::new(Global::new(config).await.expect("global"))
}

pub async fn outbox(global: &Global) -> Vec<Email> {
	match global.notifier() {
		AnyNotifier::Memory(notifier) => notifier.outbox().await,
		_ => panic!("not a memory notifier"),
	}
}

pub async fn send(global: &Arc<Global>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
	let response = crate::api::router(global.clone()).oneshot(request).await.expect("response");
	let status = response.status();
	let body = response.into_body().collect().await.expect("body").to_bytes();

	let body = if body.is_empty() {
		serde_json::Value::Null
	} else {
		serde_json::from_slice(&body).expect("json body")
	};

	(status, body)
}

pub fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(body.into())
		.unwrap()
}

pub fn submission(name: &str) -> serde_json::Value {
	serde_json::json!({
		"name": name,
		"email": format!("{}@example.com", name.to_lowercase()),
		"phone": "555-0100",
		"subject": "Hello",
		"message": "I would like to talk about a project.",
	})
}
