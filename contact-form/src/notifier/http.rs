use url::Url;

use super::{Email, Notifier, NotifierError};
use crate::config::HttpProviderConfig;

/// Sends through a transactional email api. The request body is
/// `{ from, to: [..], subject, html }` and any non-2xx status is a failure.
#[derive(Debug)]
pub struct HttpNotifier {
	url: Url,
	client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum HttpNotifierError {
	#[error("reqwest: {0}")]
	Reqwest(#[from] reqwest::Error),
	#[error("invalid header name")]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error("invalid header value")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}

#[derive(serde::Serialize)]
struct SendRequest<'a> {
	from: &'a str,
	to: [&'a str; 1],
	subject: &'a str,
	html: &'a str,
}

impl HttpNotifier {
	#[tracing::instrument(skip(config), name = "HttpNotifier::new", fields(url = %config.url), err)]
	pub fn new(config: &HttpProviderConfig) -> Result<Self, NotifierError> {
		tracing::debug!("setting up http notifier");
		Ok(Self {
			url: config.url.clone(),
			client: {
				let mut headers = reqwest::header::HeaderMap::new();

				for (key, value) in &config.headers {
					headers.insert(
						key.parse::<reqwest::header::HeaderName>()
							.map_err(HttpNotifierError::from)?,
						value
							.parse::<reqwest::header::HeaderValue>()
							.map_err(HttpNotifierError::from)?,
					);
				}

				if let Some(api_key) = &config.api_key {
					let mut value = format!("Bearer {api_key}")
						.parse::<reqwest::header::HeaderValue>()
						.map_err(HttpNotifierError::from)?;
					value.set_sensitive(true);
					headers.insert(reqwest::header::AUTHORIZATION, value);
				}

				reqwest::Client::builder()
					.timeout(config.timeout)
					.default_headers(headers)
					.build()
					.map_err(HttpNotifierError::from)?
			},
		})
	}
}

impl Notifier for HttpNotifier {
	fn name(&self) -> &str {
		"http"
	}

	#[tracing::instrument(skip_all, name = "HttpNotifier::send", fields(url = %self.url, subject = %email.subject), err)]
	async fn send(&self, email: &Email) -> Result<(), NotifierError> {
		self.client
			.post(self.url.clone())
			.json(&SendRequest {
				from: &email.from,
				to: [&email.to],
				subject: &email.subject,
				html: &email.html,
			})
			.send()
			.await
			.map_err(HttpNotifierError::from)?
			.error_for_status()
			.map_err(HttpNotifierError::from)?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::time::Duration;

	use wiremock::matchers::{body_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn email() -> Email {
		Email {
			from: "owner@example.com".into(),
			to: "visitor@example.com".into(),
			subject: "Thank you".into(),
			html: "<p>Thanks</p>".into(),
		}
	}

	fn config(server: &MockServer) -> HttpProviderConfig {
		HttpProviderConfig {
			url: format!("{}/emails", server.uri()).parse().unwrap(),
			api_key: Some("re_123".into()),
			headers: HashMap::from([("X-Site".to_owned(), "portfolio".to_owned())]),
			timeout: Duration::from_secs(2),
		}
	}

	#[tokio::test]
	async fn posts_email_with_bearer_token() {
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(path("/emails"))
			.and(header("Authorization", "Bearer re_123"))
			.and(header("X-Site", "portfolio"))
			.and(body_json(serde_json::json!({
				"from": "owner@example.com",
				"to": ["visitor@example.com"],
				"subject": "Thank you",
				"html": "<p>Thanks</p>",
			})))
			.respond_with(ResponseTemplate::new(200))
			.expect(1)
			.mount(&server)
			.await;

		let notifier = HttpNotifier::new(&config(&server)).unwrap();
		notifier.send(&email()).await.unwrap();
	}

	#[tokio::test]
	async fn non_success_status_is_an_error() {
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(422))
			.expect(1)
			.mount(&server)
			.await;

		let notifier = HttpNotifier::new(&config(&server)).unwrap();
		let err = notifier.send(&email()).await.unwrap_err();
		assert!(matches!(err, NotifierError::Http(HttpNotifierError::Reqwest(_))));
	}

	#[test]
	fn rejects_invalid_header() {
		let config = HttpProviderConfig {
			url: "http://localhost/emails".parse().unwrap(),
			api_key: None,
			headers: HashMap::from([("bad header".to_owned(), "x".to_owned())]),
			timeout: Duration::from_secs(1),
		};

		assert!(matches!(
			HttpNotifier::new(&config),
			Err(NotifierError::Http(HttpNotifierError::InvalidHeaderName(_)))
		));
	}
}
