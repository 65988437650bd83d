use askama::Template;

use crate::config::NotifierConfig;
use crate::database::Contact;
use crate::notifier::{Email, Notifier};

const AUTO_REPLY_SUBJECT: &str = "Thank you for contacting me!";

#[derive(Template)]
#[template(path = "admin_notification.html")]
struct AdminNotification<'a> {
	name: &'a str,
	email: &'a str,
	phone: &'a str,
	subject: &'a str,
	message: &'a str,
	submitted_at: String,
}

#[derive(Template)]
#[template(path = "auto_reply.html")]
struct AutoReply<'a> {
	name: &'a str,
	message: &'a str,
	owner_name: &'a str,
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
	if value.is_empty() { fallback } else { value }
}

/// Renders the admin notification and the auto-reply, in that order.
pub fn render_emails(config: &NotifierConfig, contact: &Contact) -> Result<[Email; 2], askama::Error> {
	let admin = Email {
		from: config.from.clone(),
		to: config.admin_recipient().to_owned(),
		subject: format!(
			"📧 New Portfolio Message: {}",
			or_default(&contact.subject, "No Subject")
		),
		html: AdminNotification {
			name: &contact.name,
			email: &contact.email,
			phone: or_default(&contact.phone, "Not provided"),
			subject: or_default(&contact.subject, "No subject"),
			message: &contact.message,
			submitted_at: contact.submitted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
		}
		.render()?,
	};

	let reply = Email {
		from: config.from.clone(),
		to: contact.email.clone(),
		subject: AUTO_REPLY_SUBJECT.to_owned(),
		html: AutoReply {
			name: &contact.name,
			message: &contact.message,
			owner_name: &config.owner_name,
		}
		.render()?,
	};

	Ok([admin, reply])
}

/// Sends both emails for a stored submission. Returns whether every email
/// was handed to the provider, failures are only logged. The auto-reply is
/// skipped once the admin notification fails.
#[tracing::instrument(skip_all, fields(id = %contact.id, provider = notifier.name()))]
pub async fn notify_submission(notifier: &impl Notifier, config: &NotifierConfig, contact: &Contact) -> bool {
	let emails = match render_emails(config, contact) {
		Ok(emails) => emails,
		Err(err) => {
			tracing::error!("failed to render notification: {err}");
			return false;
		}
	};

	for email in &emails {
		if let Err(err) = notifier.send(email).await {
			tracing::error!(to = %email.to, "failed to send notification: {err}");
			return false;
		}
	}

	true
}

#[cfg(test)]
mod tests {
	use std::net::{Ipv4Addr, SocketAddr};
	use std::time::Duration;

	use super::*;
	use crate::config::{HttpProviderConfig, MemoryProviderConfig};
	use crate::database::NewContact;
	use crate::notifier::http::HttpNotifier;
	use crate::notifier::memory::MemoryNotifier;

	fn config() -> NotifierConfig {
		NotifierConfig {
			from: "owner@example.com".into(),
			owner_name: "Jane Doe".into(),
			..Default::default()
		}
	}

	fn contact(subject: &str, phone: &str) -> Contact {
		Contact::from_new(NewContact {
			name: "Ada <b>Lovelace</b>".into(),
			email: "ada@example.com".into(),
			phone: phone.into(),
			subject: subject.into(),
			message: "Is <script>alert(1)</script> & more escaped?".into(),
		})
	}

	#[test]
	fn escapes_submitted_values() {
		let [admin, reply] = render_emails(&config(), &contact("Hi", "555-0100")).unwrap();

		for html in [&admin.html, &reply.html] {
			assert!(!html.contains("<script>"));
			assert!(html.contains("&lt;script&gt;"));
			assert!(!html.contains("<b>Lovelace</b>"));
		}
		assert!(admin.html.contains("555-0100"));
		assert!(reply.html.contains("Jane Doe"));
	}

	#[test]
	fn falls_back_for_optional_fields() {
		let [admin, reply] = render_emails(&config(), &contact("", "")).unwrap();

		assert_eq!(admin.subject, "📧 New Portfolio Message: No Subject");
		assert!(admin.html.contains("Not provided"));
		assert!(admin.html.contains("No subject"));
		assert_eq!(reply.subject, "Thank you for contacting me!");
	}

	#[test]
	fn addresses_admin_and_submitter() {
		let [admin, reply] = render_emails(&config(), &contact("Hi", "")).unwrap();
		assert_eq!(admin.to, "owner@example.com");
		assert_eq!(admin.subject, "📧 New Portfolio Message: Hi");
		assert_eq!(reply.to, "ada@example.com");
		assert_eq!(reply.from, "owner@example.com");

		let config = NotifierConfig {
			admin_to: Some("inbox@example.com".into()),
			..config()
		};
		let [admin, _] = render_emails(&config, &contact("Hi", "")).unwrap();
		assert_eq!(admin.to, "inbox@example.com");
	}

	#[tokio::test]
	async fn sends_admin_notification_first() {
		let notifier = MemoryNotifier::new(&MemoryProviderConfig::default());

		assert!(notify_submission(&notifier, &config(), &contact("Hi", "")).await);

		let outbox = notifier.outbox().await;
		assert_eq!(outbox.len(), 2);
		assert_eq!(outbox[0].to, "owner@example.com");
		assert_eq!(outbox[1].to, "ada@example.com");
	}

	#[tokio::test]
	async fn provider_failure_is_reported_not_raised() {
		let notifier = HttpNotifier::new(&HttpProviderConfig {
			url: format!("http://{}/emails", SocketAddr::from((Ipv4Addr::LOCALHOST, 1)))
				.parse()
				.unwrap(),
			api_key: None,
			headers: Default::default(),
			timeout: Duration::from_millis(500),
		})
		.unwrap();

		assert!(!notify_submission(&notifier, &config(), &contact("Hi", "")).await);
	}
}
