use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use url::Url;

use crate::logging::LoggingConfig;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContactFormConfig {
	/// The HTTP api configuration
	pub api: ApiConfig,
	/// The contact store configuration
	pub database: DatabaseConfig,
	/// The email notification configuration
	pub notifier: NotifierConfig,
	/// Logging configuration
	pub logging: LoggingConfig,
	/// Time allowed for in-flight requests to finish after a shutdown signal
	#[serde(with = "humantime_serde")]
	pub shutdown_timeout: Duration,
}

impl Default for ContactFormConfig {
	fn default() -> Self {
		Self {
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
			notifier: NotifierConfig::default(),
			logging: LoggingConfig::default(),
			shutdown_timeout: Duration::from_secs(30),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// The address the HTTP server listens on
	pub host: IpAddr,
	/// The port the HTTP server listens on
	pub port: u16,
	/// Requests taking longer than this are answered with 408
	#[serde(with = "humantime_serde")]
	pub request_timeout: Duration,
	/// Cross-origin settings
	pub cors: CorsConfig,
}

impl ApiConfig {
	pub fn bind(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
			port: 10000,
			request_timeout: Duration::from_secs(30),
			cors: CorsConfig::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CorsConfig {
	/// Origins allowed to call the api from a browser
	pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allowed_origins: vec!["http://localhost:3000".into(), "http://127.0.0.1:5500".into()],
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DatabaseConfig {
	/// MongoDB collection
	Mongo(MongoStoreConfig),
	/// In-process store, lost on restart
	Memory(MemoryStoreConfig),
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self::Mongo(MongoStoreConfig::default())
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MongoStoreConfig {
	/// Connection string
	pub uri: String,
	/// Database used when the connection string names none, `test` if unset
	pub database: Option<String>,
	/// The collection submissions are written to
	pub collection: String,
	/// How long an operation waits for a reachable server
	#[serde(with = "humantime_serde")]
	pub server_selection_timeout: Duration,
}

impl Default for MongoStoreConfig {
	fn default() -> Self {
		Self {
			uri: "mongodb://localhost:27017/contact-form".into(),
			database: None,
			collection: "contacts".into(),
			server_selection_timeout: Duration::from_secs(5),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
	/// Maximum number of submissions kept, unlimited if unset
	pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
	/// Sender address of both emails
	pub from: String,
	/// Recipient of the admin notification, defaults to `from`
	pub admin_to: Option<String>,
	/// Name used to sign the auto-reply
	pub owner_name: String,
	/// The email provider
	pub provider: ProviderConfig,
}

impl NotifierConfig {
	pub fn admin_recipient(&self) -> &str {
		self.admin_to.as_deref().unwrap_or(&self.from)
	}
}

impl Default for NotifierConfig {
	fn default() -> Self {
		Self {
			from: String::new(),
			admin_to: None,
			owner_name: "Site Owner".into(),
			provider: ProviderConfig::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProviderConfig {
	/// SMTP relay
	Smtp(SmtpProviderConfig),
	/// Transactional email HTTP api
	Http(HttpProviderConfig),
	/// Keep emails in memory and log them
	Memory(MemoryProviderConfig),
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self::Smtp(SmtpProviderConfig::default())
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmtpProviderConfig {
	/// The SMTP relay host
	pub host: String,
	/// The SMTP port, defaults to the standard port for the tls mode
	pub port: Option<u16>,
	/// Transport security
	pub tls: SmtpTls,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Connection and command timeout
	#[serde(with = "humantime_serde")]
	pub timeout: Duration,
}

impl Default for SmtpProviderConfig {
	fn default() -> Self {
		Self {
			host: "smtp.gmail.com".into(),
			port: None,
			tls: SmtpTls::default(),
			username: None,
			password: None,
			timeout: Duration::from_secs(10),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
	/// Plain text connection
	None,
	/// Upgrade a plain connection with STARTTLS
	#[default]
	Starttls,
	/// Implicit TLS
	Tls,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HttpProviderConfig {
	/// The send endpoint of the email api
	pub url: Url,
	/// Sent as a bearer token
	#[serde(default)]
	pub api_key: Option<String>,
	/// Additional headers for every request
	#[serde(default)]
	pub headers: HashMap<String, String>,
	/// Request timeout
	#[serde(default = "default_timeout")]
	#[serde(with = "humantime_serde")]
	pub timeout: Duration,
}

fn default_timeout() -> Duration {
	Duration::from_secs(10)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MemoryProviderConfig {
	/// Maximum number of emails kept, older emails are dropped first.
	/// Unlimited if set to null.
	pub capacity: Option<usize>,
}

impl Default for MemoryProviderConfig {
	fn default() -> Self {
		Self { capacity: Some(100) }
	}
}
