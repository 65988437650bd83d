use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Collection, Database};
use tokio::sync::OnceCell;

use super::{Contact, ContactStore, NewContact, StoreError};
use crate::config::MongoStoreConfig;

/// The stored shape of a submission. `date` is a BSON datetime so the
/// server sorts chronologically.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ContactDocument {
	#[serde(rename = "_id")]
	id: ObjectId,
	name: String,
	email: String,
	#[serde(default)]
	phone: String,
	#[serde(default)]
	subject: String,
	message: String,
	#[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
	date: chrono::DateTime<chrono::Utc>,
}

impl From<&Contact> for ContactDocument {
	fn from(contact: &Contact) -> Self {
		Self {
			id: contact.id,
			name: contact.name.clone(),
			email: contact.email.clone(),
			phone: contact.phone.clone(),
			subject: contact.subject.clone(),
			message: contact.message.clone(),
			date: contact.submitted_at,
		}
	}
}

impl From<ContactDocument> for Contact {
	fn from(document: ContactDocument) -> Self {
		Self {
			id: document.id,
			name: document.name,
			email: document.email,
			phone: document.phone,
			subject: document.subject,
			message: document.message,
			submitted_at: document.date,
		}
	}
}

/// Used when neither the connection string nor the config names a database.
const FALLBACK_DATABASE: &str = "test";

/// The client is built on first use. Parsing a `mongodb+srv://` string
/// resolves DNS, so a bad string or an unreachable server fails requests
/// instead of startup. A failed attempt is retried by the next request.
#[derive(Debug)]
pub struct MongoStore {
	config: MongoStoreConfig,
	database: OnceCell<Database>,
}

impl MongoStore {
	pub fn new(config: &MongoStoreConfig) -> Self {
		tracing::debug!("setting up mongo store");
		Self {
			config: config.clone(),
			database: OnceCell::new(),
		}
	}

	#[tracing::instrument(skip(self), name = "MongoStore::connect", err)]
	async fn connect(&self) -> Result<Database, StoreError> {
		let mut options = tokio::time::timeout(self.config.server_selection_timeout, ClientOptions::parse(&self.config.uri))
			.await
			.map_err(|_| StoreError::Timeout(self.config.server_selection_timeout))??;
		options.server_selection_timeout = Some(self.config.server_selection_timeout);

		let client = mongodb::Client::with_options(options)?;
		let database = client.default_database().unwrap_or_else(|| {
			client.database(self.config.database.as_deref().unwrap_or(FALLBACK_DATABASE))
		});

		tracing::debug!(database = database.name(), "mongo client ready");

		Ok(database)
	}

	async fn database(&self) -> Result<&Database, StoreError> {
		self.database.get_or_try_init(|| self.connect()).await
	}

	async fn collection(&self) -> Result<Collection<ContactDocument>, StoreError> {
		Ok(self.database().await?.collection(&self.config.collection))
	}
}

impl ContactStore for MongoStore {
	fn name(&self) -> &str {
		&self.config.collection
	}

	#[tracing::instrument(skip_all, name = "MongoStore::create", err)]
	async fn create(&self, contact: NewContact) -> Result<Contact, StoreError> {
		let contact = Contact::from_new(contact);

		self.collection()
			.await?
			.insert_one(ContactDocument::from(&contact), None)
			.await?;

		tracing::debug!(id = %contact.id, "stored submission");

		Ok(contact)
	}

	#[tracing::instrument(skip_all, name = "MongoStore::list_all", err)]
	async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
		let cursor = self
			.collection()
			.await?
			.find(
				None,
				FindOptions::builder()
					.sort(bson::doc! {
						"date": -1,
						"_id": -1,
					})
					.build(),
			)
			.await?;

		let documents: Vec<ContactDocument> = cursor.try_collect().await?;

		Ok(documents.into_iter().map(Contact::from).collect())
	}

	async fn healthy(&self) -> bool {
		let result = match self.database().await {
			Ok(database) => database.run_command(bson::doc! { "ping": 1 }, None).await.map_err(StoreError::from),
			Err(err) => Err(err),
		};

		if let Err(err) = result {
			tracing::warn!("database ping failed: {err}");
			return false;
		}

		true
	}
}
