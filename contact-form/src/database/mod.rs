use bson::oid::ObjectId;
use chrono::{DateTime, SubsecRound, Utc};

use self::memory::{MemoryStore, MemoryStoreError};
use self::mongo::MongoStore;
use crate::config::DatabaseConfig;

pub mod memory;
pub mod mongo;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("mongodb: {0}")]
	Mongo(#[from] mongodb::error::Error),
	#[error("memory: {0}")]
	Memory(#[from] MemoryStoreError),
	#[error("connecting timed out after {0:?}")]
	Timeout(std::time::Duration),
}

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
	pub name: String,
	pub email: String,
	pub phone: String,
	pub subject: String,
	pub message: String,
}

/// A stored submission. Records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
	#[serde(with = "object_id_hex")]
	pub id: ObjectId,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub subject: String,
	pub message: String,
	pub submitted_at: DateTime<Utc>,
}

impl Contact {
	/// Assigns an id and the creation time. The time is kept at millisecond
	/// precision, the finest a BSON datetime stores.
	pub fn from_new(contact: NewContact) -> Self {
		Self {
			id: ObjectId::new(),
			name: contact.name,
			email: contact.email,
			phone: contact.phone,
			subject: contact.subject,
			message: contact.message,
			submitted_at: Utc::now().trunc_subsecs(3),
		}
	}
}

mod object_id_hex {
	use bson::oid::ObjectId;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&id.to_hex())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
		let hex = String::deserialize(deserializer)?;
		ObjectId::parse_str(hex).map_err(serde::de::Error::custom)
	}
}

pub trait ContactStore {
	fn name(&self) -> &str;

	/// Stores a submission and returns the stored record
	fn create(&self, contact: NewContact) -> impl std::future::Future<Output = Result<Contact, StoreError>> + Send;

	/// Every stored submission, newest first
	fn list_all(&self) -> impl std::future::Future<Output = Result<Vec<Contact>, StoreError>> + Send;

	fn healthy(&self) -> impl std::future::Future<Output = bool> + Send {
		async { true }
	}
}

#[derive(Debug)]
pub enum AnyContactStore {
	Mongo(MongoStore),
	Memory(MemoryStore),
}

impl ContactStore for AnyContactStore {
	fn name(&self) -> &str {
		match self {
			AnyContactStore::Mongo(store) => store.name(),
			AnyContactStore::Memory(store) => store.name(),
		}
	}

	async fn create(&self, contact: NewContact) -> Result<Contact, StoreError> {
		match self {
			AnyContactStore::Mongo(store) => store.create(contact).await,
			AnyContactStore::Memory(store) => store.create(contact).await,
		}
	}

	async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
		match self {
			AnyContactStore::Mongo(store) => store.list_all().await,
			AnyContactStore::Memory(store) => store.list_all().await,
		}
	}

	async fn healthy(&self) -> bool {
		match self {
			AnyContactStore::Mongo(store) => store.healthy().await,
			AnyContactStore::Memory(store) => store.healthy().await,
		}
	}
}

/// Builds the configured store. No connection is made here, so this cannot
/// fail on an unreachable database.
pub fn build_store(config: &DatabaseConfig) -> AnyContactStore {
	match config {
		DatabaseConfig::Mongo(mongo) => AnyContactStore::Mongo(MongoStore::new(mongo)),
		DatabaseConfig::Memory(memory) => AnyContactStore::Memory(MemoryStore::new(memory)),
	}
}

/// Orders newest first. The sort is stable over the reversed insertion
/// order so records sharing a timestamp also come out newest first.
pub(crate) fn sort_newest_first(contacts: &mut [Contact]) {
	contacts.reverse();
	contacts.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}
