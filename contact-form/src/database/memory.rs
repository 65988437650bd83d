use tokio::sync::RwLock;

use super::{sort_newest_first, Contact, ContactStore, NewContact, StoreError};
use crate::config::MemoryStoreConfig;

#[derive(Debug)]
pub struct MemoryStore {
	capacity: usize,
	contacts: RwLock<Vec<Contact>>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MemoryStoreError {
	#[error("capacity of {0} submissions reached")]
	CapacityExceeded(usize),
}

impl MemoryStore {
	pub fn new(config: &MemoryStoreConfig) -> Self {
		tracing::debug!("setting up memory store");
		Self {
			capacity: config.capacity.unwrap_or(usize::MAX),
			contacts: RwLock::new(Vec::new()),
		}
	}
}

impl ContactStore for MemoryStore {
	fn name(&self) -> &str {
		"memory"
	}

	#[tracing::instrument(skip_all, name = "MemoryStore::create", err)]
	async fn create(&self, contact: NewContact) -> Result<Contact, StoreError> {
		let mut contacts = self.contacts.write().await;

		if contacts.len() >= self.capacity {
			return Err(MemoryStoreError::CapacityExceeded(self.capacity).into());
		}

		let contact = Contact::from_new(contact);
		contacts.push(contact.clone());

		tracing::debug!(id = %contact.id, "stored submission");

		Ok(contact)
	}

	#[tracing::instrument(skip_all, name = "MemoryStore::list_all", err)]
	async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
		let mut contacts = self.contacts.read().await.clone();
		sort_newest_first(&mut contacts);
		Ok(contacts)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn new_contact(name: &str) -> NewContact {
		NewContact {
			name: name.into(),
			email: format!("{name}@example.com"),
			phone: String::new(),
			subject: String::new(),
			message: "hi".into(),
		}
	}

	#[tokio::test]
	async fn lists_newest_first() {
		let store = MemoryStore::new(&MemoryStoreConfig::default());

		for name in ["first", "second", "third"] {
			store.create(new_contact(name)).await.unwrap();
		}

		let contacts = store.list_all().await.unwrap();
		let names = contacts.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, ["third", "second", "first"]);
		assert!(contacts.windows(2).all(|w| w[0].submitted_at >= w[1].submitted_at));
	}

	#[tokio::test]
	async fn rejects_writes_past_capacity() {
		let store = MemoryStore::new(&MemoryStoreConfig { capacity: Some(1) });

		store.create(new_contact("kept")).await.unwrap();
		let err = store.create(new_contact("dropped")).await.unwrap_err();

		assert!(matches!(err, StoreError::Memory(MemoryStoreError::CapacityExceeded(1))));
		assert_eq!(store.list_all().await.unwrap().len(), 1);
	}
}
