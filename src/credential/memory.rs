//! Thread-safe in-memory [`KeyValueStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	credential::{KeyValueStore, StoreError},
};

/// Process-wide string map guarded by a read/write lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<String, String>>>);
impl MemoryStore {
	/// Number of stored keys.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether the store holds no keys.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.write().remove(key))
	}
}
