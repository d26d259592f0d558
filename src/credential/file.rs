//! Simple file-backed [`KeyValueStore`] for CLIs and desktop shells that must keep a session
//! across restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	credential::{KeyValueStore, StoreError},
};

/// Stored value plus the instant it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
	/// Raw value.
	pub value: String,
	/// Write instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Persists entries to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<String, StoredEntry>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns the entry stored under `key` together with its write instant.
	pub fn entry(&self, key: &str) -> Option<StoredEntry> {
		self.inner.read().get(key).cloned()
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<String, StoredEntry>, StoreError> {
		if !path.exists() {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(BTreeMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &BTreeMap<String, StoredEntry>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.inner.read().get(key).map(|entry| entry.value.clone()))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let previous = guard.insert(key.to_owned(), StoredEntry {
			value: value.to_owned(),
			updated_at: OffsetDateTime::now_utc(),
		});

		if let Err(e) = self.persist_locked(&guard) {
			match previous {
				Some(entry) => guard.insert(key.to_owned(), entry),
				None => guard.remove(key),
			};

			return Err(e);
		}

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
		let mut guard = self.inner.write();
		let Some(previous) = guard.remove(key) else {
			return Ok(None);
		};

		if let Err(e) = self.persist_locked(&guard) {
			guard.insert(key.to_owned(), previous);

			return Err(e);
		}

		Ok(Some(previous.value))
	}
}
