//! # Storage Module
//!
//! Typed access to the persisted collections (pantry, purchased set, menu,
//! shopping list, servings, favorites and history) on top of a raw,
//! string-keyed [`KeyValueStore`].
//!
//! ## Failure model
//!
//! - reads never fail: a missing or unparsable value logs a warning and
//!   yields the documented default
//! - writes land in the session cache first, then in the backend; a backend
//!   failure keeps the key pending, is retried after the next successful
//!   write and is reported through [`Store::take_write_failures`]; callers
//!   that never drain it only keep the most recent
//!   [`MAX_RECORDED_FAILURES`] entries

use crate::config::EngineConfig;
use crate::favorites::UserData;
use crate::recipe_model::MenuEntry;
use crate::shopping_list::ShoppingItem;
use crate::storage_errors::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const PANTRY_KEY: &str = "pantry-items";
pub const MENU_KEY: &str = "menu-items";
pub const SHOPPING_LIST_KEY: &str = "shopping-list";
pub const PURCHASED_KEY: &str = "purchased-ingredients";
pub const SERVINGS_KEY: &str = "servings";
pub const USER_DATA_KEY: &str = "today-what-to-eat";

/// Write failures kept until [`Store::take_write_failures`] drains them
pub const MAX_RECORDED_FAILURES: usize = 32;

/// Raw durable string-keyed storage
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Store `value` under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete `key`; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

/// In-memory backend with an optional byte quota
///
/// Clones share the same entries, so a test can keep a handle after moving
/// one into a [`Store`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes past `bytes` in total
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::default();
        store.set_quota(Some(bytes));
        store
    }

    /// Change the quota; `None` removes it
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.state.borrow_mut().quota = bytes;
    }

    /// Raw value under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Store a raw value without quota checks
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
    }

    fn used_bytes_without(state: &MemoryState, key: &str) -> usize {
        state
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if let Some(limit) = state.quota {
            let needed = Self::used_bytes_without(&state, key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.state.borrow_mut().entries.remove(key);
        Ok(())
    }
}

/// JSON file backend; the whole map is rewritten on every write
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a file store, starting empty when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the file exists but cannot be read.
    /// A file that is not a JSON object is treated as empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable store file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        info!("Opened file store at {} with {} keys", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed persisted collections shared by every component
pub struct Store {
    backend: RefCell<Box<dyn KeyValueStore>>,
    cache: RefCell<HashMap<String, String>>,
    pending: RefCell<BTreeSet<String>>,
    failures: RefCell<Vec<StorageError>>,
    config: EngineConfig,
}

impl Store {
    /// Wrap a backend
    pub fn new(backend: Box<dyn KeyValueStore>, config: EngineConfig) -> Self {
        Self {
            backend: RefCell::new(backend),
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(BTreeSet::new()),
            failures: RefCell::new(Vec::new()),
            config,
        }
    }

    /// Store over a fresh [`MemoryStore`] with the default configuration
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), EngineConfig::default())
    }

    /// Configuration the store was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a value exists for `key`, in this session or durably
    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    fn raw(&self, key: &str) -> Option<String> {
        if let Some(value) = self.cache.borrow().get(key) {
            return Some(value.clone());
        }
        match self.backend.borrow().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                None
            }
        }
    }

    /// Read and decode a value, `None` when missing or unparsable
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored value for '{}' is not valid, using default: {}", key, e);
                None
            }
        }
    }

    /// Encode and write a value
    ///
    /// The session cache is updated even when the backend rejects the write.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the key then stays pending until a later
    /// write succeeds.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.cache.borrow_mut().insert(key.to_string(), json.clone());

        let result = self.backend.borrow_mut().set(key, &json);
        match result {
            Ok(()) => {
                self.pending.borrow_mut().remove(key);
                debug!("Persisted '{}' ({} bytes)", key, json.len());
                self.retry_pending();
                Ok(())
            }
            Err(e) => {
                warn!("Write of '{}' not persisted, kept for this session: {}", key, e);
                self.pending.borrow_mut().insert(key.to_string());
                self.record_failure(e.clone());
                Err(e)
            }
        }
    }

    fn record_failure(&self, error: StorageError) {
        let mut failures = self.failures.borrow_mut();
        if failures.len() == MAX_RECORDED_FAILURES {
            failures.remove(0);
        }
        failures.push(error);
    }

    /// Delete a value
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.cache.borrow_mut().remove(key);
        self.pending.borrow_mut().remove(key);
        self.backend.borrow_mut().remove(key)
    }

    fn retry_pending(&self) {
        let keys: Vec<String> = self.pending.borrow().iter().cloned().collect();
        for key in keys {
            let value = match self.cache.borrow().get(&key) {
                Some(value) => value.clone(),
                None => continue,
            };
            let retried = self.backend.borrow_mut().set(&key, &value);
            if retried.is_ok() {
                info!("Pending write of '{}' persisted", key);
                self.pending.borrow_mut().remove(&key);
            }
        }
    }

    /// Keys whose latest value is only held in this session
    pub fn pending_keys(&self) -> Vec<String> {
        self.pending.borrow().iter().cloned().collect()
    }

    /// Whether everything written so far is durable
    pub fn is_durable(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Drain the write failures recorded since the last call
    ///
    /// The kitchen drains after every command. Components used on their own
    /// should drain too; older entries beyond [`MAX_RECORDED_FAILURES`] are
    /// dropped.
    pub fn take_write_failures(&self) -> Vec<StorageError> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }

    // Typed collections. Setters return whether the write was durable.

    /// Pantry ingredient names
    pub fn pantry(&self) -> Vec<String> {
        self.read(PANTRY_KEY).unwrap_or_default()
    }

    pub fn set_pantry(&self, items: &[String]) -> bool {
        self.write(PANTRY_KEY, items).is_ok()
    }

    /// Names checked off on shopping runs
    pub fn purchased(&self) -> Vec<String> {
        self.read(PURCHASED_KEY).unwrap_or_default()
    }

    pub fn set_purchased(&self, items: &[String]) -> bool {
        self.write(PURCHASED_KEY, items).is_ok()
    }

    /// Menu entries, most recent first
    pub fn menu(&self) -> Vec<MenuEntry> {
        self.read(MENU_KEY).unwrap_or_default()
    }

    pub fn set_menu(&self, entries: &[MenuEntry]) -> bool {
        self.write(MENU_KEY, entries).is_ok()
    }

    /// Current shopping list
    pub fn shopping_list(&self) -> Vec<ShoppingItem> {
        self.read(SHOPPING_LIST_KEY).unwrap_or_default()
    }

    pub fn set_shopping_list(&self, items: &[ShoppingItem]) -> bool {
        self.write(SHOPPING_LIST_KEY, items).is_ok()
    }

    /// Swap the whole shopping list in a single write
    ///
    /// No reader can observe an empty list between the old and new contents.
    pub fn replace_shopping_list(&self, items: &[ShoppingItem]) -> bool {
        debug!("Replacing shopping list with {} items", items.len());
        self.set_shopping_list(items)
    }

    /// Serving count, clamped to the accepted range
    pub fn servings(&self) -> u32 {
        match self.read::<i64>(SERVINGS_KEY) {
            Some(value) => self.config.sanitize_servings(value),
            None => self.config.default_servings,
        }
    }

    pub fn set_servings(&self, servings: u32) -> bool {
        let servings = servings.clamp(1, self.config.max_stored_servings);
        self.write(SERVINGS_KEY, &servings).is_ok()
    }

    /// Favorites and view history
    pub fn user_data(&self) -> UserData {
        self.read(USER_DATA_KEY).unwrap_or_default()
    }

    pub fn set_user_data(&self, data: &UserData) -> bool {
        self.write(USER_DATA_KEY, data).is_ok()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("cached_keys", &self.cache.borrow().len())
            .field("pending", &*self.pending.borrow())
            .finish()
    }
}
