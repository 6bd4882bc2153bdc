use std::cell::RefCell;
use std::collections::HashMap;

use super::error::LoadError;

/// String-keyed persistent store the loader caches documents in.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), LoadError>;
}

/// `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, LoadError> {
        let storage = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or(LoadError::StorageUnavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LoadError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| LoadError::StorageWrite(key.to_string()))
    }
}

/// Lives as long as the page; used when local storage is blocked.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LoadError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Local storage when the browser allows it, otherwise an in-memory map.
pub fn browser_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            console_warn!("{e}, caching in memory for this page only");
            Box::new(MemoryStore::default())
        }
    }
}
