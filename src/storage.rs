/// Persistent store adapters for the group record and user settings

use crate::bridge;
use crate::error::StoreError;
use crate::settings::{GROUPS_KEY, Settings};
use crate::tab_data::Group;
use std::cell::{Cell, RefCell};

/// Key-value storage holding the whole group list under one key.
/// Each call reads or overwrites the full list.
#[allow(async_fn_in_trait)]
pub trait GroupStore {
    async fn load(&self) -> Result<Vec<Group>, StoreError>;
    async fn save(&self, groups: &[Group]) -> Result<(), StoreError>;
}

/// `chrome.storage.local`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl GroupStore for ChromeStore {
    async fn load(&self) -> Result<Vec<Group>, StoreError> {
        let stored = bridge::getLocal(GROUPS_KEY)
            .await
            .map_err(|e| StoreError::Read(bridge::describe(&e)))?;

        if stored.is_null() || stored.is_undefined() {
            Ok(Vec::new())
        } else {
            serde_wasm_bindgen::from_value(stored).map_err(|e| StoreError::Decode(e.to_string()))
        }
    }

    async fn save(&self, groups: &[Group]) -> Result<(), StoreError> {
        let value =
            serde_wasm_bindgen::to_value(groups).map_err(|e| StoreError::Encode(e.to_string()))?;

        bridge::setLocal(GROUPS_KEY, value)
            .await
            .map_err(|e| StoreError::Write(bridge::describe(&e)))
    }
}

/// In-process store; stands in for browser storage wherever no extension runtime exists
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: RefCell<Vec<Group>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(groups: Vec<Group>) -> Self {
        MemoryStore {
            groups: RefCell::new(groups),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<Group> {
        self.groups.borrow().clone()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl GroupStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.stored())
    }

    async fn save(&self, groups: &[Group]) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Write("storage unavailable".to_string()));
        }
        *self.groups.borrow_mut() = groups.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Reads settings from `chrome.storage.sync`, defaults filling any gap
pub async fn load_settings() -> Result<Settings, StoreError> {
    let defaults = serde_wasm_bindgen::to_value(&Settings::default())
        .map_err(|e| StoreError::Encode(e.to_string()))?;

    let stored = bridge::getSyncSettings(defaults)
        .await
        .map_err(|e| StoreError::Read(bridge::describe(&e)))?;

    serde_wasm_bindgen::from_value(stored).map_err(|e| StoreError::Decode(e.to_string()))
}

pub async fn save_settings(settings: &Settings) -> Result<(), StoreError> {
    let value =
        serde_wasm_bindgen::to_value(settings).map_err(|e| StoreError::Encode(e.to_string()))?;

    bridge::setSyncSettings(value)
        .await
        .map_err(|e| StoreError::Write(bridge::describe(&e)))
}
