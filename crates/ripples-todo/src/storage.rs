use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::{Filter, Todo, TodoState};

/// String key-value store, shaped like the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.items.borrow_mut().insert(key.to_string(), value);
    }
}

/// The persisted subset of the state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub todos: Vec<Todo>,
    pub filter: Filter,
}

impl Snapshot {
    pub fn of(state: &TodoState) -> Self {
        Self {
            todos: state.todos.clone(),
            filter: state.filter,
        }
    }
}

pub fn save(storage: &dyn KeyValueStore, key: &str, state: &TodoState) -> anyhow::Result<()> {
    let json = serde_json::to_string(&Snapshot::of(state)).context("serializing todos")?;
    storage.set_item(key, json);
    Ok(())
}

/// Saves under one key, skipping writes that would store the same snapshot.
pub struct Persister {
    storage: Rc<dyn KeyValueStore>,
    key: String,
    last: RefCell<Option<Snapshot>>,
}

impl Persister {
    pub fn new(storage: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            last: RefCell::new(None),
        }
    }

    /// Returns whether anything was written.
    pub fn persist(&self, state: &TodoState) -> anyhow::Result<bool> {
        if let Some(last) = self.last.borrow().as_ref()
            && last.filter == state.filter
            && last.todos == state.todos
        {
            return Ok(false);
        }
        save(self.storage.as_ref(), &self.key, state)?;
        *self.last.borrow_mut() = Some(Snapshot::of(state));
        Ok(true)
    }
}

/// `Ok(None)` when nothing was stored yet.
pub fn load(storage: &dyn KeyValueStore, key: &str) -> anyhow::Result<Option<Snapshot>> {
    let Some(raw) = storage.get_item(key) else {
        return Ok(None);
    };
    let snapshot = serde_json::from_str(&raw).with_context(|| format!("parsing {key:?}"))?;
    Ok(Some(snapshot))
}
