//! The entry table. Plain data; the [`Store`](super::Store) guards it.

use std::collections::HashMap;

use tokio::task::AbortHandle;

use super::KeyValue;

/// One stored value and, when bound, the process it belongs to.
#[derive(Debug)]
pub(crate) struct Entry {
    value: String,
    owner: Option<u32>,
    /// Watcher reclaiming this entry when `owner` exits.
    watcher: Option<AbortHandle>,
}

impl Entry {
    pub(crate) fn new(value: String, owner: Option<u32>, watcher: Option<AbortHandle>) -> Self {
        Self {
            value,
            owner,
            watcher,
        }
    }

    /// Stops the watcher of an entry that has been superseded.
    fn retire(self) {
        if let Some(watcher) = self.watcher {
            watcher.abort();
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntryTable {
    entries: HashMap<String, Entry>,
}

impl EntryTable {
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.value.as_str())
    }

    /// Installs `entry` under `key`, retiring whatever was there.
    /// Returns the owner of the replaced entry, if any entry was replaced.
    pub(crate) fn insert(&mut self, key: String, entry: Entry) -> Option<Option<u32>> {
        self.entries.insert(key, entry).map(|old| {
            let owner = old.owner;
            old.retire();
            owner
        })
    }

    /// Removes the entry at `key` only while it is still bound to `owner`.
    pub(crate) fn remove_if_owned_by(&mut self, key: &str, owner: u32) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.owner == Some(owner) => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<KeyValue> {
        self.entries
            .iter()
            .map(|(key, entry)| KeyValue {
                key: key.clone(),
                value: entry.value.clone(),
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
