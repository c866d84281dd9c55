use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A host key identifier such as `"w"`, `"ArrowUp"` or `"ShiftLeft"`.
///
/// Names follow the browser `KeyboardEvent.key` vocabulary. Single letters are
/// stored lowercase so a shifted letter still counts as the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self(c.to_lowercase().collect()),
            _ => Self(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query interface the movement policy reads from.
pub trait InputSampler {
    fn is_held(&self, key: &Key) -> bool;
}

/// Held state of every key the host has reported.
///
/// Updated only by key-down / key-up edges from the host.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<Key, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-down edge.
    pub fn press(&mut self, key: impl Into<Key>) {
        self.keys.insert(key.into(), true);
    }

    /// Key-up edge.
    pub fn release(&mut self, key: impl Into<Key>) {
        self.keys.insert(key.into(), false);
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Keys currently held, in no particular order.
    pub fn held(&self) -> impl Iterator<Item = &Key> {
        self.keys
            .iter()
            .filter_map(|(key, held)| (*held).then_some(key))
    }
}

impl InputSampler for InputState {
    fn is_held(&self, key: &Key) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }
}
