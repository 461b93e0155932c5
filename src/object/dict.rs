use super::{HashKey, Object};
use std::collections::HashMap;

/// Insertion-ordered mapping backing dict values.
#[derive(Debug, Clone, Default)]
pub struct DictValue {
    entries: Vec<(HashKey, Object)>,
    index: HashMap<HashKey, usize>,
}

impl DictValue {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &HashKey) -> Option<&Object> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &HashKey) -> bool {
        self.index.contains_key(key)
    }

    /// Overwriting an existing key keeps its original position.
    pub fn insert(&mut self, key: HashKey, value: Object) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HashKey, &Object)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &HashKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Object> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for DictValue {
    fn eq(&self, other: &DictValue) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).map_or(false, |v| v == value))
    }
}

impl FromIterator<(HashKey, Object)> for DictValue {
    fn from_iter<I: IntoIterator<Item = (HashKey, Object)>>(iter: I) -> Self {
        let mut dict = DictValue::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}
