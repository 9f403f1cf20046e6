// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Mapping from group-key to (mapping from variable-name to value). Updates
/// are monotonic and last-writer-wins. Values are kept as opaque
/// already-encoded bytes; the core never interprets them.
#[derive(Default)]
pub struct SharedVariables {
    groups: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl SharedVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`/`name`, overwriting whatever was there.
    pub fn insert(&self, key: &str, name: &str, value: Vec<u8>) {
        let mut groups = self.groups.write();
        groups.entry(key.to_string()).or_default().insert(name.to_string(), value);
    }

    pub fn get(&self, key: &str, name: &str) -> Option<Vec<u8>> {
        self.groups.read().get(key)?.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.read().values().map(|names| names.len()).sum()
    }

    /// Merges in the variable table received in an INIT reply.
    pub fn merge(&self, other: BTreeMap<String, BTreeMap<String, Vec<u8>>>) {
        let mut groups = self.groups.write();
        for (key, names) in other {
            groups.entry(key).or_default().extend(names);
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, Vec<u8>>> {
        self.groups.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let vars = SharedVariables::new();
        vars.insert("group-a", "x", vec![1, 2, 3]);
        assert_eq!(vars.get("group-a", "x"), Some(vec![1, 2, 3]));
        assert_eq!(vars.get("group-a", "y"), None);
    }

    #[test]
    fn later_insert_overwrites_earlier() {
        let vars = SharedVariables::new();
        vars.insert("group-a", "x", vec![1]);
        vars.insert("group-a", "x", vec![2]);
        assert_eq!(vars.get("group-a", "x"), Some(vec![2]));
    }

    #[test]
    fn merge_adds_without_dropping_existing() {
        let vars = SharedVariables::new();
        vars.insert("group-a", "x", vec![1]);
        let mut incoming = BTreeMap::new();
        incoming.insert("group-a".to_string(), BTreeMap::from([("y".to_string(), vec![2])]));
        incoming.insert("group-b".to_string(), BTreeMap::from([("z".to_string(), vec![3])]));
        vars.merge(incoming);
        assert_eq!(vars.get("group-a", "x"), Some(vec![1]));
        assert_eq!(vars.get("group-a", "y"), Some(vec![2]));
        assert_eq!(vars.get("group-b", "z"), Some(vec![3]));
    }
}
