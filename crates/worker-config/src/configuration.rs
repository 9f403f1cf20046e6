// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user-supplied configuration bag round-tripped through `INIT`. The
/// core never interprets its contents, only ships it to the broker and
/// merges back whatever the broker hands back (the broker may add entries
/// other workers have already contributed).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfiguration(BTreeMap<String, Value>);

impl WorkerConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges `other` on top of `self`, last-writer-wins, matching how the
    /// broker's reply updates the worker's local configuration.
    pub fn merge(&mut self, other: WorkerConfiguration) {
        self.0.extend(other.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_last_writer_wins() {
        let mut cfg = WorkerConfiguration::new();
        cfg.insert("x", Value::from(0));
        let mut update = WorkerConfiguration::new();
        update.insert("x", Value::from(1));
        update.insert("y", Value::from(2));
        cfg.merge(update);
        assert_eq!(cfg.get("x"), Some(&Value::from(1)));
        assert_eq!(cfg.get("y"), Some(&Value::from(2)));
    }
}
