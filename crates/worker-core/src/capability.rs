// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use dashmap::DashSet;

/// Tracks which capability ids are known locally.
///
/// Instead of rebinding a deserialized closure as an attribute of a main
/// module, both ends simply agree the capability with this name exists.
/// Resolving a capability is then just a membership check; actually
/// invoking it is the engine's job, not the core's.
pub struct CapabilityRegistry {
    known: DashSet<String>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self { known: DashSet::new() }
    }

    /// Registers a capability id as resolvable, e.g. after a `VARIABLE`
    /// carrying a function encapsulation is materialized.
    pub fn register(&self, id: impl Into<String>) {
        self.known.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_capability_is_known() {
        let registry = CapabilityRegistry::new();
        assert!(!registry.contains("sum"));
        registry.register("sum");
        assert!(registry.contains("sum"));
    }
}
