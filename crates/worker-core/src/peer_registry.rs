// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use dashmap::DashSet;
use worker_types::Identity;

/// Tracks workers this worker has (or is establishing) a direct connection
/// to. A plain set, since insertion order doesn't affect correctness.
pub struct PeerRegistry {
    peers: DashSet<Identity>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self { peers: DashSet::new() }
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.peers.contains(identity)
    }

    /// Returns `true` if `identity` was newly registered (the caller should
    /// then open the direct connection and wait out the connect grace
    /// period before its first send).
    pub fn insert(&self, identity: Identity) -> bool {
        self.peers.insert(identity)
    }

    /// Drops a peer whose direct connection turned out to be stale, so the
    /// next send starts a fresh connect rather than reusing a dead one.
    pub fn evict(&self, identity: &Identity) {
        self.peers.remove(identity);
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
