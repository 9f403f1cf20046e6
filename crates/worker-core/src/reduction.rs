// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use worker_types::{GroupId, Identity};

/// Hooks the core calls into on the engine's reduction table. The table
/// itself (`answers[group_id][sender] = (seq, total)`, `sequence`, `total`)
/// is owned by the engine; the core only ever writes a partial and asks for
/// a group to be forgotten once it has been finalized.
#[async_trait]
pub trait ReductionSink: Send + Sync {
    /// Records `reduction.answers[group_id][sender] = (seq, total)`. `total`
    /// is the engine's opaque running aggregate.
    fn record_answer(&self, group_id: GroupId, sender: Identity, seq: u64, total: Vec<u8>);

    /// The engine's current sequence number and running total for
    /// `group_id`, used to build an outgoing `GROUP` frame.
    fn current(&self, group_id: GroupId) -> (u64, Vec<u8>);

    /// Tells the engine this group is finalized and its bookkeeping can be
    /// dropped.
    fn clean_group_id(&self, group_id: GroupId);
}

/// Engine hook backing the shared-constants rewrite in `send_task`: lets the
/// core ask "has a capability with this identity already been registered as
/// a shared constant" without blocking when `timeout` is zero.
#[async_trait]
pub trait SharedConstants: Send + Sync {
    async fn get_const(&self, identity: &str, timeout: std::time::Duration) -> bool;
}
