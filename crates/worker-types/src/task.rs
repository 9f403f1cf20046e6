// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{callable::CallableRef, identity::Identity};

/// Identifies a reduction group a task's result feeds into.
pub type GroupId = u64;

/// Identifies a task and its originating worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskId {
    pub worker: Identity,
    pub local: u64,
}

/// The task/result descriptor the core round-trips. Engine-specific payload
/// (arguments, return value, scheduling metadata the core never looks at)
/// lives in `extra` as an opaque, already-encoded blob; the core only reads
/// and writes the fields named in the component design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub id: TaskId,
    pub callable: Option<CallableRef>,
    pub ended: bool,
    pub send_result_back: bool,
    pub args: Option<Vec<u8>>,
    pub result: Option<Vec<u8>>,
    pub group_id: Option<GroupId>,
    pub extra: Vec<u8>,
}

impl TaskEnvelope {
    /// Strips the fields that only make sense on the sending side before a
    /// result is shipped back: the callable, the arguments, and (if the
    /// caller never asked for it) the result payload itself.
    pub fn into_result(mut self) -> Self {
        self.callable = None;
        self.args = None;
        if !self.send_result_back {
            self.result = None;
        }
        self
    }
}
