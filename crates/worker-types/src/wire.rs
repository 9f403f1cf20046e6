// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Message tags and frame shapes for the three protocols in play: the
//! client/broker protocol, the broker control-broadcast protocol, and the
//! worker/worker peer protocol. Frames themselves are raw bytes; this module
//! only fixes the tag constants and the typed payloads carried after them.

use serde::{Deserialize, Serialize};

use crate::{broker::BrokerEntry, callable::CallableRef, identity::Identity, task::GroupId};

pub mod tag {
    pub const INIT: &[u8] = b"INIT";
    pub const TASK: &[u8] = b"TASK";
    pub const VARIABLE: &[u8] = b"VARIABLE";
    pub const TASKEND: &[u8] = b"TASKEND";
    pub const REQUEST: &[u8] = b"REQUEST";
    pub const WORKERDOWN: &[u8] = b"WORKERDOWN";
    pub const SHUTDOWN: &[u8] = b"SHUTDOWN";
    pub const BROKER_INFO: &[u8] = b"BROKER_INFO";
    pub const REPLY: &[u8] = b"REPLY";
    pub const GROUP: &[u8] = b"GROUP";
}

/// The payload carried in a VARIABLE value frame. Self-describing by
/// construction: the wire always carries one of these two variants, so
/// decoding never has to guess whether an arbitrary value blob happens to
/// also be a valid `CallableRef`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableValue {
    /// An opaque, already-encoded value the core never interprets.
    Plain(Vec<u8>),
    /// A function capability shipped for materialization on receipt.
    Capability(CallableRef),
}

/// A message broadcast by a broker on its info/control channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    Shutdown,
    /// Note the wire frame order is name, value, key — the key (group) is
    /// the last frame, not the first.
    Variable {
        name: String,
        value: VariableValue,
        key: String,
    },
    TaskEnd {
        source: Option<Identity>,
        group_id: GroupId,
    },
    BrokerInfo {
        primary: BrokerEntry,
        others: Vec<BrokerEntry>,
    },
}

/// The `[group_id, seq, total]` triple carried by a `GROUP` frame. `total`
/// is the engine's running aggregate, opaque to the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReductionPartial {
    pub group_id: GroupId,
    pub seq: u64,
    pub total: Vec<u8>,
}
