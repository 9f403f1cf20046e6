// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Encoding and decoding of the frame sequences defined in the external
//! interfaces: the client/broker wire protocol, the control broadcast
//! protocol and the peer reply protocol. Socket types in `network` move raw
//! `Bytes`; this module is the only place that knows what the frames mean.

use bytes::Bytes;
use worker_types::{
    tag, BrokerEntry, CallableRef, ControlMessage, GroupId, Identity, ReductionPartial, TaskEnvelope, VariableValue,
};

use crate::errors::{CommError, CommResult};

pub fn encode_init(configuration: &[u8]) -> Vec<Bytes> {
    vec![Bytes::copy_from_slice(tag::INIT), Bytes::copy_from_slice(configuration)]
}

pub fn encode_task(envelope: &TaskEnvelope) -> CommResult<Vec<Bytes>> {
    let body = bcs::to_bytes(envelope)?;
    Ok(vec![Bytes::copy_from_slice(tag::TASK), Bytes::from(body)])
}

/// Inbound client-socket messages are a single frame holding a serialized
/// future; no leading tag.
pub fn decode_task(frame: &[u8]) -> CommResult<TaskEnvelope> {
    bcs::from_bytes(frame).map_err(CommError::from)
}

/// Emits `[VARIABLE, key, value, self_identity]` on the client socket. The
/// broker relays the three payload frames unchanged to every subscriber, so
/// what arrives there as `[name, value, key]` is this call's `key` (read as
/// the variable name), this call's `value`, and this call's `self_identity`
/// (read as the group the variable lives under).
pub fn encode_variable(key: &str, value: &[u8], self_identity: &Identity) -> CommResult<Vec<Bytes>> {
    encode_variable_value(key, VariableValue::Plain(value.to_vec()), self_identity)
}

/// Like `encode_variable`, but ships a function capability for
/// materialization on the receiving end instead of an opaque value.
pub fn encode_capability_variable(key: &str, callable: &CallableRef, self_identity: &Identity) -> CommResult<Vec<Bytes>> {
    encode_variable_value(key, VariableValue::Capability(callable.clone()), self_identity)
}

fn encode_variable_value(key: &str, value: VariableValue, self_identity: &Identity) -> CommResult<Vec<Bytes>> {
    Ok(vec![
        Bytes::copy_from_slice(tag::VARIABLE),
        Bytes::from(bcs::to_bytes(&key.to_string())?),
        Bytes::from(bcs::to_bytes(&value)?),
        Bytes::from(bcs::to_bytes(self_identity)?),
    ])
}

pub fn encode_task_end(group_id: GroupId, ask_results: bool) -> CommResult<Vec<Bytes>> {
    Ok(vec![
        Bytes::copy_from_slice(tag::TASKEND),
        Bytes::from(bcs::to_bytes(&ask_results)?),
        Bytes::from(bcs::to_bytes(&group_id)?),
    ])
}

pub fn encode_request() -> Vec<Bytes> {
    vec![Bytes::copy_from_slice(tag::REQUEST)]
}

pub fn encode_worker_down() -> Vec<Bytes> {
    vec![Bytes::copy_from_slice(tag::WORKERDOWN)]
}

pub fn encode_shutdown() -> Vec<Bytes> {
    vec![Bytes::copy_from_slice(tag::SHUTDOWN)]
}

pub fn encode_grouped_result(group_id: GroupId, seq: u64, total: Vec<u8>) -> CommResult<Vec<Bytes>> {
    let partial = ReductionPartial { group_id, seq, total };
    Ok(vec![Bytes::copy_from_slice(tag::GROUP), Bytes::from(bcs::to_bytes(&partial)?)])
}

pub fn decode_grouped_result(frame: &[u8]) -> CommResult<ReductionPartial> {
    bcs::from_bytes(frame).map_err(CommError::from)
}

/// Decodes one control-broadcast message. `frames[0]` is assumed to already
/// be consumed by the caller (it only determines which tag arm to take).
pub fn decode_control(tag_frame: &[u8], rest: &[Bytes]) -> CommResult<Option<ControlMessage>> {
    if tag_frame == tag::SHUTDOWN {
        return Ok(Some(ControlMessage::Shutdown));
    }
    if tag_frame == tag::VARIABLE {
        let [name, value, key] = rest else {
            return Ok(None);
        };
        let name: String = bcs::from_bytes(name)?;
        let key: String = bcs::from_bytes(key)?;
        let value: VariableValue = bcs::from_bytes(value)?;
        return Ok(Some(ControlMessage::Variable { name, value, key }));
    }
    if tag_frame == tag::TASKEND {
        let [source, group_id] = rest else {
            return Ok(None);
        };
        let source: String = bcs::from_bytes(source)?;
        let group_id: GroupId = bcs::from_bytes(group_id)?;
        let source = if source.is_empty() { None } else { Some(Identity::from(source)) };
        return Ok(Some(ControlMessage::TaskEnd { source, group_id }));
    }
    if tag_frame == tag::BROKER_INFO {
        let [primary, others] = rest else {
            return Ok(None);
        };
        let primary: BrokerEntry = bcs::from_bytes(primary)?;
        let others: Vec<BrokerEntry> = bcs::from_bytes(others)?;
        return Ok(Some(ControlMessage::BrokerInfo { primary, others }));
    }
    Ok(None)
}
