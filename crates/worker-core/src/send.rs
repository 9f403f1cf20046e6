// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use bytes::Bytes;
use tracing::warn;
use worker_types::{tag, CallableRef, GroupId, Identity, TaskEnvelope};

use crate::communicator::Communicator;
use crate::errors::CommResult;
use crate::metrics::counter_inc;
use crate::protocol;

impl Communicator {
    /// Sends a task to the broker pool, rewriting the callable to a
    /// name-reference when it is already registered as a shared constant.
    /// On a serialization failure, retries once with the callable replaced
    /// by its identity hash, then restores the original callable on the
    /// caller's copy regardless of outcome.
    pub async fn send_task(&self, mut future: TaskEnvelope) -> CommResult<()> {
        let original_callable = future.callable.clone();
        if let Some(callable) = &future.callable {
            let identity = callable.identity();
            if self.shared_constants.get_const(&identity, Duration::ZERO).await {
                future.callable = Some(CallableRef::ById(identity));
            }
        }

        let result = match protocol::encode_task(&future) {
            Ok(frames) => self.client.send(frames).await,
            Err(err) => {
                warn!("serializing task failed, retrying with callable rewritten to its identity: {err}");
                if let Some(callable) = &original_callable {
                    future.callable = Some(CallableRef::ById(callable.identity()));
                }
                match protocol::encode_task(&future) {
                    Ok(frames) => self.client.send(frames).await,
                    Err(err) => Err(err),
                }
            }
        };

        future.callable = original_callable;
        counter_inc!(self.context.metrics, tasks_sent);
        result
    }

    pub async fn send_result(&self, future: TaskEnvelope) -> CommResult<()> {
        let dest = future.id.worker.clone();
        let result = future.into_result();
        let frames = protocol::encode_task(&result)?;
        counter_inc!(self.context.metrics, results_sent);
        self.send_reply(&dest, frames).await
    }

    pub async fn send_grouped_result(&self, dest: &Identity, group_id: GroupId, seq: u64, total: Vec<u8>) -> CommResult<()> {
        let frames = protocol::encode_grouped_result(group_id, seq, total)?;
        counter_inc!(self.context.metrics, reductions_routed);
        self.send_direct(dest, frames).await
    }

    /// Ensures `dest` is a connected peer, then emits `[REPLY, *frames]`
    /// directly to it. A broker-routed fallback for an unreachable peer is
    /// not implemented.
    async fn send_reply(&self, dest: &Identity, frames: Vec<Bytes>) -> CommResult<()> {
        let mut out = vec![Bytes::copy_from_slice(tag::REPLY)];
        out.extend(frames);
        self.send_direct(dest, out).await
    }

    async fn send_direct(&self, dest: &Identity, frames: Vec<Bytes>) -> CommResult<()> {
        self.ensure_peer_connected(dest).await?;
        match self.peer_clients.send(dest, frames).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.peers.evict(dest);
                Err(err)
            }
        }
    }

    async fn ensure_peer_connected(&self, dest: &Identity) -> CommResult<()> {
        if self.peers.insert(dest.clone()) || !self.peer_clients.is_connected(dest).await {
            self.peer_clients.connect(dest).await?;
            counter_inc!(self.context.metrics, peers_connected);
            tokio::time::sleep(self.context.parameters.peer_connect_grace).await;
        }
        Ok(())
    }

    pub async fn send_variable(&self, key: &str, value: &[u8]) -> CommResult<()> {
        let frames = protocol::encode_variable(key, value, self.identity())?;
        counter_inc!(self.context.metrics, variables_sent);
        self.client.send(frames).await
    }

    /// Like `send_variable`, but ships a function capability for the
    /// receiving end to materialize instead of an opaque value.
    pub async fn send_capability_variable(&self, key: &str, callable: &CallableRef) -> CommResult<()> {
        let frames = protocol::encode_capability_variable(key, callable, self.identity())?;
        counter_inc!(self.context.metrics, variables_sent);
        self.client.send(frames).await
    }

    pub async fn task_end(&self, group_id: GroupId, ask_results: bool) -> CommResult<()> {
        let frames = protocol::encode_task_end(group_id, ask_results)?;
        self.client.send(frames).await
    }

    /// Emits one `REQUEST` frame to every connected broker.
    pub async fn request(&self) -> CommResult<()> {
        self.client.send_to_all(protocol::encode_request()).await
    }

    pub async fn worker_down(&self) -> CommResult<()> {
        self.client.send(protocol::encode_worker_down()).await
    }
}
