// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, trace, warn};
use worker_types::{resolve_callable, tag, CallableResolution, ControlMessage, Identity, TaskEnvelope, VariableValue};

use crate::communicator::Communicator;
use crate::errors::{CommError, CommResult};
use crate::metrics::counter_inc;
use crate::protocol;

impl Communicator {
    /// Non-blocking: drains every pending control message, applying each in
    /// arrival order. Returns `Err(CommError::Shutdown(_))` as soon as a
    /// `SHUTDOWN` is observed; any control messages after it in the same
    /// drain are left unprocessed.
    pub async fn drain_control(&self) -> CommResult<()> {
        for frames in self.control.drain() {
            let Some((tag_frame, rest)) = frames.split_first() else {
                continue;
            };
            match protocol::decode_control(tag_frame, rest) {
                Ok(Some(message)) => self.handle_control_message(message).await?,
                Ok(None) => warn!("malformed control message with tag {:?}", tag_frame),
                Err(err) => warn!("failed to decode control message: {err}"),
            }
        }
        Ok(())
    }

    async fn handle_control_message(&self, message: ControlMessage) -> CommResult<()> {
        match message {
            ControlMessage::Shutdown => {
                let already_requested = self.context.shutdown_requested();
                if self.context.is_origin && !already_requested {
                    error!("a peer died unexpectedly; shutting down");
                } else {
                    debug!("received SHUTDOWN");
                }
                Err(CommError::Shutdown("received SHUTDOWN control message".into()))
            }
            ControlMessage::Variable { name, value, key } => {
                let stored = match &value {
                    VariableValue::Capability(callable) => {
                        self.context.capabilities.register(callable.identity());
                        debug!(%name, "materialized callable capability from VARIABLE");
                        bcs::to_bytes(callable).map_err(CommError::from)?
                    }
                    VariableValue::Plain(bytes) => bytes.clone(),
                };
                self.shared_variables.insert(&key, &name, stored);
                Ok(())
            }
            ControlMessage::TaskEnd { source, group_id } => {
                if let Some(source) = source {
                    if source != *self.identity() {
                        let (seq, total) = self.reduction.current(group_id);
                        if let Err(err) = self.send_grouped_result(&source, group_id, seq, total).await {
                            warn!(%source, "failed to emit grouped result on TASKEND: {err}");
                        }
                    }
                }
                self.reduction.clean_group_id(group_id);
                Ok(())
            }
            ControlMessage::BrokerInfo { primary, others } => {
                self.brokers.apply_broker_info(primary, others);
                Ok(())
            }
        }
    }

    /// Drains currently-available decoded futures without blocking past
    /// `timeout`, returning a finite `Vec` produced per call.
    pub async fn recv_futures(&self, timeout: Duration) -> CommResult<Vec<TaskEnvelope>> {
        let mut futures = Vec::new();
        loop {
            match self.recv_one(Duration::from_millis(0)).await {
                Ok(Some(future)) => futures.push(future),
                Ok(None) => break,
                Err(err) => return Err(err),
            }
        }
        if !futures.is_empty() {
            return Ok(futures);
        }
        if let Some(future) = self.recv_one(timeout).await? {
            futures.push(future);
        }
        Ok(futures)
    }

    /// One iteration of the dispatch loop: drain control, then poll and
    /// classify exactly one inbound message, preferring the peer-server
    /// over the broker-facing client socket.
    async fn recv_one(&self, timeout: Duration) -> CommResult<Option<TaskEnvelope>> {
        self.drain_control().await?;

        if let Some((sender, frames)) = self.peer_server_try_recv() {
            return self.classify_peer_message(sender, frames).await;
        }
        if let Some(frames) = self.client.try_recv() {
            return self.classify_client_message(frames).await;
        }

        tokio::select! {
            biased;
            peer = self.peer_server_recv(timeout) => {
                match peer {
                    Some((sender, frames)) => self.classify_peer_message(sender, frames).await,
                    None => Ok(None),
                }
            }
            client = self.client.recv(timeout) => {
                match client {
                    Some(frames) => self.classify_client_message(frames).await,
                    None => Ok(None),
                }
            }
        }
    }

    fn peer_server_try_recv(&self) -> Option<(Identity, Vec<Bytes>)> {
        let mut guard = self.peer_server.try_lock().ok()?;
        guard.try_recv()
    }

    async fn peer_server_recv(&self, timeout: Duration) -> Option<(Identity, Vec<Bytes>)> {
        self.peer_server.lock().await.recv(timeout).await
    }

    async fn classify_client_message(&self, frames: Vec<Bytes>) -> CommResult<Option<TaskEnvelope>> {
        let Some(payload) = frames.first() else {
            return Ok(None);
        };
        let future = self.decode_and_resolve(payload)?;
        self.peers.insert(future.id.worker.clone());
        counter_inc!(self.context.metrics, tasks_received);
        trace!(task_id = future.id.local, "received task from broker");
        Ok(Some(future))
    }

    async fn classify_peer_message(&self, sender: Identity, frames: Vec<Bytes>) -> CommResult<Option<TaskEnvelope>> {
        let Some((tag_frame, rest)) = frames.split_first() else {
            return Ok(None);
        };
        if tag_frame.as_ref() == tag::GROUP {
            let Some(payload) = rest.first() else {
                return Ok(None);
            };
            let partial = protocol::decode_grouped_result(payload)?;
            self.reduction.record_answer(partial.group_id, sender, partial.seq, partial.total);
            return Ok(None);
        }
        if tag_frame.as_ref() == tag::REPLY {
            let Some(payload) = rest.first() else {
                return Ok(None);
            };
            let future = self.decode_and_resolve(payload)?;
            trace!(%sender, task_id = future.id.local, "received reply from peer");
            return Ok(Some(future));
        }
        warn!(%sender, "peer message with unrecognized tag");
        Ok(None)
    }

    fn decode_and_resolve(&self, payload: &[u8]) -> CommResult<TaskEnvelope> {
        let mut future = protocol::decode_task(payload)?;
        if let Some(callable) = future.callable.clone() {
            match resolve_callable(&callable, future.ended, |id| self.context.capabilities.contains(id)) {
                CallableResolution::Ready(id) => {
                    future.callable = Some(worker_types::CallableRef::ById(id));
                }
                CallableResolution::Unresolved => {
                    error!(capability = %callable.identity(), "unresolved capability; ensure it was registered before the task arrived");
                    return Err(CommError::ReferenceBroken(callable.identity()));
                }
            }
        }
        Ok(future)
    }
}
