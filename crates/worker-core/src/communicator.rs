// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use worker_config::WorkerConfiguration;
use worker_types::BrokerEntry;

use crate::broker_registry::BrokerRegistry;
use crate::context::Context;
use crate::network::{ClientSocket, ControlSocket, PeerClientPool, PeerServer};
use crate::peer_registry::PeerRegistry;
use crate::reduction::{ReductionSink, SharedConstants};
use crate::shared_variables::SharedVariables;

/// The worker-side communicator: registers with brokers, receives tasks,
/// ships results and shared variables, and routes grouped reductions. Owns
/// the three inbound sockets and the two shared registries; see the module
/// docs on `lifecycle`, `dispatch` and `send` for the operations layered on
/// top of this struct.
pub struct Communicator {
    pub(crate) context: Arc<Context>,
    pub(crate) client: ClientSocket,
    pub(crate) control: ControlSocket,
    pub(crate) peer_server: tokio::sync::Mutex<PeerServer>,
    pub(crate) peer_clients: PeerClientPool,
    pub(crate) brokers: BrokerRegistry,
    pub(crate) peers: PeerRegistry,
    pub(crate) shared_variables: SharedVariables,
    pub(crate) reduction: Arc<dyn ReductionSink>,
    pub(crate) shared_constants: Arc<dyn SharedConstants>,
    pub(crate) configuration: parking_lot::RwLock<WorkerConfiguration>,
    pub(crate) open: AtomicBool,
}

impl Communicator {
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn identity(&self) -> &worker_types::Identity {
        &self.context.identity
    }

    pub fn configuration(&self) -> WorkerConfiguration {
        self.configuration.read().clone()
    }

    pub fn connected_brokers(&self) -> Vec<BrokerEntry> {
        self.brokers.snapshot()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub async fn peer_server_port(&self) -> u16 {
        self.peer_server.lock().await.port()
    }

    pub fn shared_variable(&self, key: &str, name: &str) -> Option<Vec<u8>> {
        self.shared_variables.get(key, name)
    }
}
