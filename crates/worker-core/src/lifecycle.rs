// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::info;
use worker_config::{Parameters, WorkerConfiguration};
use worker_types::{BrokerEntry, Identity};

use crate::broker_registry::BrokerRegistry;
use crate::communicator::Communicator;
use crate::context::Context;
use crate::errors::{CommError, CommResult};
use crate::metrics::{counter_inc, Metrics};
use crate::network::{ClientSocket, ControlSocket, PeerClientPool, PeerServer};
use crate::peer_registry::PeerRegistry;
use crate::protocol;
use crate::reduction::{ReductionSink, SharedConstants};
use crate::shared_variables::SharedVariables;

impl Communicator {
    /// Runs the full handshake and returns an OPEN communicator.
    ///
    /// `is_origin` marks the worker that started the pool (governs how an
    /// unsolicited SHUTDOWN is treated). `reduction`/`shared_constants` are
    /// the engine-supplied hooks.
    pub async fn connect(
        parameters: Parameters,
        configuration: WorkerConfiguration,
        is_origin: bool,
        reduction: Arc<dyn ReductionSink>,
        shared_constants: Arc<dyn SharedConstants>,
    ) -> CommResult<Self> {
        let host = resolve_outbound_host(&parameters.primary_broker).await?;
        let peer_server = PeerServer::bind(parameters.peer_port_range, parameters.bind_retries).await?;
        let identity = Identity::new(host, peer_server.port());

        let control = ControlSocket::new();
        control.connect(&parameters.primary_broker.info_address()).await?;

        let client = ClientSocket::new();
        client.connect(&parameters.primary_broker.task_address()).await?;

        let context = Arc::new(Context::new(identity.clone(), parameters, is_origin, Arc::new(Metrics::new())));

        let encoded_configuration = bcs::to_bytes(&configuration)?;
        client.send(protocol::encode_init(&encoded_configuration)).await?;

        let init_timeout = std::time::Duration::from_secs(10);
        let updated_configuration: WorkerConfiguration = decode_reply_frame(&client, init_timeout).await?;
        let variables: BTreeMap<String, BTreeMap<String, Vec<u8>>> = decode_reply_frame(&client, init_timeout).await?;
        let additional_brokers: Vec<BrokerEntry> = decode_reply_frame(&client, init_timeout).await?;

        let mut merged_configuration = configuration;
        merged_configuration.merge(updated_configuration);

        let shared_variables = SharedVariables::new();
        shared_variables.merge(variables);

        let brokers = BrokerRegistry::new(context.parameters.target_broker_count);
        brokers.add(context.parameters.primary_broker.clone());
        counter_inc!(context.metrics, brokers_connected);
        for broker in additional_brokers {
            if brokers.add(broker) {
                counter_inc!(context.metrics, brokers_connected);
            }
        }

        info!(%identity, "worker handshake complete");

        Ok(Self {
            context,
            client,
            control,
            peer_server: tokio::sync::Mutex::new(peer_server),
            peer_clients: PeerClientPool::new(identity),
            brokers,
            peers: PeerRegistry::new(),
            shared_variables,
            reduction,
            shared_constants,
            configuration: parking_lot::RwLock::new(merged_configuration),
            open: std::sync::atomic::AtomicBool::new(true),
        })
    }

    /// Idempotent teardown: a second call is a no-op with the same
    /// observable effect as the first.
    pub async fn shutdown(&self) -> CommResult<()> {
        if self.open.swap(false, Ordering::SeqCst) {
            self.context.mark_shutdown_requested();
            let _ = self.client.send(protocol::encode_shutdown()).await;
            self.client.close().await;
            self.control.close().await;
            self.peer_clients.close().await;
            tokio::time::sleep(self.context.parameters.shutdown_flush_grace).await;
        }
        Ok(())
    }
}

/// Opens a UDP "connection" to the broker's task endpoint purely to read
/// back the local address the OS would route through, mirroring the
/// source's trick for discovering the worker's own outbound interface
/// without sending any datagram.
async fn resolve_outbound_host(primary_broker: &BrokerEntry) -> CommResult<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(primary_broker.task_address()).await?;
    let local_addr = socket.local_addr()?;
    Ok(local_addr.ip().to_string())
}

async fn decode_reply_frame<T: serde::de::DeserializeOwned>(client: &ClientSocket, timeout: std::time::Duration) -> CommResult<T> {
    let frames = client
        .recv(timeout)
        .await
        .ok_or_else(|| CommError::Shutdown("broker closed the connection during INIT".into()))?;
    let frame: &Bytes = frames
        .first()
        .ok_or_else(|| CommError::Shutdown("INIT reply was empty".into()))?;
    bcs::from_bytes(frame).map_err(CommError::from)
}
