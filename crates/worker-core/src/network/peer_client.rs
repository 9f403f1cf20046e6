// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use bytes::Bytes;
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;
use worker_types::Identity;

use crate::errors::{CommError, CommResult};
use crate::network::framing::MultipartCodec;

/// One outbound connection per remote worker this worker has opened a
/// direct-reply path to. Routed by remote identity, mirroring a dealer
/// socket that keeps a distinct connection per peer.
pub struct PeerClientPool {
    self_identity: Identity,
    connections: Mutex<HashMap<Identity, FramedWrite<tokio::net::tcp::OwnedWriteHalf, MultipartCodec>>>,
}

impl PeerClientPool {
    pub fn new(self_identity: Identity) -> Self {
        Self {
            self_identity,
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_connected(&self, identity: &Identity) -> bool {
        self.connections.lock().await.contains_key(identity)
    }

    /// Connects to `identity`'s peer-server and announces our own identity,
    /// the handshake `PeerServer::handle_connection` waits for.
    pub async fn connect(&self, identity: &Identity) -> CommResult<()> {
        let stream = TcpStream::connect(identity.as_str()).await?;
        let (_read_half, write_half) = stream.into_split();
        let mut writer = FramedWrite::new(write_half, MultipartCodec::default());
        writer
            .send(vec![Bytes::copy_from_slice(self.self_identity.as_str().as_bytes())])
            .await?;
        self.connections.lock().await.insert(identity.clone(), writer);
        Ok(())
    }

    pub async fn send(&self, identity: &Identity, frames: Vec<Bytes>) -> CommResult<()> {
        let mut connections = self.connections.lock().await;
        let writer = connections
            .get_mut(identity)
            .ok_or_else(|| CommError::PeerUnreachable(identity.clone()))?;
        if let Err(err) = writer.send(frames).await {
            connections.remove(identity);
            return Err(CommError::Io(err));
        }
        Ok(())
    }

    /// Drops a stale connection so the next send reconnects from scratch.
    pub async fn evict(&self, identity: &Identity) {
        self.connections.lock().await.remove(identity);
    }

    pub async fn close(&self) {
        self.connections.lock().await.clear();
    }
}
