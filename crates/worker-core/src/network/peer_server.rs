// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use futures::StreamExt;
use rand::Rng;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};
use worker_types::Identity;

use crate::errors::CommError;
use crate::network::framing::MultipartCodec;

/// The worker's router-like inbound socket: every other worker that wants to
/// reply directly opens a connection here. The very first frame set on a
/// new connection must be a single-frame identity announcement; every frame
/// set after that is handed to the dispatch loop tagged with that identity,
/// standing in for a router socket's automatic identity-prefixing.
pub struct PeerServer {
    port: u16,
    inbound_rx: mpsc::UnboundedReceiver<(Identity, Vec<Bytes>)>,
}

impl PeerServer {
    /// Binds an ephemeral port in `port_range`, retrying colliding ports up
    /// to `retries` times. Fatal (`TransportBindFailure`) if none bind.
    pub async fn bind(port_range: (u16, u16), retries: u32) -> Result<Self, CommError> {
        let (low, high) = port_range;
        let mut attempts = 0;
        loop {
            let port = rand::thread_rng().gen_range(low..=high);
            match TcpListener::bind(("0.0.0.0", port)).await {
                Ok(listener) => {
                    let bound_port = listener.local_addr()?.port();
                    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
                    tokio::spawn(Self::accept_loop(listener, inbound_tx));
                    return Ok(Self {
                        port: bound_port,
                        inbound_rx,
                    });
                }
                Err(_) => {
                    attempts += 1;
                    if attempts >= retries {
                        return Err(CommError::TransportBindFailure(retries));
                    }
                }
            }
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Blocks up to `timeout` for the next `(sender identity, frames)` pair.
    pub async fn recv(&mut self, timeout: std::time::Duration) -> Option<(Identity, Vec<Bytes>)> {
        tokio::time::timeout(timeout, self.inbound_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Non-blocking: used by the dispatch loop's priority rule, which
    /// prefers peer replies over broker messages.
    pub fn try_recv(&mut self) -> Option<(Identity, Vec<Bytes>)> {
        self.inbound_rx.try_recv().ok()
    }

    async fn accept_loop(listener: TcpListener, inbound_tx: mpsc::UnboundedSender<(Identity, Vec<Bytes>)>) {
        loop {
            let Ok((stream, _addr)) = listener.accept().await else {
                return;
            };
            let tx = inbound_tx.clone();
            tokio::spawn(Self::handle_connection(stream, tx));
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        inbound_tx: mpsc::UnboundedSender<(Identity, Vec<Bytes>)>,
    ) {
        let mut reader = FramedRead::new(stream, MultipartCodec::default());
        let identity = match reader.next().await {
            Some(Ok(mut frames)) if frames.len() == 1 => {
                let bytes = frames.remove(0);
                match std::str::from_utf8(&bytes) {
                    Ok(s) => Identity::from(s),
                    Err(_) => {
                        warn!("peer connection sent a non-utf8 identity announcement");
                        return;
                    }
                }
            }
            _ => {
                warn!("peer connection closed before sending its identity announcement");
                return;
            }
        };
        debug!(%identity, "peer connected");
        while let Some(frame_result) = reader.next().await {
            match frame_result {
                Ok(frames) => {
                    if inbound_tx.send((identity.clone(), frames)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(%identity, "peer connection error: {err}");
                    break;
                }
            }
        }
    }
}
