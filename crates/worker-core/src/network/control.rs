// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::FramedRead;
use tracing::warn;

use crate::errors::CommResult;
use crate::network::framing::MultipartCodec;

/// The worker's subscribe-like socket: one connection per broker's info
/// endpoint, all feeding into a single inbound queue. Subscription filter is
/// conceptually empty — every control message every broker broadcasts is
/// received.
pub struct ControlSocket {
    inbound_tx: mpsc::UnboundedSender<Vec<Bytes>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<Vec<Bytes>>>,
    connections: std::sync::atomic::AtomicUsize,
}

impl ControlSocket {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            connections: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub async fn connect(&self, addr: &str) -> CommResult<()> {
        let stream = TcpStream::connect(addr).await?;
        let mut reader = FramedRead::new(stream, MultipartCodec::default());
        let tx = self.inbound_tx.clone();
        self.connections
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tokio::spawn(async move {
            while let Some(frame_result) = reader.next().await {
                match frame_result {
                    Ok(frames) => {
                        if tx.send(frames).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("broker control connection closed: {err}");
                        break;
                    }
                }
            }
        });
        Ok(())
    }

    /// Drains every message currently pending without blocking. Used at the
    /// top of each dispatch loop iteration.
    pub fn drain(&self) -> Vec<Vec<Bytes>> {
        let Ok(mut rx) = self.inbound_rx.try_lock() else {
            return Vec::new();
        };
        let mut messages = Vec::new();
        while let Ok(frames) = rx.try_recv() {
            messages.push(frames);
        }
        messages
    }

    pub async fn close(&self) {
        self.inbound_rx.lock().await.close();
    }
}

impl Default for ControlSocket {
    fn default() -> Self {
        Self::new()
    }
}
