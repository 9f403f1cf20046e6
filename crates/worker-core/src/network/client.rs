// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::warn;

use crate::errors::{CommError, CommResult};
use crate::network::framing::MultipartCodec;

/// The worker's dealer-like socket to the broker pool: sends to any
/// connected broker, receives framed replies from all of them. One TCP
/// connection per broker; round-robins outgoing sends across connections,
/// matching a dealer socket fanning requests across its peers.
pub struct ClientSocket {
    writers: Mutex<Vec<FramedWrite<tokio::net::tcp::OwnedWriteHalf, MultipartCodec>>>,
    next: AtomicUsize,
    inbound_tx: mpsc::UnboundedSender<Vec<Bytes>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<Vec<Bytes>>>,
}

impl ClientSocket {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            writers: Mutex::new(Vec::new()),
            next: AtomicUsize::new(0),
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
        }
    }

    /// Connects to a broker's task endpoint and starts forwarding its
    /// replies into this socket's inbound queue.
    pub async fn connect(&self, addr: &str) -> CommResult<()> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        let reader = FramedRead::new(read_half, MultipartCodec::default());
        let writer = FramedWrite::new(write_half, MultipartCodec::default());
        self.writers.lock().await.push(writer);

        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            let mut reader = reader;
            while let Some(frame_result) = reader.next().await {
                match frame_result {
                    Ok(frames) => {
                        if tx.send(frames).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("broker connection closed: {err}");
                        break;
                    }
                }
            }
        });
        Ok(())
    }

    /// Sends to one connected broker, round-robin.
    pub async fn send(&self, frames: Vec<Bytes>) -> CommResult<()> {
        let mut writers = self.writers.lock().await;
        if writers.is_empty() {
            return Err(CommError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no broker connections",
            )));
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % writers.len();
        writers[idx].send(frames).await?;
        Ok(())
    }

    /// Sends the same frames to every connected broker, used by `request()`.
    pub async fn send_to_all(&self, frames: Vec<Bytes>) -> CommResult<()> {
        let mut writers = self.writers.lock().await;
        for writer in writers.iter_mut() {
            writer.send(frames.clone()).await?;
        }
        Ok(())
    }

    pub async fn connection_count(&self) -> usize {
        self.writers.lock().await.len()
    }

    /// Non-blocking receive; `None` if nothing is pending right now.
    pub fn try_recv(&self) -> Option<Vec<Bytes>> {
        self.inbound_rx.try_lock().ok()?.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next inbound message.
    pub async fn recv(&self, timeout: std::time::Duration) -> Option<Vec<Bytes>> {
        let mut rx = self.inbound_rx.lock().await;
        tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
    }

    /// Drops all broker connections; in-flight sends are abandoned.
    pub async fn close(&self) {
        self.writers.lock().await.clear();
    }
}

impl Default for ClientSocket {
    fn default() -> Self {
        Self::new()
    }
}
