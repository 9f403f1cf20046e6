// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed asynchronous message sockets: framed multipart messages over TCP,
//! agnostic to the higher-level protocol.

mod client;
mod control;
mod framing;
mod peer_client;
mod peer_server;

pub use client::ClientSocket;
pub use control::ControlSocket;
pub use peer_client::PeerClientPool;
pub use peer_server::PeerServer;
