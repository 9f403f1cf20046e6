// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::{Deserialize, Serialize};
use worker_types::BrokerEntry;

/// Operational configuration of a worker's communicator.
///
/// All fields should tolerate being different across workers without
/// affecting correctness of the pool; that's what lets most operators run
/// with the defaults.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Parameters {
    /// The broker this worker hands its INIT to on startup.
    pub primary_broker: BrokerEntry,

    /// Port range the peer-server binds an ephemeral port from.
    #[serde(default = "Parameters::default_peer_port_range")]
    pub peer_port_range: (u16, u16),

    /// How many times to retry a colliding bind before giving up.
    #[serde(default = "Parameters::default_bind_retries")]
    pub bind_retries: u32,

    /// Target number of brokers to maintain; `None` means unbounded (grow
    /// to whatever BROKER_INFO advertises).
    #[serde(default)]
    pub target_broker_count: Option<usize>,

    /// Grace period after connecting to a peer before the first send, so
    /// the connection has time to stabilize.
    #[serde(default = "Parameters::default_peer_connect_grace")]
    pub peer_connect_grace: Duration,

    /// How long `shutdown()` waits for outbound sockets to flush.
    #[serde(default = "Parameters::default_shutdown_flush_grace")]
    pub shutdown_flush_grace: Duration,

    /// Default timeout passed to the dispatch loop's poll when the caller
    /// doesn't specify one.
    #[serde(default = "Parameters::default_poll_timeout")]
    pub poll_timeout: Duration,
}

impl Parameters {
    pub fn default_peer_port_range() -> (u16, u16) {
        (49152, 65535)
    }

    pub fn default_bind_retries() -> u32 {
        100
    }

    pub fn default_peer_connect_grace() -> Duration {
        Duration::from_millis(50)
    }

    pub fn default_shutdown_flush_grace() -> Duration {
        Duration::from_millis(300)
    }

    pub fn default_poll_timeout() -> Duration {
        Duration::from_millis(100)
    }

    pub fn new(primary_broker: BrokerEntry) -> Self {
        Self {
            primary_broker,
            peer_port_range: Self::default_peer_port_range(),
            bind_retries: Self::default_bind_retries(),
            target_broker_count: None,
            peer_connect_grace: Self::default_peer_connect_grace(),
            shutdown_flush_grace: Self::default_shutdown_flush_grace(),
            poll_timeout: Self::default_poll_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_in_sane_defaults() {
        let params = Parameters::new(BrokerEntry::new("broker", 6000, 6001));
        assert_eq!(params.peer_port_range, (49152, 65535));
        assert_eq!(params.bind_retries, 100);
        assert_eq!(params.target_broker_count, None);
    }
}
