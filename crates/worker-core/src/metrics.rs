// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};

/// Plain counters an embedder can read out into whatever metrics backend it
/// already runs (Prometheus, StatsD, ...). This crate never registers them
/// anywhere itself — wiring a registry is an outer-surface concern that
/// belongs to the process embedding the communicator, the same split
/// `consensus-core`'s `Metrics` struct draws from `authority_node`.
#[derive(Default)]
pub struct Metrics {
    pub tasks_sent: AtomicU64,
    pub results_sent: AtomicU64,
    pub variables_sent: AtomicU64,
    pub tasks_received: AtomicU64,
    pub reductions_routed: AtomicU64,
    pub peers_connected: AtomicU64,
    pub brokers_connected: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

macro_rules! counter_inc {
    ($metrics:expr, $field:ident) => {
        $metrics.$field.fetch_add(1, Ordering::Relaxed)
    };
}
pub(crate) use counter_inc;
