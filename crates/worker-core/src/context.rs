// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use worker_config::Parameters;
use worker_types::Identity;

use crate::capability::CapabilityRegistry;
use crate::metrics::Metrics;

/// Per-process state shared by every component of the communicator.
///
/// The source keeps the moral equivalent of this as a handful of module
/// globals (`scoop.worker`, `scoop.CONFIGURATION`, `scoop.SHUTDOWN_REQUESTED`,
/// `scoop.IS_ORIGIN`, `shared.elements`, the logger). `Context` collects them
/// into one struct, constructed once at startup and passed explicitly
/// everywhere; there are no hidden mutable globals in this crate.
pub struct Context {
    /// This worker's own routing identity, fixed once the peer-server binds.
    pub identity: Identity,
    /// Operational parameters (ports, timeouts, target broker count).
    pub parameters: Parameters,
    /// Whether this worker is the one that originated the pool; governs how
    /// an unsolicited SHUTDOWN is treated.
    pub is_origin: bool,
    /// Set once this worker has requested its own shutdown, so a SHUTDOWN
    /// echoed back isn't logged as an unexpected peer death.
    pub shutdown_requested: AtomicBool,
    /// Callables both ends agreed on a stable name for; replaces dynamic
    /// function shipping.
    pub capabilities: CapabilityRegistry,
    /// Counters an embedder can wire to its own metrics backend.
    pub metrics: Arc<Metrics>,
}

impl Context {
    pub fn new(identity: Identity, parameters: Parameters, is_origin: bool, metrics: Arc<Metrics>) -> Self {
        Self {
            identity,
            parameters,
            is_origin,
            shutdown_requested: AtomicBool::new(false),
            capabilities: CapabilityRegistry::new(),
            metrics,
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn mark_shutdown_requested(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn new_for_test() -> Self {
        use worker_types::BrokerEntry;
        Context::new(
            Identity::new("127.0.0.1", 50000),
            Parameters::new(BrokerEntry::new("127.0.0.1", 6000, 6001)),
            true,
            Arc::new(Metrics::default()),
        )
    }
}
