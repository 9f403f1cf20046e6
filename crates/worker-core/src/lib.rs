// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The worker-side communicator for a distributed task-execution pool:
//! registers with one or more brokers, receives tasks, ships results and
//! shared variables, and routes broker-driven group reductions.

mod broker_registry;
mod capability;
mod communicator;
mod context;
mod dispatch;
mod errors;
mod lifecycle;
mod metrics;
mod network;
mod peer_registry;
mod protocol;
mod reduction;
mod send;
mod shared_variables;

pub use broker_registry::BrokerRegistry;
pub use capability::CapabilityRegistry;
pub use communicator::Communicator;
pub use context::Context;
pub use errors::{CommError, CommResult, SerializationError};
pub use metrics::Metrics;
pub use peer_registry::PeerRegistry;
pub use reduction::{ReductionSink, SharedConstants};
pub use shared_variables::SharedVariables;
