// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Data model shared by the worker communicator and the engine that embeds
//! it: worker/broker identities, the wire-level callable representation,
//! the task envelope the core round-trips, and the control-protocol frame
//! shapes.

mod broker;
mod callable;
mod identity;
mod task;
mod wire;

pub use broker::BrokerEntry;
pub use callable::{resolve_callable, CallableRef, CallableResolution};
pub use identity::Identity;
pub use task::{GroupId, TaskEnvelope, TaskId};
pub use wire::{tag, ControlMessage, ReductionPartial, VariableValue};
