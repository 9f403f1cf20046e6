// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

mod configuration;
mod parameters;

pub use configuration::WorkerConfiguration;
pub use parameters::Parameters;
