// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// A broker reachable at `hostname`. `task_port` carries tasks, results and
/// variables (dealer-to-router semantics); `info_port` carries broadcast
/// control (subscribe semantics). Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokerEntry {
    pub hostname: String,
    pub task_port: u16,
    pub info_port: u16,
}

impl BrokerEntry {
    pub fn new(hostname: impl Into<String>, task_port: u16, info_port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            task_port,
            info_port,
        }
    }

    pub fn task_address(&self) -> String {
        format!("{}:{}", self.hostname, self.task_port)
    }

    pub fn info_address(&self) -> String {
        format!("{}:{}", self.hostname, self.info_port)
    }
}
