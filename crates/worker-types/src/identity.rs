// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

/// Routing address of a worker, of the form `host:port`. `port` is the bind
/// port of the worker's inbound peer socket. Chosen once at startup and
/// stable for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self(format!("{}:{}", host.into(), port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The port component, i.e. the peer-server port this identity routes to.
    pub fn port(&self) -> Option<u16> {
        self.0.rsplit_once(':').and_then(|(_, p)| p.parse().ok())
    }

    pub fn host(&self) -> Option<&str> {
        self.0.rsplit_once(':').map(|(h, _)| h)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_host_colon_port() {
        let id = Identity::new("10.0.0.4", 51000);
        assert_eq!(id.as_str(), "10.0.0.4:51000");
        assert_eq!(id.port(), Some(51000));
        assert_eq!(id.host(), Some("10.0.0.4"));
    }

    #[test]
    fn roundtrips_through_bcs() {
        let id = Identity::new("host", 1234);
        let bytes = bcs::to_bytes(&id).unwrap();
        let back: Identity = bcs::from_bytes(&bytes).unwrap();
        assert_eq!(id, back);
    }
}
