// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use worker_types::Identity;

/// Errors a worker communicator can surface. Narrow, per-crate enum, in the
/// style `consensus-core`'s `ConsensusError` and `core_thread`'s `CoreError`
/// use rather than one giant error type shared across the whole pool.
#[derive(Error, Debug)]
pub enum CommError {
    /// A received task or reply references a capability that cannot be
    /// resolved locally. The offending future is not delivered.
    #[error("could not resolve capability {0:?}; ensure it was registered before the task arrived")]
    ReferenceBroken(String),

    /// Orderly or peer-initiated termination. Always propagates out of the
    /// dispatch loop.
    #[error("shutdown: {0}")]
    Shutdown(String),

    /// Outgoing payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// The peer-server could not bind any port in the configured number of
    /// attempts. Fatal at startup.
    #[error("could not bind peer-server port after {0} attempts")]
    TransportBindFailure(u32),

    /// A send to `peer` could not be completed and the peer has been
    /// evicted from the registry so the next send reconnects from scratch.
    #[error("peer {0} unreachable")]
    PeerUnreachable(Identity),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct SerializationError(pub String);

impl From<bcs::Error> for CommError {
    fn from(err: bcs::Error) -> Self {
        CommError::Serialization(SerializationError(err.to_string()))
    }
}

pub type CommResult<T> = Result<T, CommError>;
