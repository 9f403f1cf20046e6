// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// A callable as it travels on the wire.
///
/// Rather than shipping a serialized closure and rebinding it into the
/// receiver's module scope, this uses an explicit capability reference:
/// both ends register callables by a stable string id up front (see
/// `CapabilityRegistry`), and only the id travels.
///
/// `ByValue` is kept so the wire format has a place for an encapsulated
/// function body, but this implementation has no code-loading facility: a
/// `ByValue` capability never resolves (see `resolve_callable`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallableRef {
    ById(String),
    ByValue(Vec<u8>),
}

impl CallableRef {
    /// Stable identifier used to look a callable up in the shared-constants
    /// table. For `ById` this is the id itself; for `ByValue` it is a
    /// content hash of the encapsulated bytes.
    pub fn identity(&self) -> String {
        match self {
            CallableRef::ById(name) => name.clone(),
            CallableRef::ByValue(bytes) => format!("{:016x}", fnv1a(bytes)),
        }
    }
}

/// FNV-1a 64-bit, used only to derive a stable identity for opaque
/// encapsulated bytes. Not cryptographic; collisions only cause a spurious
/// shared-constant hit, never a correctness issue, since the worker that
/// receives a `ByValue` capability can't execute it regardless.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(PRIME)
    })
}

/// Outcome of trying to make a received capability runnable locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallableResolution {
    /// Resolves to a capability id the engine can look up and invoke.
    Ready(String),
    /// Could not be resolved locally; the owning future must be rejected.
    Unresolved,
}

/// A callable that is neither already callable nor a finished future gets
/// looked up by name. Here "already callable" is modeled as `ended` (a
/// finished future needs no callable at all) or the id being present in the
/// local capability registry.
pub fn resolve_callable(callable: &CallableRef, ended: bool, known: impl Fn(&str) -> bool) -> CallableResolution {
    match callable {
        CallableRef::ById(name) if ended || known(name) => CallableResolution::Ready(name.clone()),
        CallableRef::ById(_) => CallableResolution::Unresolved,
        CallableRef::ByValue(_) => CallableResolution::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_identity_is_the_name() {
        let c = CallableRef::ById("sum".into());
        assert_eq!(c.identity(), "sum");
    }

    #[test]
    fn value_identity_is_stable() {
        let a = CallableRef::ByValue(vec![1, 2, 3]);
        let b = CallableRef::ByValue(vec![1, 2, 3]);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn resolves_known_name() {
        let c = CallableRef::ById("sum".into());
        assert_eq!(
            resolve_callable(&c, false, |n| n == "sum"),
            CallableResolution::Ready("sum".into())
        );
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let c = CallableRef::ById("missing".into());
        assert_eq!(resolve_callable(&c, false, |_| false), CallableResolution::Unresolved);
    }

    #[test]
    fn finished_future_resolves_regardless() {
        let c = CallableRef::ById("whatever".into());
        assert_eq!(
            resolve_callable(&c, true, |_| false),
            CallableResolution::Ready("whatever".into())
        );
    }

    #[test]
    fn by_value_never_resolves() {
        let c = CallableRef::ByValue(vec![9, 9, 9]);
        assert_eq!(resolve_callable(&c, false, |_| true), CallableResolution::Unresolved);
    }
}
