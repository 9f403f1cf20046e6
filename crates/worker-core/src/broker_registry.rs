// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use tracing::warn;
use worker_types::BrokerEntry;

/// Tracks brokers this worker has a connection to, and grows that set as
/// `BROKER_INFO` announcements arrive, up to a target size.
///
/// Mutated only by the dispatch loop and read by the send surface (e.g. to
/// fan `REQUEST` out to every connected broker), so a single lock per table
/// is enough; contention is low.
pub struct BrokerRegistry {
    brokers: RwLock<Vec<BrokerEntry>>,
    /// `None` means unbounded: keep growing as BROKER_INFO arrives.
    target: RwLock<Option<usize>>,
    shortfalls: AtomicUsize,
}

impl BrokerRegistry {
    pub fn new(target: Option<usize>) -> Self {
        Self {
            brokers: RwLock::new(Vec::new()),
            target: RwLock::new(target),
            shortfalls: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.brokers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, entry: &BrokerEntry) -> bool {
        self.brokers.read().contains(entry)
    }

    pub fn snapshot(&self) -> Vec<BrokerEntry> {
        self.brokers.read().clone()
    }

    /// Idempotent: returns `true` if `entry` was newly inserted.
    pub fn add(&self, entry: BrokerEntry) -> bool {
        let mut brokers = self.brokers.write();
        if brokers.contains(&entry) {
            return false;
        }
        brokers.push(entry);
        true
    }

    fn target_reached(&self) -> bool {
        match *self.target.read() {
            Some(target) => self.len() >= target,
            None => false,
        }
    }

    /// Applies a `BROKER_INFO` announcement: bootstraps the registry with
    /// `primary` if empty, then, while below target, samples `needed`
    /// entries from `others` without replacement and adds each.
    ///
    /// The source builds a malformed address here (`"tcp://" + hostname +
    /// port`, missing the separating colon) and calls the single-broker add
    /// function with mismatched argument shapes — almost certainly dead
    /// code. This reimplementation keeps the intent (grow the broker set by
    /// the advertised entries) and passes fully structured `BrokerEntry`
    /// values instead.
    pub fn apply_broker_info(&self, primary: BrokerEntry, others: Vec<BrokerEntry>) {
        if self.is_empty() {
            self.add(primary);
        }
        if self.target_reached() {
            return;
        }
        let needed = match *self.target.read() {
            Some(target) => target.saturating_sub(self.len()),
            None => others.len(),
        };
        if needed == 0 {
            return;
        }
        let sample: Vec<BrokerEntry> = if needed >= others.len() {
            if self.target.read().is_some() && needed > others.len() {
                let shortfall = needed - others.len();
                self.shortfalls.fetch_add(shortfall, Ordering::Relaxed);
                let mut target = self.target.write();
                *target = Some(self.len() + others.len());
                warn!(
                    shortfall,
                    "BROKER_INFO announced fewer brokers than needed; lowering target to {:?}", *target
                );
            }
            others
        } else {
            let mut rng = rand::thread_rng();
            others.choose_multiple(&mut rng, needed).cloned().collect()
        };
        for broker in sample {
            self.add(broker);
        }
    }

    /// Total shortfall ever recorded by `apply_broker_info`, for tests and
    /// diagnostics.
    pub fn recorded_shortfall(&self) -> usize {
        self.shortfalls.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(port: u16) -> BrokerEntry {
        BrokerEntry::new("broker", port, port + 1)
    }

    #[test]
    fn add_is_idempotent() {
        let registry = BrokerRegistry::new(None);
        assert!(registry.add(entry(6000)));
        assert!(!registry.add(entry(6000)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn bootstraps_from_empty_on_broker_info() {
        let registry = BrokerRegistry::new(Some(2));
        registry.apply_broker_info(entry(6000), vec![entry(6002), entry(6004)]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&entry(6000)));
    }

    #[test]
    fn shortfall_lowers_target_and_warns() {
        let registry = BrokerRegistry::new(Some(5));
        registry.apply_broker_info(entry(6000), vec![entry(6002)]);
        // 1 primary + 1 other == 2, short of the target of 5 by 3.
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.recorded_shortfall(), 3);
    }

    #[test]
    fn stops_growing_once_target_reached() {
        let registry = BrokerRegistry::new(Some(1));
        registry.apply_broker_info(entry(6000), vec![entry(6002), entry(6004)]);
        assert_eq!(registry.len(), 1);
    }
}
