//! In-memory ownership map from proof posts to the payers who submitted them.
//!
//! The registry is bookkeeping only: the payer id is also encoded in every
//! button payload, so losing the map on restart loses nothing essential.

use crate::model::{ProofMessageId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// A proof awaiting a moderator decision.
#[derive(Debug, Clone, Copy)]
pub struct PendingProof {
    pub payer_id: UserId,
    pub recorded_at: Instant,
}

#[derive(Debug, Default)]
pub struct ProofRegistry {
    entries: Mutex<HashMap<ProofMessageId, PendingProof>>,
}

impl ProofRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ProofMessageId, PendingProof>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record who submitted the proof posted as `message_id`. Overwrites silently.
    pub fn record(&self, message_id: ProofMessageId, payer_id: UserId) {
        let previous = self.entries().insert(
            message_id,
            PendingProof {
                payer_id,
                recorded_at: Instant::now(),
            },
        );
        if let Some(previous) = previous {
            log::debug!(
                "Proof message {} re-recorded (payer {} -> {})",
                message_id,
                previous.payer_id,
                payer_id
            );
        }
    }

    /// Remove the entry for `message_id`. Absent ids are ignored.
    pub fn purge(&self, message_id: ProofMessageId) {
        if let Some(entry) = self.entries().remove(&message_id) {
            log::debug!(
                "Purged proof message {} after {:?} pending",
                message_id,
                entry.recorded_at.elapsed()
            );
        }
    }

    pub fn lookup(&self, message_id: ProofMessageId) -> Option<UserId> {
        self.entries().get(&message_id).map(|entry| entry.payer_id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let registry = ProofRegistry::new();
        registry.record(ProofMessageId(10), 111);
        assert_eq!(registry.lookup(ProofMessageId(10)), Some(111));
        assert_eq!(registry.lookup(ProofMessageId(11)), None);
    }

    #[test]
    fn test_record_overwrites() {
        let registry = ProofRegistry::new();
        registry.record(ProofMessageId(10), 111);
        registry.record(ProofMessageId(10), 222);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(ProofMessageId(10)), Some(222));
    }

    #[test]
    fn test_purge_removes_and_tolerates_absent() {
        let registry = ProofRegistry::new();
        registry.record(ProofMessageId(1), 5);
        registry.purge(ProofMessageId(1));
        assert_eq!(registry.len(), 0);

        // second purge is a no-op
        registry.purge(ProofMessageId(1));
        registry.purge(ProofMessageId(99));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_concurrent_records() {
        let registry = std::sync::Arc::new(ProofRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        registry.record(ProofMessageId(i * 100 + j), (i * 100 + j) as u64);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 800);
        assert_eq!(registry.lookup(ProofMessageId(523)), Some(523));
    }
}
