//! Per-message mutual exclusion for decision flows.
//!
//! At most one flow per proof message may have outbound side effects in
//! flight. A message becomes permanently decided once its flow settles, so a
//! late double-press is rejected even after the registry entry is gone.

use crate::model::ProofMessageId;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ClaimState {
    in_flight: HashSet<ProofMessageId>,
    decided: HashSet<ProofMessageId>,
}

#[derive(Debug, Default)]
pub struct DecisionClaims {
    state: Mutex<ClaimState>,
}

/// Result of trying to claim a message id.
#[derive(Debug)]
pub enum ClaimAttempt<'a> {
    Claimed(Claim<'a>),
    Busy,
    AlreadyDecided,
}

/// Exclusive right to run a decision flow for one message.
///
/// Dropping the claim without calling [`Claim::settle`] releases it, leaving
/// the message open for another attempt.
#[derive(Debug)]
pub struct Claim<'a> {
    claims: &'a DecisionClaims,
    message_id: ProofMessageId,
    settled: bool,
}

impl DecisionClaims {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ClaimState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn try_claim(&self, message_id: ProofMessageId) -> ClaimAttempt<'_> {
        let mut state = self.state();
        if state.decided.contains(&message_id) {
            return ClaimAttempt::AlreadyDecided;
        }
        if !state.in_flight.insert(message_id) {
            return ClaimAttempt::Busy;
        }
        ClaimAttempt::Claimed(Claim {
            claims: self,
            message_id,
            settled: false,
        })
    }
}

impl Claim<'_> {
    /// Mark the message decided and release the claim.
    pub fn settle(mut self) {
        let mut state = self.claims.state();
        state.in_flight.remove(&self.message_id);
        state.decided.insert(self.message_id);
        self.settled = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.claims.state().in_flight.remove(&self.message_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_busy() {
        let claims = DecisionClaims::new();
        let first = claims.try_claim(ProofMessageId(1));
        assert!(matches!(first, ClaimAttempt::Claimed(_)));
        assert!(matches!(
            claims.try_claim(ProofMessageId(1)),
            ClaimAttempt::Busy
        ));
        // other messages are independent
        assert!(matches!(
            claims.try_claim(ProofMessageId(2)),
            ClaimAttempt::Claimed(_)
        ));
    }

    #[test]
    fn test_settle_marks_decided() {
        let claims = DecisionClaims::new();
        let ClaimAttempt::Claimed(claim) = claims.try_claim(ProofMessageId(3)) else {
            panic!("expected claim");
        };
        claim.settle();
        assert!(claims.state().in_flight.is_empty());
        assert!(matches!(
            claims.try_claim(ProofMessageId(3)),
            ClaimAttempt::AlreadyDecided
        ));
    }

    #[test]
    fn test_drop_releases_without_deciding() {
        let claims = DecisionClaims::new();
        {
            let attempt = claims.try_claim(ProofMessageId(4));
            assert!(matches!(attempt, ClaimAttempt::Claimed(_)));
        }
        assert!(claims.state().in_flight.is_empty());
        assert!(claims.state().decided.is_empty());
        assert!(matches!(
            claims.try_claim(ProofMessageId(4)),
            ClaimAttempt::Claimed(_)
        ));
    }
}
