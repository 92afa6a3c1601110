//! Proof submission and the moderator decision flows.

use crate::captions::{self, notices};
use crate::claims::{ClaimAttempt, DecisionClaims};
use crate::config::{Config, PaymentDetails};
use crate::errors::PlatformError;
use crate::model::{
    ButtonPress, Command, DecisionAction, DecisionOutcome, InboundEvent, ProofMessageId, UserId,
    UserRef,
};
use crate::payload::DecisionPayload;
use crate::platform::{Platform, bounded};
use crate::registry::ProofRegistry;
use chrono::{Duration as ChronoDuration, Utc};
use std::future::Future;
use std::time::Duration;

/// Every invite is good for exactly one join.
pub const INVITE_MEMBER_LIMIT: u32 = 1;

/// The parts of [`Config`] the relay acts on.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub authorizer: Option<UserId>,
    pub invite_expiry: ChronoDuration,
    pub outbound_timeout: Duration,
    pub payment: PaymentDetails,
}

impl From<&Config> for RelaySettings {
    fn from(cfg: &Config) -> Self {
        Self {
            authorizer: cfg.authorizer,
            invite_expiry: cfg.invite_expiry,
            outbound_timeout: cfg.outbound_timeout,
            payment: cfg.payment.clone(),
        }
    }
}

/// Handler for inbound platform events.
///
/// Safe to share between tasks; each event may be processed concurrently with
/// others. Decision flows for the same proof message are mutually exclusive.
pub struct ProofRelay<P> {
    platform: P,
    settings: RelaySettings,
    registry: ProofRegistry,
    claims: DecisionClaims,
}

impl<P: Platform> ProofRelay<P> {
    pub fn new(platform: P, settings: RelaySettings) -> Self {
        Self {
            platform,
            settings,
            registry: ProofRegistry::new(),
            claims: DecisionClaims::new(),
        }
    }

    pub fn registry(&self) -> &ProofRegistry {
        &self.registry
    }

    /// Process one inbound event. Failures are logged, never returned.
    pub async fn process_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::PhotoSubmitted { from, photo_ref } => {
                self.submit_proof(&from, &photo_ref).await;
            }
            InboundEvent::ButtonPressed(press) => {
                self.process_decision(&press).await;
            }
            InboundEvent::CommandIssued { from, command } => {
                let text = match command {
                    Command::Start => captions::WELCOME.to_string(),
                    Command::Pay => captions::payment_details(&self.settings.payment),
                };
                self.reply(from.id, &text).await;
            }
            InboundEvent::NonPhotoMessage { from } => {
                self.reply(from.id, captions::SEND_PHOTO).await;
            }
        }
    }

    /// Relay a payer's screenshot to the moderation surface and remember who sent it.
    pub async fn submit_proof(&self, from: &UserRef, photo_ref: &str) -> Option<ProofMessageId> {
        let caption = captions::proof_header(from, Utc::now());
        match self
            .call(self.platform.send_proof(photo_ref, &caption, from.id))
            .await
        {
            Ok(message_id) => {
                self.registry.record(message_id, from.id);
                log::info!(
                    "Relayed proof from user {} as moderation message {} ({} pending)",
                    from.id,
                    message_id,
                    self.registry.len()
                );
                self.reply(from.id, captions::PROOF_RECEIVED).await;
                Some(message_id)
            }
            Err(e) => {
                log::error!("Failed to relay proof from user {}: {}", from.id, e);
                self.reply(from.id, captions::PROOF_NOT_RELAYED).await;
                None
            }
        }
    }

    /// Run the decision flow for one button press and acknowledge it exactly once.
    pub async fn process_decision(&self, press: &ButtonPress) -> DecisionOutcome {
        let (outcome, notice) = self.decide(press).await;
        log::info!(
            "Decision on proof message {} by user {}: {:?}",
            press.message_id,
            press.actor.id,
            outcome
        );
        if let Err(e) = self
            .call(self.platform.answer_button(&press.query_id, notice))
            .await
        {
            log::warn!(
                "Failed to acknowledge button press on message {}: {}",
                press.message_id,
                e
            );
        }
        outcome
    }

    async fn decide(&self, press: &ButtonPress) -> (DecisionOutcome, Option<&'static str>) {
        let payload = match press.payload.parse::<DecisionPayload>() {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!(
                    "Ignoring malformed payload '{}' on message {}: {}",
                    press.payload,
                    press.message_id,
                    e
                );
                return (DecisionOutcome::Malformed, Some(notices::INVALID_BUTTON));
            }
        };

        if let Some(authorizer) = self.settings.authorizer {
            if press.actor.id != authorizer {
                log::warn!(
                    "User {} ({}) is not authorized to decide proof message {}",
                    press.actor.id,
                    press.actor.display_name,
                    press.message_id
                );
                return (DecisionOutcome::Unauthorized, Some(notices::NOT_AUTHORIZED));
            }
        }

        let claim = match self.claims.try_claim(press.message_id) {
            ClaimAttempt::Claimed(claim) => claim,
            ClaimAttempt::Busy | ClaimAttempt::AlreadyDecided => {
                return (DecisionOutcome::AlreadyDecided, Some(notices::ALREADY_DECIDED));
            }
        };

        // The payload decides who the proof belongs to; the registry only cross-checks it.
        match self.registry.lookup(press.message_id) {
            Some(recorded) if recorded != payload.payer_id => log::warn!(
                "Proof message {} was recorded for payer {} but the button names payer {}; using the button",
                press.message_id,
                recorded,
                payload.payer_id
            ),
            Some(_) => {}
            None => log::debug!(
                "No registry entry for proof message {}, relying on the button payload",
                press.message_id
            ),
        }

        let action = payload.into_action(press.actor.clone());
        let (outcome, notice) = match &action {
            DecisionAction::Approve { .. } => {
                self.approve(press, action.payer_id(), action.acting_admin())
                    .await
            }
            DecisionAction::Decline { .. } => {
                self.decline(press, action.payer_id(), action.acting_admin())
                    .await
            }
        };

        // A failed invite leaves the proof pending so a moderator can press again.
        if outcome != DecisionOutcome::ApprovalFailed {
            self.registry.purge(press.message_id);
            claim.settle();
        }
        (outcome, notice)
    }

    async fn approve(
        &self,
        press: &ButtonPress,
        payer_id: UserId,
        admin: &UserRef,
    ) -> (DecisionOutcome, Option<&'static str>) {
        let expires_at = Utc::now() + self.settings.invite_expiry;
        let invite_url = match self
            .call(
                self.platform
                    .create_invite_link(INVITE_MEMBER_LIMIT, expires_at),
            )
            .await
        {
            Ok(url) => url,
            Err(e) => {
                log::error!(
                    "Failed to create invite link for payer {} (proof message {}): {}",
                    payer_id,
                    press.message_id,
                    e
                );
                self.edit_caption(press.message_id, &captions::approval_failed(&press.caption))
                    .await;
                return (DecisionOutcome::ApprovalFailed, Some(notices::INVITE_FAILED));
            }
        };

        let dm = captions::approved_dm(&invite_url, expires_at);
        let payer_notified = match self.call(self.platform.send_message(payer_id, &dm)).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to send invite link to payer {}: {}", payer_id, e);
                false
            }
        };

        self.edit_caption(press.message_id, &captions::approved(&press.caption, admin))
            .await;

        let notice = (!payer_notified).then_some(notices::PAYER_UNREACHABLE);
        (DecisionOutcome::Approved { payer_notified }, notice)
    }

    async fn decline(
        &self,
        press: &ButtonPress,
        payer_id: UserId,
        admin: &UserRef,
    ) -> (DecisionOutcome, Option<&'static str>) {
        self.edit_caption(press.message_id, &captions::declined(&press.caption, admin))
            .await;

        let payer_notified = match self
            .call(self.platform.send_message(payer_id, captions::DECLINED_DM))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Could not tell payer {} about the decline: {}", payer_id, e);
                false
            }
        };
        (DecisionOutcome::Declined { payer_notified }, None)
    }

    async fn edit_caption(&self, message_id: ProofMessageId, caption: &str) {
        if let Err(e) = self
            .call(self.platform.edit_caption(message_id, caption))
            .await
        {
            log::error!("Failed to update caption of message {}: {}", message_id, e);
        }
    }

    async fn reply(&self, user_id: UserId, text: &str) {
        if let Err(e) = self.call(self.platform.send_message(user_id, text)).await {
            log::warn!("Failed to reply to user {}: {}", user_id, e);
        }
    }

    async fn call<T, F>(&self, call: F) -> Result<T, PlatformError>
    where
        F: Future<Output = Result<T, PlatformError>>,
    {
        bounded(self.settings.outbound_timeout, call).await
    }
}
