//! Platform-neutral types flowing between the Telegram adapter and the relay.

use std::fmt;

/// Identity of a Telegram user.
pub type UserId = u64;

/// Id of the proof post in the moderation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProofMessageId(pub i32);

impl fmt::Display for ProofMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as seen in an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub display_name: String,
}

impl UserRef {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// The moderator's intent, recovered from a button payload and the presser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionAction {
    Approve { payer_id: UserId, acting_admin: UserRef },
    Decline { payer_id: UserId, acting_admin: UserRef },
}

impl DecisionAction {
    pub fn payer_id(&self) -> UserId {
        match self {
            DecisionAction::Approve { payer_id, .. } | DecisionAction::Decline { payer_id, .. } => {
                *payer_id
            }
        }
    }

    pub fn acting_admin(&self) -> &UserRef {
        match self {
            DecisionAction::Approve { acting_admin, .. }
            | DecisionAction::Decline { acting_admin, .. } => acting_admin,
        }
    }
}

/// Commands a payer can send in a private chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pay,
}

/// A press of a decision button on a proof post.
#[derive(Debug, Clone)]
pub struct ButtonPress {
    /// Platform id used to acknowledge the press.
    pub query_id: String,
    pub payload: String,
    pub message_id: ProofMessageId,
    pub actor: UserRef,
    /// Caption of the proof post at the moment of the press.
    pub caption: String,
}

/// Everything the relay reacts to.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    PhotoSubmitted {
        from: UserRef,
        photo_ref: String,
    },
    ButtonPressed(ButtonPress),
    CommandIssued {
        from: UserRef,
        command: Command,
    },
    NonPhotoMessage {
        from: UserRef,
    },
}

/// Terminal state of one button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Malformed,
    Unauthorized,
    AlreadyDecided,
    ApprovalFailed,
    Approved { payer_notified: bool },
    Declined { payer_notified: bool },
}
