//! Wire format of the decision buttons.
//!
//! A payload is a pipe-delimited list of `key:value` pairs, for example
//! `action:accept|payer:12345`. It is the only durable record of which payer a
//! proof post concerns, so the grammar must not change.

use crate::errors::PayloadError;
use crate::model::{DecisionAction, UserId, UserRef};
use std::fmt;
use std::str::FromStr;

const ACTION_KEY: &str = "action";
const PAYER_KEY: &str = "payer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTag {
    Accept,
    Decline,
}

impl ActionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::Accept => "accept",
            ActionTag::Decline => "decline",
        }
    }
}

/// Decoded contents of a button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPayload {
    pub action: ActionTag,
    pub payer_id: UserId,
}

impl DecisionPayload {
    pub fn accept(payer_id: UserId) -> Self {
        Self {
            action: ActionTag::Accept,
            payer_id,
        }
    }

    pub fn decline(payer_id: UserId) -> Self {
        Self {
            action: ActionTag::Decline,
            payer_id,
        }
    }

    /// Bind the payload to the moderator who pressed the button.
    pub fn into_action(self, acting_admin: UserRef) -> DecisionAction {
        match self.action {
            ActionTag::Accept => DecisionAction::Approve {
                payer_id: self.payer_id,
                acting_admin,
            },
            ActionTag::Decline => DecisionAction::Decline {
                payer_id: self.payer_id,
                acting_admin,
            },
        }
    }
}

impl fmt::Display for DecisionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ACTION_KEY}:{}|{PAYER_KEY}:{}",
            self.action.as_str(),
            self.payer_id
        )
    }
}

impl FromStr for DecisionPayload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut action = None;
        let mut payer = None;

        for segment in s.split('|') {
            let Some((key, value)) = segment.split_once(':') else {
                return Err(PayloadError::Malformed(segment.to_string()));
            };
            let slot = match key {
                ACTION_KEY => &mut action,
                PAYER_KEY => &mut payer,
                other => return Err(PayloadError::UnknownField(other.to_string())),
            };
            if slot.replace(value).is_some() {
                return Err(PayloadError::DuplicateField(key.to_string()));
            }
        }

        let action = match action.ok_or(PayloadError::MissingField(ACTION_KEY))? {
            "accept" => ActionTag::Accept,
            "decline" => ActionTag::Decline,
            other => return Err(PayloadError::BadAction(other.to_string())),
        };
        let payer = payer.ok_or(PayloadError::MissingField(PAYER_KEY))?;
        // u64 parsing alone would accept a leading '+'
        if !payer.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PayloadError::BadPayer(payer.to_string()));
        }
        let payer_id = payer
            .parse::<UserId>()
            .map_err(|_| PayloadError::BadPayer(payer.to_string()))?;

        Ok(Self { action, payer_id })
    }
}
