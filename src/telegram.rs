//! Telegram adapter: outbound calls through `teloxide` and the update schema
//! that turns raw updates into [`InboundEvent`]s.

use crate::errors::PlatformError;
use crate::model::{ButtonPress, Command, InboundEvent, ProofMessageId, UserId, UserRef};
use crate::payload::DecisionPayload;
use crate::platform::Platform;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MaybeInaccessibleMessage, MessageId,
    User,
};
use teloxide::utils::command::BotCommands;
use tokio::sync::mpsc::UnboundedSender;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
enum PayerCommand {
    Start,
    Pay,
}

impl From<PayerCommand> for Command {
    fn from(cmd: PayerCommand) -> Self {
        match cmd {
            PayerCommand::Start => Command::Start,
            PayerCommand::Pay => Command::Pay,
        }
    }
}

/// [`Platform`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
    moderation_chat: ChatId,
    restricted_channel: ChatId,
}

impl TelegramPlatform {
    pub fn new(bot: Bot, moderation_chat_id: i64, restricted_channel_id: i64) -> Self {
        Self {
            bot,
            moderation_chat: ChatId(moderation_chat_id),
            restricted_channel: ChatId(restricted_channel_id),
        }
    }
}

fn decision_keyboard(payer_id: UserId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Accept", DecisionPayload::accept(payer_id).to_string()),
        InlineKeyboardButton::callback("❌ Decline", DecisionPayload::decline(payer_id).to_string()),
    ]])
}

fn private_chat(user_id: UserId) -> ChatId {
    ChatId(user_id as i64)
}

#[async_trait]
impl Platform for TelegramPlatform {
    async fn send_proof(
        &self,
        photo_ref: &str,
        caption: &str,
        payer_id: UserId,
    ) -> Result<ProofMessageId, PlatformError> {
        let sent = self
            .bot
            .send_photo(self.moderation_chat, InputFile::file_id(photo_ref))
            .caption(caption)
            .reply_markup(decision_keyboard(payer_id))
            .await?;
        Ok(ProofMessageId(sent.id.0))
    }

    async fn send_message(&self, user_id: UserId, text: &str) -> Result<(), PlatformError> {
        self.bot.send_message(private_chat(user_id), text).await?;
        Ok(())
    }

    async fn edit_caption(
        &self,
        message_id: ProofMessageId,
        caption: &str,
    ) -> Result<(), PlatformError> {
        self.bot
            .edit_message_caption(self.moderation_chat, MessageId(message_id.0))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn create_invite_link(
        &self,
        member_limit: u32,
        expires_at: DateTime<Utc>,
    ) -> Result<String, PlatformError> {
        let link = self
            .bot
            .create_chat_invite_link(self.restricted_channel)
            .member_limit(member_limit)
            .expire_date(expires_at)
            .await?;
        Ok(link.invite_link)
    }

    async fn answer_button(
        &self,
        query_id: &str,
        text: Option<&str>,
    ) -> Result<(), PlatformError> {
        let mut request = self.bot.answer_callback_query(query_id);
        if let Some(text) = text {
            request = request.text(text).show_alert(true);
        }
        request.await?;
        Ok(())
    }
}

fn user_ref(user: &User) -> UserRef {
    UserRef::new(user.id.0, user.full_name())
}

/// Translate a private message into an event. Group chatter is ignored.
fn message_event(msg: &Message, bot_username: &str) -> Option<InboundEvent> {
    if !msg.chat.is_private() {
        return None;
    }
    let from = user_ref(msg.from.as_ref()?);

    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(InboundEvent::PhotoSubmitted {
            from,
            photo_ref: photo.file.id.clone(),
        });
    }
    if let Some(command) = msg
        .text()
        .and_then(|text| PayerCommand::parse(text, bot_username).ok())
    {
        return Some(InboundEvent::CommandIssued {
            from,
            command: command.into(),
        });
    }
    Some(InboundEvent::NonPhotoMessage { from })
}

/// Translate a button press into an event. Presses on messages the bot can no
/// longer see carry no caption and are dropped.
fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let payload = query.data.clone()?;
    let Some(MaybeInaccessibleMessage::Regular(message)) = &query.message else {
        log::warn!("Button press {} on an inaccessible message, ignoring", query.id);
        return None;
    };
    Some(InboundEvent::ButtonPressed(ButtonPress {
        query_id: query.id.clone(),
        payload,
        message_id: ProofMessageId(message.id.0),
        actor: user_ref(&query.from),
        caption: message.caption().unwrap_or_default().to_string(),
    }))
}

/// Bot identity handed to the update handlers.
#[derive(Clone)]
pub struct BotName(pub String);

/// Update schema forwarding every relevant update into `events`.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(
            |msg: Message, name: BotName, events: UnboundedSender<InboundEvent>| async move {
                if let Some(event) = message_event(&msg, &name.0) {
                    forward(&events, event);
                }
                Ok(())
            },
        ))
        .branch(Update::filter_callback_query().endpoint(
            |query: CallbackQuery, events: UnboundedSender<InboundEvent>| async move {
                if let Some(event) = callback_event(&query) {
                    forward(&events, event);
                }
                Ok(())
            },
        ))
}

fn forward(events: &UnboundedSender<InboundEvent>, event: InboundEvent) {
    if events.send(event).is_err() {
        log::warn!("Event loop has stopped, dropping update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_carries_encoded_payloads() {
        let keyboard = decision_keyboard(12345);
        let rows = &keyboard.inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);

        let payloads: Vec<String> = rows[0]
            .iter()
            .filter_map(|button| match &button.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(data.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            payloads,
            vec!["action:accept|payer:12345", "action:decline|payer:12345"]
        );
    }

    #[test]
    fn test_commands_parse() {
        assert_eq!(PayerCommand::parse("/start", "proofgate_bot").ok(), Some(PayerCommand::Start));
        assert_eq!(
            PayerCommand::parse("/pay@proofgate_bot", "proofgate_bot").ok(),
            Some(PayerCommand::Pay)
        );
        assert!(PayerCommand::parse("hello", "proofgate_bot").is_err());
        assert_eq!(Command::from(PayerCommand::Pay), Command::Pay);
    }

    #[test]
    fn test_private_chat_id() {
        assert_eq!(private_chat(42), ChatId(42));
    }
}
