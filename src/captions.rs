//! Text shown to payers and moderators.
//!
//! Captions on proof posts are append-only: every annotation is added after the
//! text already on the message, so the submission header stays visible.

use crate::config::PaymentDetails;
use crate::model::UserRef;
use chrono::{DateTime, Utc};

pub const WELCOME: &str = "Welcome! Type /pay to get UPI payment details.";
pub const SEND_PHOTO: &str = "Please send a photo (screenshot) of your payment.";
pub const PROOF_RECEIVED: &str = "✅ Payment proof received. Awaiting manual verification.";
pub const PROOF_NOT_RELAYED: &str =
    "⚠️ We could not forward your proof right now. Please send the screenshot again in a few minutes.";
pub const DECLINED_DM: &str =
    "❌ Your payment proof was declined. Please contact support or re-upload a valid proof.";

/// Notices shown only to whoever pressed a decision button.
pub mod notices {
    pub const NOT_AUTHORIZED: &str = "You are not authorized to approve payments.";
    pub const INVITE_FAILED: &str = "Failed to create invite link. Check bot permissions.";
    pub const PAYER_UNREACHABLE: &str =
        "Approval done but failed to message the payer. They may not have started the bot.";
    pub const ALREADY_DECIDED: &str = "This proof has already been decided.";
    pub const INVALID_BUTTON: &str = "This button is not valid.";
}

/// Header of a freshly relayed proof.
pub fn proof_header(payer: &UserRef, submitted_at: DateTime<Utc>) -> String {
    format!(
        "🧾 Payment proof received\n\n👤 Name: {}\n🆔 User ID: {}\n🕒 {} (UTC)",
        payer.display_name,
        payer.id,
        submitted_at.format("%Y-%m-%d %H:%M:%S")
    )
}

fn annotate(caption: &str, line: &str) -> String {
    if caption.is_empty() {
        line.to_string()
    } else {
        format!("{caption}\n\n{line}")
    }
}

pub fn approved(caption: &str, admin: &UserRef) -> String {
    annotate(caption, &format!("✅ Approved by: {}", admin.display_name))
}

pub fn declined(caption: &str, admin: &UserRef) -> String {
    annotate(caption, &format!("❌ Declined by: {}", admin.display_name))
}

pub fn approval_failed(caption: &str) -> String {
    annotate(caption, "⚠️ Approval failed: could not create invite link.")
}

pub fn approved_dm(invite_url: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "✅ Your payment has been approved.\n\n\
         Join the channel using this one-time link:\n{invite_url}\n\n\
         Note: this link works for a single person and expires at {} UTC.",
        expires_at.format("%Y-%m-%d %H:%M")
    )
}

pub fn payment_details(details: &PaymentDetails) -> String {
    match &details.upi_id {
        Some(upi_id) => format!(
            "💰 Payment Details:\n\n\
             UPI ID: {upi_id}\n\
             Amount: ₹{}\n\n\
             Pay on the above UPI id and share a full screenshot of the transaction.",
            details.amount
        ),
        None => "Payment details are not available right now. Please try again later.".to_string(),
    }
}
