// Notification sender for the contact form and newsletter signups.
//
// Deliberately a stub: it logs the intent and reports success instead of
// speaking SMTP. The interface is the contract; wiring a real transport
// behind it is a deployment concern.

use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub email: String,
}

#[derive(Clone)]
pub struct Mailer {
    recipient: String,
}

impl Mailer {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }

    pub async fn send_contact(&self, msg: &ContactMessage) -> Result<()> {
        if msg.name.trim().is_empty()
            || msg.email.trim().is_empty()
            || msg.subject.trim().is_empty()
            || msg.message.trim().is_empty()
        {
            return Err(AppError::validation("all contact fields are required"));
        }
        tracing::info!(
            to = %self.recipient,
            from = %msg.email,
            subject = %msg.subject,
            "contact notification (delivery stubbed)"
        );
        Ok(())
    }

    pub async fn send_subscription(&self, sub: &Subscription) -> Result<()> {
        let email = sub.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("a valid email address is required"));
        }
        tracing::info!(
            to = %self.recipient,
            subscriber = %email,
            "newsletter subscription notification (delivery stubbed)"
        );
        Ok(())
    }
}
