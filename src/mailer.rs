use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::error::MailError;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

// local part, @, domain containing a dot
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// A contact-form submission rendered as an email.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl ContactMessage {
    pub fn compose(from: &str, to: &str, name: &str, email: &str, message: &str) -> Self {
        let text = format!("Name: {name}\nEmail: {email}\n\nMessage:\n{message}\n");
        let html = format!(
            "<h3>New Contact Form Submission</h3>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{}</p>\n",
            escape_html(name),
            escape_html(email),
            escape_html(message).replace('\n', "<br>"),
        );

        Self {
            from: from.to_string(),
            to: to.to_string(),
            reply_to: email.to_string(),
            subject: format!("Portfolio Contact Form: Message from {name}"),
            text,
            html,
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Outbound transport for contact messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError>;
}

// Hands the composed message to an HTTP mail relay as JSON
pub struct WebhookMailer {
    client: reqwest::Client,
    relay_url: String,
}

impl WebhookMailer {
    pub fn new(client: reqwest::Client, relay_url: impl Into<String>) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        let res = self.client.post(&self.relay_url).json(message).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

// No relay configured - the message only goes to the log
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            reply_to = %message.reply_to,
            subject = %message.subject,
            "Contact message (no mail relay configured)"
        );
        Ok(())
    }
}
