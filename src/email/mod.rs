pub mod templates;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::models::Record;

/// A rendered submission notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub sender_name: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl Notification {
    pub fn for_submission(to: &str, form_type: &str, timestamp: &str, record: &Record) -> Self {
        Self {
            to: to.to_string(),
            sender_name: templates::SENDER_NAME.to_string(),
            subject: templates::subject(form_type),
            html: templates::render_submission(form_type, timestamp, record),
            text: templates::PLAIN_TEXT_FALLBACK.to_string(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), String>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), String> {
        let from_address = self
            .from
            .parse()
            .map_err(|e| format!("Invalid from address: {e}"))?;
        let from = Mailbox::new(Some(notification.sender_name.clone()), from_address);

        let message = Message::builder()
            .from(from)
            .to(notification
                .to
                .parse()
                .map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(notification.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                notification.text.clone(),
                notification.html.clone(),
            ))
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}
