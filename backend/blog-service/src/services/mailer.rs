/// SMTP mailer - async transport wrapper injected at startup
///
/// Constructed once in `main` and shared through application state; there is
/// no lazily-initialized global client. If no SMTP host is configured the
/// mailer operates in no-op mode (logs only), which is useful for
/// development and testing without email infrastructure.
use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use lettre::message::{header, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Mailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl Mailer {
    /// Build the mailer from configuration
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; mailer will operate in no-op mode");
            None
        } else {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| {
                    AppError::Internal(format!("Failed to configure SMTP transport: {}", e))
                })?
                .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    /// Whether a real SMTP transport is configured
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send one message per recipient as a single outbound batch.
    ///
    /// All messages are built and validated before any is sent. A transport
    /// failure aborts the remainder of the batch and surfaces the provider's
    /// error message; there is no per-recipient partial-success reporting.
    pub async fn send_batch(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<usize> {
        let messages = recipients
            .iter()
            .map(|recipient| self.build_message(recipient, subject, html_body, text_body))
            .collect::<Result<Vec<_>>>()?;

        match &self.transport {
            Some(transport) => {
                for message in messages {
                    transport
                        .send(message)
                        .await
                        .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;
                }
                info!(subject, count = recipients.len(), "newsletter batch sent");
            }
            None => {
                info!(
                    subject,
                    count = recipients.len(),
                    "mailer running in no-op mode; skipping actual send"
                );
            }
        }

        Ok(recipients.len())
    }

    /// HTML message with a plain-text alternative part
    fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<Message> {
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Email(format!("Invalid recipient email address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::Email(format!("Failed to build email message: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_mailer() -> Mailer {
        Mailer::new(&EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "Blog <noreply@example.com>".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_noop_mode_when_host_empty() {
        assert!(!noop_mailer().is_enabled());
    }

    #[test]
    fn test_invalid_from_address_rejected() {
        let result = Mailer::new(&EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "not an address".to_string(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_counts_recipients_in_noop_mode() {
        let mailer = noop_mailer();
        let recipients = vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ];
        let sent = mailer
            .send_batch(&recipients, "Hello", "<p>Hi</p>", "Hi")
            .await
            .unwrap();
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn test_batch_rejects_invalid_recipient() {
        let mailer = noop_mailer();
        let recipients = vec!["not-an-address".to_string()];
        assert!(mailer
            .send_batch(&recipients, "Hello", "<p>Hi</p>", "Hi")
            .await
            .is_err());
    }
}
