//! Email service.
//!
//! Templates are rendered here; delivery goes through a [`Mailer`]
//! implementation chosen at startup (SMTP when configured, log-only otherwise).

use async_trait::async_trait;
use inkwell_common::{AppError, AppResult, config::EmailConfig};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::{Arc, Mutex};

/// Email message to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body (optional)
    pub html_body: Option<String>,
}

/// Outgoing mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build an SMTP transport (STARTTLS) from configuration.
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient: {e}")))?)
            .subject(message.subject.clone());

        let email = match message.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.text_body,
                html,
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text_body),
        }
        .map_err(|e| AppError::Mail(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        tracing::debug!(to = %message.to, subject = %message.subject, "Sent email via SMTP");
        Ok(())
    }
}

/// Mailer that only logs, used when SMTP is not configured.
///
/// Messages are kept in memory so tests can inspect them.
#[derive(Clone, Default)]
pub struct LogMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl LogMailer {
    /// Create a log-only mailer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handed to this mailer so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "Email delivery disabled, logging message"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// Email service: renders templates and hands them to the mailer.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    site_name: String,
    site_url: String,
}

impl EmailService {
    /// Create a new email service.
    pub fn new(mailer: Arc<dyn Mailer>, site_url: &str) -> Self {
        Self {
            mailer,
            site_name: "Inkwell".to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Link the frontend uses to confirm an address.
    #[must_use]
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/verify-email?token={}",
            self.site_url,
            urlencoding::encode(token)
        )
    }

    /// Send the email verification message.
    pub async fn send_verification(&self, to: &str, username: &str, token: &str) -> AppResult<()> {
        let url = self.verification_url(token);
        let subject = format!("Verify your email for {}", self.site_name);
        let text_body = format!(
            "Hi {username},\n\nConfirm your email address by opening this link:\n\n{url}\n\nIf you did not sign up, ignore this message."
        );
        let html_body = self.wrap_html(&format!(
            "<p>Hi {username},</p>\
            <p>Confirm your email address by clicking the link below.</p>\
            <p><a href=\"{url}\">Verify email</a></p>\
            <p>If you did not sign up, ignore this message.</p>"
        ));

        self.mailer
            .send(EmailMessage {
                to: to.to_string(),
                subject,
                text_body,
                html_body: Some(html_body),
            })
            .await
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #2f6f4f; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">Sent by <a href="{}">{}</a>.</p>
</body>
</html>"#,
            content, self.site_url, self.site_name
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_url() {
        let service = EmailService::new(Arc::new(LogMailer::new()), "https://blog.example.com/");
        assert_eq!(
            service.verification_url("abc123"),
            "https://blog.example.com/verify-email?token=abc123"
        );
    }

    #[tokio::test]
    async fn test_send_verification_uses_mailer() {
        let mailer = LogMailer::new();
        let service = EmailService::new(Arc::new(mailer.clone()), "https://blog.example.com");

        service
            .send_verification("alice@example.com", "alice", "tok")
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].text_body.contains("verify-email?token=tok"));
        assert!(sent[0].html_body.as_deref().unwrap().contains("Hi alice"));
    }

    #[tokio::test]
    async fn test_smtp_mailer_builds_from_config() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 2525,
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            from: "Inkwell <no-reply@example.com>".to_string(),
        };
        assert!(SmtpMailer::new(&config).is_ok());
    }
}
