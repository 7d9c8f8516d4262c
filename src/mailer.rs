use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use tracing::{debug, info, warn};

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, username: Option<&str>, password: Option<&str>, from: &str) -> anyhow::Result<Self> {
        let from = from.parse::<Mailbox>().context("parse MAIL_FROM")?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("smtp relay {}", host))?;
        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let to = to
            .parse::<Mailbox>()
            .with_context(|| format!("parse recipient {}", to))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build message")?;
        self.transport.send(message).await.context("smtp send")?;
        debug!(subject, "mail sent");
        Ok(())
    }
}

/// Used when no SMTP host is configured: the message only goes to the log.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let body = redact_codes(body);
        info!(%to, %subject, %body, "smtp not configured; mail logged instead of sent");
        Ok(())
    }
}

lazy_static! {
    static ref CODE_RE: Regex = Regex::new(r"\b\d{4,}\b").unwrap();
}

/// Masks digit runs that look like one-time codes.
pub fn redact_codes(body: &str) -> Cow<'_, str> {
    CODE_RE.replace_all(body, "******")
}

pub fn from_config(cfg: &MailConfig) -> anyhow::Result<std::sync::Arc<dyn Mailer>> {
    match &cfg.smtp_host {
        Some(host) => Ok(std::sync::Arc::new(SmtpMailer::new(
            host,
            cfg.smtp_username.as_deref(),
            cfg.smtp_password.as_deref(),
            &cfg.from,
        )?)),
        None => {
            warn!("SMTP_HOST is not set; verification mail will be logged, not delivered");
            Ok(std::sync::Arc::new(LogMailer))
        }
    }
}
