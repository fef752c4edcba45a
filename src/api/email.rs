//! Outbound mail for one-time codes.
//!
//! Delivery goes through the `EmailSender` trait so the flows never care how
//! mail leaves the process. `SmtpSender` talks to a real relay; the default
//! for local development is `LogEmailSender`, which logs and returns `Ok(())`.
//! Dispatch is a single blocking network call with no in-request retry, a
//! transient relay failure is surfaced straight back to the caller.

use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use secrecy::ExposeSecret;
use tracing::info;

use crate::cli::globals::SmtpArgs;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Email delivery abstraction used by the OTP issuance flow.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can report failure.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.text_body,
            "email send stub"
        );
        Ok(())
    }
}

/// SMTP relay sender. Port 465 uses implicit TLS, anything else STARTTLS.
pub struct SmtpSender {
    transport: SmtpTransport,
    from: String,
}

impl SmtpSender {
    pub fn new(args: &SmtpArgs, from: String) -> Result<Self> {
        let credentials = Credentials::new(
            args.username.clone(),
            args.password.expose_secret().to_string(),
        );

        let builder = if args.port == 465 {
            SmtpTransport::relay(&args.host)
        } else {
            SmtpTransport::starttls_relay(&args.host)
        }
        .context("failed to configure SMTP relay")?;

        Ok(Self {
            transport: builder.port(args.port).credentials(credentials).build(),
            from,
        })
    }
}

impl EmailSender for SmtpSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(message
                .to_email
                .parse()
                .context("invalid recipient address")?)
            .subject(message.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
            .context("failed to build email")?;

        self.transport
            .send(&email)
            .context("SMTP relay rejected the message")?;

        Ok(())
    }
}

/// Build the OTP message sent during issuance.
#[must_use]
pub fn otp_message(to_email: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to_email: to_email.to_string(),
        subject: "Your OTP for Email Verification".to_string(),
        text_body: format!("Your code is {code}. It expires in 5 minutes."),
        html_body: format!(
            "<p>Your GlobeTrail login code is <b>{code}</b>. It expires in 5 minutes.</p>"
        ),
    }
}
