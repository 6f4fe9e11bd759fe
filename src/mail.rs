//! Outbound invitation email.
//!
//! Registration must never fail or block on mail delivery: sends run as
//! detached tasks whose outcome is only logged.

use std::time::Duration;

use aws_sdk_sesv2::{
    error::{BuildError, SdkError},
    operation::send_email::SendEmailError,
    types::{Body, Content, Destination, EmailContent, Message},
    Client as SesClient,
};
use log::{debug, info, warn};
use rocket::tokio::{self, time::timeout};
use thiserror::Error;
use url::Url;

use crate::model::participant::Email;

const SUBJECT: &str = "Survey invitation";

#[derive(Debug, Error)]
enum MailError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Send(#[from] SdkError<SendEmailError>),
}

/// Sends survey invitations via Amazon SES. Without mail configuration the
/// mailer is disabled and invitations are only logged.
pub struct Mailer {
    backend: Option<SesBackend>,
    public_url: Url,
}

struct SesBackend {
    client: SesClient,
    from: String,
    timeout: Duration,
}

impl Mailer {
    pub fn ses(client: SesClient, from: String, send_timeout: Duration, public_url: Url) -> Self {
        Self {
            backend: Some(SesBackend {
                client,
                from,
                timeout: send_timeout,
            }),
            public_url,
        }
    }

    pub fn disabled(public_url: Url) -> Self {
        Self {
            backend: None,
            public_url,
        }
    }

    /// The personalised link a participant follows to vote.
    fn invitation_link(&self, email: &Email) -> Url {
        let mut link = self.public_url.clone();
        link.query_pairs_mut().append_pair("email", email.as_str());
        link
    }

    /// Dispatch an invitation, fire-and-forget. Errors and timeouts are
    /// logged, never returned: registration does not depend on delivery.
    pub fn send_invitation(&self, email: &Email) {
        let link = self.invitation_link(email);
        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                info!("Mailer disabled, skipping invitation to {email} ({link})");
                return;
            }
        };

        let client = backend.client.clone();
        let from = backend.from.clone();
        let send_timeout = backend.timeout;
        let to = email.clone();
        tokio::spawn(async move {
            match timeout(send_timeout, send(&client, &from, &to, &link)).await {
                Ok(Ok(())) => debug!("Invitation sent to {to}"),
                Ok(Err(err)) => warn!("Failed to send invitation to {to}: {err}"),
                Err(_) => warn!("Invitation to {to} timed out after {send_timeout:?}"),
            }
        });
    }
}

async fn send(
    client: &SesClient,
    from: &str,
    to: &Email,
    link: &Url,
) -> std::result::Result<(), MailError> {
    let subject = Content::builder().data(SUBJECT).build()?;
    let html = Content::builder()
        .data(format!(
            "<h2>Survey invitation</h2>\
             <p>You have been invited to take part in a survey.</p>\
             <p><a href=\"{link}\">Click here to respond</a></p>\
             <p style=\"font-size:12px;color:#666\">\
             This link is personal and can only be used once.</p>"
        ))
        .build()?;
    let message = Message::builder()
        .subject(subject)
        .body(Body::builder().html(html).build())
        .build();

    client
        .send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to.as_str()).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;
    Ok(())
}
