use chrono::{SecondsFormat, Utc};

use crate::{
    entities::contact::{ContactSubmission, OutboundMessage, SanitizedContact, SubmissionMeta},
    errors::AppError,
    mail::relay::{MailRelay, MailSettings, MissingMailSettings},
    validation::validate_submission,
};

pub struct ContactHandler<M>
where
    M: MailRelay,
{
    pub relay: M,
    pub mail_settings: Result<MailSettings, MissingMailSettings>,
}

impl<M> ContactHandler<M>
where
    M: MailRelay,
{
    pub fn new(relay: M, mail_settings: Result<MailSettings, MissingMailSettings>) -> Self {
        ContactHandler { relay, mail_settings }
    }

    /// Validates, sanitizes and relays a submission. Returns the relay's message id.
    pub async fn submit(
        &self,
        submission: &ContactSubmission,
        meta: &SubmissionMeta,
    ) -> Result<String, AppError> {
        let validated = validate_submission(submission).inspect_err(|e| {
            if let AppError::Validation { field, .. } = e {
                tracing::info!(field = *field, "Contact submission rejected by validation");
            }
        })?;

        let settings = self.mail_settings.as_ref().map_err(|missing| {
            tracing::error!("Contact submission cannot be sent: {}", missing);
            AppError::Configuration(missing.to_string())
        })?;

        let contact = SanitizedContact::from(validated);
        let message = build_outbound_message(settings, &contact, meta);

        match self.relay.send(settings, &message).await {
            Ok(message_id) => {
                tracing::info!(%message_id, "Contact email sent");
                Ok(message_id)
            }
            Err(e) => {
                tracing::error!(error = %e, host = %settings.host, "Failed to relay contact email");
                Err(e.into())
            }
        }
    }
}

pub fn build_outbound_message(
    settings: &MailSettings,
    contact: &SanitizedContact,
    meta: &SubmissionMeta,
) -> OutboundMessage {
    let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let user_agent = meta.user_agent.as_deref().unwrap_or("Unknown");
    let message = if contact.message.is_empty() {
        "(no message provided)"
    } else {
        contact.message.as_str()
    };

    // The free-text message goes last so it cannot pose as a metadata line
    let body = format!(
        "New contact form submission\n\
         \n\
         Name: {name}\n\
         Email: {email}\n\
         URL: {url}\n\
         Submitted: {submitted_at}\n\
         IP: {ip}\n\
         User-Agent: {user_agent}\n\
         \n\
         Message:\n\
         {message}\n",
        name = contact.name,
        email = contact.email,
        url = contact.url,
        ip = meta.client_ip,
    );

    OutboundMessage {
        from: settings.from.clone(),
        to: settings.to.clone(),
        reply_to: contact.email.clone(),
        subject: format!("New contact request from {}", contact.name),
        body,
        headers: vec![("X-Contact-Client-IP".to_string(), meta.client_ip.clone())],
    }
}
