use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentType, HeaderName, HeaderValue},
        Mailbox,
    },
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    entities::contact::OutboundMessage,
    errors::MailRelayError,
    mail::relay::{MailRelay, MailSettings},
};

/// Opens a fresh SMTP session per message: connect, verify, send once.
#[derive(Debug, Clone, Default)]
pub struct SmtpRelay;

impl SmtpRelay {
    pub fn new() -> Self {
        SmtpRelay
    }

    fn transport(settings: &MailSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailRelayError> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| MailRelayError::Transport(e.to_string()))?
        } else {
            let tls = TlsParameters::new(settings.host.clone())
                .map_err(|e| MailRelayError::Transport(e.to_string()))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.as_str())
                .tls(Tls::Opportunistic(tls))
        };

        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.as_str().to_owned(),
        );

        Ok(builder
            .port(settings.port)
            .credentials(credentials)
            .authentication(vec![Mechanism::Plain, Mechanism::Login])
            .timeout(Some(settings.timeout))
            .build())
    }

    /// Renders the MIME message, including the extra headers carried by `message`.
    pub fn build_message(message: &OutboundMessage) -> Result<Message, MailRelayError> {
        let from: Mailbox = message.from.parse()
            .map_err(|e| MailRelayError::InvalidAddress("from", format!("{e}")))?;
        let to: Mailbox = message.to.parse()
            .map_err(|e| MailRelayError::InvalidAddress("to", format!("{e}")))?;
        let reply_to: Mailbox = message.reply_to.parse()
            .map_err(|e| MailRelayError::InvalidAddress("reply-to", format!("{e}")))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .reply_to(reply_to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        for (name, value) in &message.headers {
            let name = HeaderName::new_from_ascii(name.clone())
                .map_err(|e| MailRelayError::MessageBuild(format!("header {name}: {e:?}")))?;
            builder = builder.raw_header(HeaderValue::new(name, value.clone()));
        }

        builder
            .body(message.body.clone())
            .map_err(|e| MailRelayError::MessageBuild(e.to_string()))
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(&self, settings: &MailSettings, message: &OutboundMessage) -> Result<String, MailRelayError> {
        let email = Self::build_message(message)?;
        let transport = Self::transport(settings)?;

        let exchange = async {
            let reachable = transport
                .test_connection()
                .await
                .map_err(|e| MailRelayError::Unreachable(e.to_string()))?;
            if !reachable {
                return Err(MailRelayError::Unreachable(format!("{}:{}", settings.host, settings.port)));
            }

            let response = transport
                .send(email)
                .await
                .map_err(|e| MailRelayError::Send(e.to_string()))?;

            Ok(response.message().collect::<Vec<_>>().join(" "))
        };

        let limit = settings.exchange_timeout();
        tokio::time::timeout(limit, exchange)
            .await
            .map_err(|_| MailRelayError::TimedOut(limit))?
    }
}
