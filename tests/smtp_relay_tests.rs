use std::{
    net::TcpListener,
    time::{Duration, Instant},
};

use actix_web::{http::StatusCode, ResponseError};

use contact_relay::{
    entities::contact::OutboundMessage,
    errors::{AppError, MailRelayError},
    mail::{
        relay::{MailRelay, MailSettings},
        smtp::SmtpRelay,
    },
    settings::AppConfig,
};

fn settings_for(port: u16) -> MailSettings {
    let config = AppConfig {
        smtp_host: "127.0.0.1".into(),
        smtp_port: port,
        smtp_user: "relay@example.com".into(),
        smtp_pass: "test-smtp-password".into(),
        smtp_timeout_secs: 1,
        mail_to: "owner@example.com".into(),
        ..AppConfig::default()
    };
    MailSettings::from_config(&config).unwrap()
}

fn outbound(reply_to: &str) -> OutboundMessage {
    OutboundMessage {
        from: "relay@example.com".into(),
        to: "owner@example.com".into(),
        reply_to: reply_to.into(),
        subject: "New contact request from Jo Smith".into(),
        body: "New contact form submission\n".into(),
        headers: vec![("X-Contact-Client-IP".into(), "203.0.113.5".into())],
    }
}

#[actix_rt::test]
async fn silent_server_fails_within_the_exchange_limit() {
    // The kernel completes the handshake from the backlog, but no greeting is ever sent
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let settings = settings_for(listener.local_addr().unwrap().port());

    let started = Instant::now();
    let result = SmtpRelay::new().send(&settings, &outbound("jo@example.com")).await;

    assert!(
        matches!(result, Err(MailRelayError::Unreachable(_) | MailRelayError::TimedOut(_))),
        "{result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(4));
    drop(listener);
}

#[actix_rt::test]
async fn refused_connection_maps_to_service_unavailable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = SmtpRelay::new()
        .send(&settings_for(port), &outbound("jo@example.com"))
        .await
        .unwrap_err();

    let app_err = AppError::from(err);
    assert!(matches!(app_err, AppError::MailRelay(_)), "{app_err:?}");
    assert_eq!(app_err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn message_carries_reply_to_and_client_ip_headers() {
    let message = SmtpRelay::build_message(&outbound("jo@example.com")).unwrap();
    let rendered = String::from_utf8(message.formatted()).unwrap();

    assert!(rendered.contains("Reply-To: jo@example.com\r\n"), "{rendered}");
    assert!(rendered.contains("X-Contact-Client-IP: 203.0.113.5\r\n"), "{rendered}");
    assert!(rendered.contains("Subject: New contact request from Jo Smith\r\n"));
}

#[test]
fn unparseable_reply_to_is_an_internal_error() {
    let err = SmtpRelay::build_message(&outbound("not an address")).unwrap_err();

    assert!(matches!(err, MailRelayError::InvalidAddress("reply-to", _)));
    assert!(matches!(AppError::from(err), AppError::Internal(_)));
}
