
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn health_returns_ok_and_timestamp() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some_and(|ts| !ts.is_empty()));
}

#[actix_rt::test]
async fn health_is_never_rate_limited() {
    let app = TestApp::spawn().await;

    for _ in 0..(app.config.global_rate_max * 4) {
        let response = app.client
            .get(format!("{}/health", app.address))
            .header("X-Forwarded-For", "203.0.113.10")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[actix_rt::test]
async fn valid_submission_is_relayed_once() {
    let app = TestApp::spawn().await;

    let response = app.post_contact("203.0.113.20", &valid_submission()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    let sent = app.relay.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to, "jo@example.com");
    assert_eq!(sent[0].to, "owner@example.com");
    assert_eq!(sent[0].from, "relay@example.com");
    assert!(sent[0].subject.contains("Jo Smith"));
    assert!(sent[0].body.contains("Name: Jo Smith"));
    assert!(sent[0].body.contains("URL: https://app.example.com"));
    assert!(sent[0].body.contains("Please review"));
    assert!(sent[0].body.contains("IP: 203.0.113.20"));
}

#[actix_rt::test]
async fn submission_is_sanitized_before_relay() {
    let app = TestApp::spawn().await;

    let response = app.post_contact("203.0.113.21", &json!({
        "name": "  Jo Smith  ",
        "email": "Jo@Example.COM",
        "url": "https://app.example.com",
        "message": "   hello   "
    })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let sent = app.relay.sent.lock();
    assert_eq!(sent[0].reply_to, "jo@example.com");
    assert!(sent[0].body.contains("Name: Jo Smith\n"));
    assert!(sent[0].body.contains("\nhello\n"));
}

#[actix_rt::test]
async fn alternate_message_key_is_accepted() {
    let app = TestApp::spawn().await;

    let response = app.post_contact("203.0.113.22", &json!({
        "name": "Jo Smith",
        "email": "jo@example.com",
        "url": "https://app.example.com",
        "description": "Sent through the legacy key"
    })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.relay.sent.lock()[0].body.contains("Sent through the legacy key"));
}

#[actix_rt::test]
async fn invalid_fields_return_400_without_sending() {
    let app = TestApp::spawn().await;

    let cases = [
        ("name", json!({ "name": "J", "email": "jo@example.com", "url": "https://app.example.com" })),
        ("email", json!({ "name": "Jo Smith", "email": "not-an-email", "url": "https://app.example.com" })),
        ("url", json!({ "name": "Jo Smith", "email": "jo@example.com", "url": "http://192.168.1.1/admin" })),
        ("message", json!({ "name": "Jo Smith", "email": "jo@example.com", "url": "https://app.example.com", "message": "x".repeat(501) })),
    ];

    for (i, (field, body)) in cases.iter().enumerate() {
        let response = app.post_contact(&format!("198.51.100.{}", i + 1), body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "field {field}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["field"], *field);
        assert!(body["error"].as_str().is_some());
    }

    assert_eq!(app.relay.send_count(), 0);
}

#[actix_rt::test]
async fn addresses_the_mailer_cannot_encode_are_a_400() {
    let app = TestApp::spawn().await;

    for (i, email) in ["a,b@example.com", "jo@example.com.", "jo(x)@example.com"].iter().enumerate() {
        let body = json!({ "name": "Jo Smith", "email": email, "url": "https://app.example.com" });
        let response = app.post_contact(&format!("198.51.100.{}", i + 20), &body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{email}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["field"], "email");
    }

    assert_eq!(app.relay.send_count(), 0);
}

#[actix_rt::test]
async fn line_breaks_cannot_forge_body_fields() {
    let app = TestApp::spawn().await;

    let response = app.post_contact("203.0.113.25", &json!({
        "name": "Jo\r\nEmail: x@evil.test",
        "email": "jo@example.com",
        "url": "https://app.example.com",
        "message": "hi\r\nIP: 10.0.0.1"
    })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let sent = app.relay.sent.lock();
    let body = &sent[0].body;
    assert!(!body.contains("\nEmail: x@evil.test"));
    assert!(!sent[0].subject.contains('\n'));
    assert!(body.contains("IP: 203.0.113.25\n"));
    assert!(body.ends_with("Message:\nhi\nIP: 10.0.0.1\n"));
}

#[actix_rt::test]
async fn fourth_contact_request_in_window_is_rejected() {
    let app = TestApp::spawn().await;
    let ip = "203.0.113.30";

    for _ in 0..3 {
        let response = app.post_contact(ip, &valid_submission()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.post_contact(ip, &valid_submission()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("contact submissions"));

    assert_eq!(app.relay.send_count(), 3);

    let other = app.post_contact("203.0.113.31", &valid_submission()).await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn global_limiter_applies_to_every_route_but_health() {
    let app = TestApp::spawn().await;
    let ip = "203.0.113.40";

    for _ in 0..app.config.global_rate_max {
        let response = app.client
            .get(format!("{}/does-not-exist", app.address))
            .header("X-Forwarded-For", ip)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app.post_contact(ip, &valid_submission()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Too many requests from this IP, please try again later.");
    assert_eq!(app.relay.send_count(), 0);

    let health = app.client
        .get(format!("{}/health", app.address))
        .header("X-Forwarded-For", ip)
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn passed_requests_carry_rate_limit_headers() {
    let app = TestApp::spawn().await;

    let response = app.post_contact("203.0.113.45", &valid_submission()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["ratelimit-limit"], "5");
    assert_eq!(response.headers()["ratelimit-remaining"], "4");
}

#[actix_rt::test]
async fn disallowed_origin_is_rejected_with_403() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(format!("{}/contact", app.address))
        .header("Origin", "https://evil.example.net")
        .header("X-Forwarded-For", "203.0.113.50")
        .json(&valid_submission())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.relay.send_count(), 0);
}

#[actix_rt::test]
async fn allowed_origin_gets_cors_headers() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(format!("{}/contact", app.address))
        .header("Origin", ALLOWED_ORIGIN)
        .header("X-Forwarded-For", "203.0.113.51")
        .json(&valid_submission())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
}

#[actix_rt::test]
async fn missing_mail_configuration_fails_without_network_calls() {
    let config = contact_relay::settings::AppConfig {
        smtp_host: String::new(),
        ..test_config()
    };
    let app = TestApp::spawn_with(config, RecordingRelay::default()).await;

    for i in 0..3 {
        let response = app.post_contact(&format!("203.0.113.{}", 60 + i), &valid_submission()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Email service is not configured");
    }

    assert_eq!(app.relay.send_count(), 0);
}

#[actix_rt::test]
async fn relay_failure_returns_generic_503() {
    let app = TestApp::spawn_with(test_config(), RecordingRelay::failing()).await;

    let response = app.post_contact("203.0.113.70", &valid_submission()).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let text = response.text().await.unwrap();
    assert!(text.contains("Unable to send message"));
    assert!(!text.contains("535"));
    assert_eq!(app.relay.send_count(), 1);
}

#[actix_rt::test]
async fn unmatched_path_returns_json_404() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(format!("{}/contact", app.address))
        .header("X-Forwarded-For", "203.0.113.80")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Endpoint not found" }));
}

#[actix_rt::test]
async fn oversized_body_is_rejected() {
    let app = TestApp::spawn().await;
    let mut body = valid_submission();
    body["padding"] = Value::String("x".repeat(app.config.body_limit_bytes + 1));

    let response = app.post_contact("203.0.113.90", &body).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.relay.send_count(), 0);
}

#[actix_rt::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(format!("{}/contact", app.address))
        .header("X-Forwarded-For", "203.0.113.91")
        .header("Content-Type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid JSON payload");
}

#[actix_rt::test]
async fn responses_carry_security_headers() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
