use actix_web::{get, HttpResponse, Responder};
use humantime::format_duration;
use chrono::{SecondsFormat, Utc};
use std::time::Duration;
use serde::Serialize;
use crate::constants::START_TIME;

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    timestamp: String,
    uptime: String,
    version: &'static str,
}

/// Liveness check. Bypasses both rate limiters.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "ok",
        timestamp: now_utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: human_uptime.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
