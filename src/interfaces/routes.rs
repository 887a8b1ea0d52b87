use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
    middleware::NormalizePath,
};
use actix_cors::Cors;
use tracing_actix_web::TracingLogger;

use crate::{
    errors::RateLimitScope,
    handlers::json_error::not_found,
    middlewares::{origin_guard::OriginGuard, rate_limit::RateLimit, security_headers::security_headers},
    constants::HEALTH_PATH,
    AppState,
};

mod contact;
mod system;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.configure(system::config_routes);
    cfg.configure(|cfg| contact::config_routes(cfg, state));
    cfg.configure(|cfg| json_error::config_routes(cfg, state.body_limit));
}

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

/// Builds the full application. Middleware runs outermost first:
/// tracing, security headers, path normalization, origin guard, CORS, global limiter.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let global_limiter = RateLimit::new(
        state.global_limiter.clone(),
        RateLimitScope::Global,
        state.trust_forwarded_for,
    )
    .exempt(HEALTH_PATH);
    let origin_guard = OriginGuard::new(state.allowed_origins.clone());
    let cors = cors(&state.allowed_origins);

    App::new()
        .app_data(state.clone())
        .configure(|cfg| configure_routes(cfg, &state))
        .default_service(web::to(not_found))
        .wrap(global_limiter)
        .wrap(cors)
        .wrap(origin_guard)
        .wrap(NormalizePath::trim())
        .wrap(security_headers())
        .wrap(TracingLogger::default())
}
