use actix_web::web;

use crate::{
    constants::CONTACT_PATH,
    errors::RateLimitScope,
    handlers::{contact, json_error::not_found},
    middlewares::rate_limit::RateLimit,
    AppState,
};

pub fn config_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::resource(CONTACT_PATH)
            .route(
                web::post()
                    .to(contact::submit_contact)
                    .wrap(RateLimit::new(
                        state.contact_limiter.clone(),
                        RateLimitScope::Contact,
                        state.trust_forwarded_for,
                    ))
            )
            .default_service(web::to(not_found))
    );
}
