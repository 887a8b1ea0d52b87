use actix_web::web;

use crate::handlers::json_error::json_error;

pub fn config_routes(cfg: &mut web::ServiceConfig, body_limit: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(body_limit)
            .error_handler(json_error)
    );
}
