use std::time::Duration;

use actix_web::{web, HttpServer};
use contact_relay::{
    background_task::start_limiter_sweep,
    graceful_shutdown::shutdown_signal,
    routes::build_app,
    settings::AppConfig, AppState
};
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => {
            init_tracing(cfg.is_production());
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let sweep_limiters = vec![
        ("global", app_state.global_limiter.clone()),
        ("contact", app_state.contact_limiter.clone()),
    ];

    let server = HttpServer::new(move || build_app(app_state.clone()))
        .workers(config.worker_count)
        .bind(server_addr)?
        .run();

    tokio::spawn(start_limiter_sweep(sweep_limiters, Duration::from_secs(config.limiter_sweep_secs)));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
