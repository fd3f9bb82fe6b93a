use std::io;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};

use notabene::{config::Config, errors::ServerError, store};

fn startup_error(e: ServerError) -> io::Error {
    log::error!("failed to start: {}", e);
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let store = web::Data::from(store::connect(&config).map_err(startup_error)?);
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_replenish_ms())
        .burst_size(config.rate_limit_max_requests)
        .finish()
        .ok_or_else(|| {
            startup_error(ServerError::EnvironmentError(
                "invalid rate limit settings".to_string(),
            ))
        })?;

    log::info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor_config))
            .wrap(Logger::default())
            .configure(notabene::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
