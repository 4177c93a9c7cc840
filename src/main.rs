use actix_web::{App, HttpServer, middleware::Logger, web};

use subscription_tracker::{
    config::Config,
    database::create_store,
    handlers,
    logging::init_logging,
    middlewares::create_cors,
    services::SubscriptionService,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // config errors are reported before the JSON logger exists
    let config = match Config::from_toml() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    let store = match create_store(&config.database).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to initialize subscription store: {e}");
            std::process::exit(1);
        }
    };

    let subscription_service = SubscriptionService::new(store, config.subscriptions);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(handlers::extractor_config)
            .configure(handlers::health_config)
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
