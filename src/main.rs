use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use fleet_dispatch::config::{LoggingSettings, Settings};
use fleet_dispatch::routes::{self, AppState};
use fleet_dispatch::services::Dispatcher;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_logging(&settings.logging);

    info!("Starting Fleet Dispatch service...");

    let dispatcher = Dispatcher::new(&settings.gemini).map_err(|e| {
        error!("Failed to initialize AI dispatcher: {:?}", e);
        std::io::Error::other(e.to_string())
    })?;

    if dispatcher.is_configured() {
        info!(
            "AI dispatch enabled (model: {}, endpoint: {})",
            settings.gemini.model, settings.gemini.endpoint
        );
    } else {
        // Still serve: the endpoint reports the missing key to the dashboard
        warn!("GEMINI_API_KEY not set, AI dispatch requests will return 503");
    }

    let app_state = AppState {
        dispatcher: Arc::new(dispatcher),
        max_body_bytes: settings.server.max_body_bytes,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
