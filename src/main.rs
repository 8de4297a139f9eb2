use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, warn};

use srp_portal::config::AppConfig;
use srp_portal::routes;
use srp_portal::runtime::{lifetime, logging};
use srp_portal::utils::{json_error_handler, path_error_handler, query_error_handler};

fn io_error(stage: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{stage}: {err}"))
}

fn default_headers(config: &AppConfig) -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Connection", "keep-alive"))
        .add((
            "Keep-Alive",
            format!("timeout={}, max=1000", config.server.timeouts.keep_alive),
        ))
        .add(("Cache-Control", "no-cache, no-store, must-revalidate"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();
    let started = chrono::Utc::now();

    AppConfig::init().map_err(|e| io_error("Failed to initialize configuration", e))?;
    let config = AppConfig::get();
    let _log_guard = logging::init_tracing(config);

    warn!(
        project = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.app.environment,
        "Preparing server startup"
    );

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| io_error("Pre-startup failed", e))?;
    let storage = startup.storage;
    let cache = startup.cache;

    debug!(
        "Startup preparation finished in {} ms",
        (chrono::Utc::now() - started).num_milliseconds()
    );
    warn!("Serving with {} workers", config.server.workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(config.cors.max_age),
            )
            .wrap(Compress::default())
            .wrap(default_headers(config))
            // 提取器错误统一转成 ApiResponse
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .configure(routes::configure_all_routes)
    })
    .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(config.server.timeouts.client_disconnect))
    .workers(config.server.workers);

    #[cfg(unix)]
    let server = match config.unix_socket_path() {
        Some(socket_path) => {
            warn!("Listening on unix socket {}", socket_path);
            // 上次未清理的套接字文件会导致绑定失败
            if std::path::Path::new(socket_path).exists() {
                std::fs::remove_file(socket_path)?;
            }
            server.bind_uds(socket_path)?
        }
        None => {
            warn!("Listening on http://{}", config.server_bind_address());
            server.bind(config.server_bind_address())?
        }
    };

    #[cfg(not(unix))]
    let server = {
        warn!("Listening on http://{}", config.server_bind_address());
        server.bind(config.server_bind_address())?
    };

    tokio::select! {
        res = server.run() => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown signal received, server stopped");
        }
    }

    Ok(())
}
