use actix_web::{web, App, HttpServer};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use tracing_actix_web::TracingLogger;

use ns_api::{bootstrap, configure, json_config, tasks, telemetry};
use ns_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging);

    info!(
        app = %config.app_name,
        environment = %config.environment,
        "Starting notification service"
    );

    let services = bootstrap::build_services(&config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut delivery = None;

    if let Some(consumer) = services.consumer {
        delivery = Some(tasks::spawn_delivery_loop(
            services.state.worker.clone(),
            consumer,
            shutdown_rx.clone(),
        ));
    }
    let sweep = tasks::spawn_expiry_sweep(
        services.state.otp_service.clone(),
        services.memory_limiter,
        Duration::from_secs(config.otp.sweep_interval_seconds),
        shutdown_rx,
    );

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let state = web::Data::new(services.state);
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(TracingLogger::default())
            .configure(configure)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    info!("HTTP server stopped, draining background tasks");
    shutdown_tx.send(true).ok();
    if let Some(handle) = delivery {
        let processed = handle.await?;
        info!(processed = processed, "Delivery loop finished");
    }
    if let Some(handle) = sweep {
        handle.await?;
    }

    Ok(())
}
