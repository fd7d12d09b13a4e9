use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vam_api::config::{ConfigError, LogFormat, ServerConfig};
use vam_api::health::HealthChecker;
use vam_api::router::build_app_router;
use vam_api::state::AppState;
use vam_queue::consumer::{self, BackoffConfig, ConsumerConfig};
use vam_queue::{
    ConnectivityCheck, ProxyClient, ProxyEndpoint, ProxyProducer, QueueHandler, TopicProbe,
};

/// Timeout for every call to the queue proxy.
const PROXY_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "vam_api=debug,vam_queue=debug,vam_core=info,tower_http=debug".into()
    });
    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!(
        host = %config.host,
        port = config.port,
        service_name = %config.service_name,
        queue_addrs = ?config.queue.addrs,
        read_topic = %config.queue.read_topic,
        write_topic = %config.queue.write_topic,
        "Loaded server configuration"
    );

    // --- Queue proxy clients ---
    let http = reqwest::Client::builder()
        .timeout(PROXY_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let queue = &config.queue;
    let write_addr = queue
        .producer_addr()
        .ok_or(ConfigError::NoQueueAddresses)?;
    let write_endpoint = ProxyEndpoint::new(write_addr)
        .with_queue(Some(queue.write_queue.clone()))
        .with_authorization(queue.authorization.clone());
    let producer = Arc::new(ProxyProducer::new(
        ProxyClient::new(http.clone(), write_endpoint),
        queue.write_topic.clone(),
    ));

    let read_clients: Vec<ProxyClient> = queue
        .addrs
        .iter()
        .map(|addr| {
            let endpoint = ProxyEndpoint::new(addr.as_str())
                .with_queue(Some(queue.read_queue.clone()))
                .with_authorization(queue.authorization.clone());
            ProxyClient::new(http.clone(), endpoint)
        })
        .collect();

    let consumer_checks: Vec<Arc<dyn ConnectivityCheck>> = read_clients
        .iter()
        .map(|client| {
            Arc::new(TopicProbe::new(client.clone(), queue.read_topic.clone()))
                as Arc<dyn ConnectivityCheck>
        })
        .collect();
    let health = HealthChecker::new(producer.clone(), consumer_checks);

    // --- Consumers ---
    let handler = QueueHandler::new(producer, queue.read_topic.clone());
    let consumer_cancel = CancellationToken::new();
    let consumer_handles: Vec<_> = read_clients
        .into_iter()
        .map(|client| {
            let consumer_config = ConsumerConfig {
                group: queue.group.clone(),
                topic: queue.read_topic.clone(),
                poll_interval: queue.poll_interval,
                backoff: BackoffConfig::default(),
            };
            tokio::spawn(consumer::run(
                client,
                consumer_config,
                handler.clone(),
                consumer_cancel.clone(),
            ))
        })
        .collect();
    tracing::info!(count = consumer_handles.len(), "Queue consumers started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        health: Arc::new(health),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config.host.parse().context("Invalid HOST address")?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping consumers");
    consumer_cancel.cancel();
    for handle in consumer_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
