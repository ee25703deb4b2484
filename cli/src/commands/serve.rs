// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP daemon: engine behind the axum API until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use mindease_engine::domain::{
    EmbeddingConfig, EmbeddingProviderKind, EngineConfigManifest, EngineEvent,
};
use mindease_engine::infrastructure::{
    EventBus, EventBusError, EventReceiver, OllamaEmbeddingProvider,
};
use mindease_engine::presentation::app;
use mindease_engine::EmotionEngine;
use tokio::signal;
use tracing::{debug, info, warn};

use super::build_engine;

const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn run(manifest: EngineConfigManifest, host: Option<String>, port: Option<u16>) -> Result<()> {
    let spec = &manifest.spec;
    let host = host.unwrap_or_else(|| spec.network.bind_address.clone());
    let port = port.unwrap_or(spec.network.port);

    info!(
        name = %manifest.metadata.name,
        storage = ?spec.storage.backend,
        embedding = ?spec.embedding.provider,
        "Starting MindEase daemon"
    );

    if spec.observability.metrics.enabled {
        let metrics_addr: SocketAddr = format!("{}:{}", host, spec.observability.metrics.port)
            .parse()
            .context("Invalid metrics listen address")?;
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics exposed on {}", metrics_addr);
    }

    check_embedding_backend(&spec.embedding).await?;

    let event_bus = EventBus::default();
    let events = tokio::spawn(log_events(event_bus.subscribe()));

    let engine: Arc<dyn EmotionEngine> = Arc::new(build_engine(spec, None, event_bus).await?);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("MindEase API listening on {}", addr);

    axum::serve(listener, app(engine.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    engine.shutdown().await.context("Engine shutdown failed")?;
    drop(engine);
    // The bus closes once the engine is dropped; give the logger a moment to drain.
    if tokio::time::timeout(EVENT_DRAIN_TIMEOUT, events).await.is_err() {
        debug!("Event logger still running at exit");
    }

    info!("Daemon shut down");
    Ok(())
}

/// Fail fast when a model-backed provider is unreachable
async fn check_embedding_backend(config: &EmbeddingConfig) -> Result<()> {
    if config.provider != EmbeddingProviderKind::Ollama {
        return Ok(());
    }

    let provider =
        OllamaEmbeddingProvider::new(config.endpoint.clone(), config.model.clone(), config.timeout)
            .context("Failed to create embedding provider")?;
    provider
        .health_check()
        .await
        .with_context(|| format!("Ollama at {} is not reachable", config.endpoint))?;
    info!(endpoint = %config.endpoint, model = provider.model(), "Embedding backend reachable");
    Ok(())
}

async fn log_events(mut receiver: EventReceiver) {
    loop {
        match receiver.recv().await {
            Ok(event) => match &event {
                EngineEvent::CrisisCheckCompleted { flagged, .. } if *flagged > 0 => {
                    warn!(event = event.event_type(), flagged, "Crisis check flagged entries");
                }
                _ => debug!(event = event.event_type(), "Engine event"),
            },
            Err(EventBusError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
