#![deny(unused)]
//! DeepFish Bridge - NVIDIA integration bridge
//!
//! Fronts the retrieval (RAG) and safety collaborators with a small JSON-over-HTTP
//! surface for the agent front-end.

use std::net::SocketAddr;
use std::sync::Arc;

use deepfish_core::config::AppConfig;
use deepfish_core::traits::{KnowledgeClient, SafetyClient};
use deepfish_gateway::{BridgeConfig, BridgeServer};
use deepfish_governance::NemoGuardSafetyClient;
use deepfish_knowledge::{Corpus, NemoRetrieverClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load()?;

    // Initialize tracing
    deepfish_governance::configure_tracing(&cfg.logging)?;

    tracing::info!("Starting DeepFish Bridge v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Observability (Metrics)
    // =========================================================================
    if let Some(metrics_port) = cfg.server.metrics_port {
        match resolve(&cfg.server.host, metrics_port).await {
            Some(addr) => deepfish_governance::setup_metrics_exporter(addr)?,
            None => tracing::warn!(
                host = %cfg.server.host,
                port = metrics_port,
                "Could not resolve metrics address; exporter disabled"
            ),
        }
    }

    // =========================================================================
    // Collaborators
    // =========================================================================
    // A collaborator that fails to build leaves its route answering 503.
    let knowledge: Option<Arc<dyn KnowledgeClient>> =
        match NemoRetrieverClient::new(&cfg.retriever, Corpus::builtin()) {
            Ok(client) => {
                tracing::info!(rerank_url = %client.rerank_url(), "RAG client initialized");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Failed to initialize RAG client: {}", e);
                None
            }
        };

    let safety: Option<Arc<dyn SafetyClient>> = match NemoGuardSafetyClient::new(&cfg.safety) {
        Ok(client) => {
            tracing::info!(enabled = client.is_enabled(), "Safety client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::error!("Failed to initialize Safety client: {}", e);
            None
        }
    };

    // =========================================================================
    // Gateway
    // =========================================================================
    let config = BridgeConfig::from(&cfg.server);
    let mut server = BridgeServer::new(config.clone());
    if let Some(client) = knowledge {
        server = server.with_knowledge(client);
    }
    if let Some(client) = safety {
        server = server.with_safety(client);
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  DeepFish Bridge v{}                      ║", env!("CARGO_PKG_VERSION"));
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Endpoints:                                                  ║");
    println!("║    GET  /*             - Liveness                            ║");
    println!("║    POST /rag/query     - Knowledge lookup                    ║");
    println!("║    POST /safety/check  - Input/output moderation             ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Server: http://{}:{}                                 ║", config.host, config.port);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// First socket address `host:port` resolves to.
async fn resolve(host: &str, port: u16) -> Option<SocketAddr> {
    match tokio::net::lookup_host((host, port)).await {
        Ok(mut addrs) => addrs.next(),
        Err(e) => {
            tracing::warn!("DNS resolution failed for {}: {}", host, e);
            None
        }
    }
}
