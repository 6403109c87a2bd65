//! # octoflowd: octoflow daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize `tracing` from the configured filter
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the rule repository, the rule-change bus and the GitHub client
//! - Construct application services, injecting adapters via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use octoflow_adapter_github_octocrab::Config as GitHubConfig;
use octoflow_adapter_http_axum::state::AppState;
use octoflow_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqliteRuleRepository};
use octoflow_app::event_bus::InProcessRuleBus;
use octoflow_app::services::automation_service::AutomationService;
use octoflow_app::services::rule_service::RuleService;

use crate::config::Config;

const RULE_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let rule_repo = Arc::new(SqliteRuleRepository::new(db.pool().clone()));

    // GitHub
    if config.github.token.is_none() {
        tracing::warn!("no GitHub token configured, mutating actions will fail");
    }
    let github = GitHubConfig {
        token: config.github.token.clone(),
        api_url: config.github.api_url.clone(),
    }
    .build()?;

    // Rule-change bus
    let rule_bus = Arc::new(InProcessRuleBus::new(RULE_BUS_CAPACITY));

    // Services
    let rule_service = RuleService::new(Arc::clone(&rule_repo), Arc::clone(&rule_bus));
    let automation_service = AutomationService::new(rule_repo, github);

    // HTTP
    let state = AppState::new(rule_service, automation_service, rule_bus);
    let app = octoflow_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "octoflowd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("octoflowd shut down");
    Ok(())
}

/// Resolve on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
