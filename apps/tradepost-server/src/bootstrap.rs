use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::{http::header, routing::get, Router};
use url::Url;
use utoipa::OpenApi;

use restkit::HttpLayerConfig;
use runtime::{AppConfig, CatalogConfig, CatalogMode, CliArgs};
use swaps::contract::model::{ItemSnapshot, ItemStatus, UserProfile};
use swaps::domain::ports::{CatalogPort, DirectoryPort};
use swaps::infra::backend::{FixtureBackend, HttpBackendClient};
use swaps::infra::storage::{InMemoryConversationStore, InMemorySwapLedger};
use swaps::{rest_router, Service, ServiceConfig, SwapsApiDoc, SwapsConfig};

use crate::web;

/// Build the fixture backend from the inline seed lists, validating item
/// statuses at wiring time so a typo fails startup instead of a request.
fn seed_fixture(cfg: &CatalogConfig) -> Result<FixtureBackend> {
    let backend = FixtureBackend::new();
    for item in &cfg.items {
        let status = item
            .status
            .parse::<ItemStatus>()
            .map_err(|e| anyhow!("catalog.items[{}]: {}", item.id, e))?;
        backend.seed_item(ItemSnapshot {
            id: item.id,
            owner_id: item.owner_id,
            title: item.title.clone(),
            status,
        });
    }
    for user in &cfg.users {
        backend.seed_user(UserProfile {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        });
    }
    Ok(backend)
}

#[allow(clippy::type_complexity)]
fn backend_from_config(
    cfg: &CatalogConfig,
    mock: bool,
) -> Result<(Arc<dyn CatalogPort>, Arc<dyn DirectoryPort>)> {
    if mock || cfg.mode == CatalogMode::Fixture {
        if mock && cfg.mode == CatalogMode::Http {
            tracing::info!("--mock set, overriding http catalog with the fixture backend");
        }
        let fixture = Arc::new(seed_fixture(cfg)?);
        tracing::info!(
            "Fixture backend ready ({} items, {} users)",
            cfg.items.len(),
            cfg.users.len()
        );
        return Ok((fixture.clone(), fixture));
    }

    let base = Url::parse(&cfg.base_url)
        .with_context(|| format!("Invalid catalog.base_url '{}'", cfg.base_url))?;
    tracing::info!("HTTP backend at {}", base);
    let client = Arc::new(HttpBackendClient::new(reqwest::Client::new(), base));
    Ok((client.clone(), client))
}

fn swaps_config(config: &AppConfig) -> Result<SwapsConfig> {
    match config.modules.get("swaps") {
        Some(value) => {
            serde_json::from_value(value.clone()).context("Invalid [modules.swaps] configuration")
        }
        None => Ok(SwapsConfig::default()),
    }
}

/// Assemble the full application router: module routes, health, OpenAPI
/// document, docs UI, and the shared HTTP middleware stack.
pub fn build_router(config: &AppConfig, mock: bool) -> Result<Router> {
    let catalog_cfg = config.catalog.clone().unwrap_or_default();
    let (catalog, directory) = backend_from_config(&catalog_cfg, mock)?;

    let service_config: ServiceConfig = swaps_config(config)?.into();
    let service = Arc::new(Service::new(
        Arc::new(InMemorySwapLedger::new()),
        Arc::new(InMemoryConversationStore::new()),
        catalog,
        directory,
        service_config,
    ));

    // Serialize the OpenAPI document once; it never changes at runtime.
    let openapi_json = SwapsApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    let mut router = Router::new()
        .route("/api/health", get(web::health))
        .merge(rest_router(service))
        .route(
            "/openapi.json",
            get(move || {
                std::future::ready((
                    [(header::CONTENT_TYPE, "application/json")],
                    openapi_json.clone(),
                ))
            }),
        );

    if config.server.enable_docs {
        router = router.route("/docs", get(web::docs_page));
    }

    let layer_cfg = HttpLayerConfig {
        timeout: if config.server.timeout_sec == 0 {
            HttpLayerConfig::default().timeout
        } else {
            Duration::from_secs(config.server.timeout_sec)
        },
        cors_enabled: config.server.cors_enabled,
        ..HttpLayerConfig::default()
    };
    Ok(restkit::apply_http_layers(router, &layer_cfg))
}

pub async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing swaps module...");
    let router = build_router(&config, args.mock)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = crate::shutdown::shutdown_signal().await {
                tracing::error!("Signal listener failed: {}", e);
            }
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(Into::into)
}

pub async fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    // Exercise the whole wiring path short of binding a socket, so bad
    // base URLs and fixture statuses fail here too.
    let _ = build_router(&config, args.mock)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
