//! HTTP server facade with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{extract::State, routing::get, Router};
use tokio::signal;

use bookstore_db::Database;
use bookstore_kernel::{InitCtx, ModuleRegistry};

pub mod error;
pub mod extract;
pub mod router;

use error::AppError;
use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl+C or SIGTERM
pub async fn start_server(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
    let address = ctx.settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> Router {
    let server = &ctx.settings.server;
    let mut router_builder = RouterBuilder::new()
        .route("/healthz", get(health_check))
        .route("/readyz", get(readiness_check).with_state(ctx.db.clone()));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            base_path = %server.base_path,
            "mounting module routes"
        );
        router_builder = router_builder.mount_module(&server.base_path, module.routes(ctx));
    }

    router_builder = router_builder.with_openapi(registry, &server.base_path);
    if let Some(timeout_ms) = server.request_timeout_ms {
        router_builder = router_builder.with_timeout(timeout_ms);
    }

    router_builder
        .with_tracing()
        .with_cors()
        .with_request_id()
        .build()
}

/// Liveness check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Readiness check endpoint; fails while the database is unreachable
async fn readiness_check(State(db): State<Database>) -> Result<&'static str, AppError> {
    db.ping().await.context("database is not reachable")?;
    Ok("ok")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::warn!("received SIGTERM, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bookstore_kernel::settings::Settings;
    use tower::ServiceExt;

    async fn app() -> Router {
        let settings = Settings::default();
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        build_router(&ModuleRegistry::new(), &ctx)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_fails_when_pool_closed() {
        let settings = Settings::default();
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        let router = build_router(&ModuleRegistry::new(), &ctx);
        db.close().await;

        let response = router
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let spec: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(spec["info"]["title"], "Bookstore API");
    }

    struct SlowModule;

    #[async_trait::async_trait]
    impl bookstore_kernel::Module for SlowModule {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn routes(&self, _ctx: &InitCtx<'_>) -> Router {
            Router::new().route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    "done"
                }),
            )
        }
    }

    async fn slow_status(request_timeout_ms: Option<u64>) -> StatusCode {
        let mut settings = Settings::default();
        settings.server.request_timeout_ms = request_timeout_ms;
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        let mut registry = ModuleRegistry::new();
        registry.register(std::sync::Arc::new(SlowModule));

        build_router(&registry, &ctx)
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_requests_run_to_completion_by_default() {
        assert_eq!(slow_status(None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_configured_timeout_cuts_slow_requests() {
        assert_eq!(slow_status(Some(10)).await, StatusCode::REQUEST_TIMEOUT);
    }
}
