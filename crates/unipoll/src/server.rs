//! HTTP surface of the exporter.
//!
//! `GET /metrics` runs every collector under the scrape timeout;
//! `GET /healthz` reports liveness without touching the controller. The
//! `/admin/cache/*` endpoints invalidate the snapshot or change its TTL.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use unipoll_core::{CancellationToken, SnapshotSource};

use crate::cli::ServeArgs;
use crate::config;
use crate::error::CliError;
use crate::metrics::Exporter;

#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<Exporter>,
    pub source: Arc<SnapshotSource>,
    pub scrape_timeout: Duration,
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/admin/cache/invalidate", post(invalidate))
        .route("/admin/cache/ttl", put(set_ttl))
        .with_state(state)
}

// ── Handlers ────────────────────────────────────────────────────────

async fn metrics(State(state): State<AppState>) -> Response {
    let cancel = state.shutdown.child_token();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = state.scrape_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let result = state.exporter.scrape(&cancel).await;
    deadline.abort();

    match result {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache_age_seconds": state.source.age().map(|age| age.as_secs_f64()),
        "cache_ttl_seconds": state.source.ttl().as_secs(),
    }))
}

async fn invalidate(State(state): State<AppState>) -> StatusCode {
    state.source.invalidate();
    info!("snapshot invalidated via admin endpoint");
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct TtlRequest {
    seconds: u64,
}

async fn set_ttl(
    State(state): State<AppState>,
    Json(request): Json<TtlRequest>,
) -> Json<serde_json::Value> {
    state.source.set_ttl(Duration::from_secs(request.seconds));
    Json(json!({ "ttl_seconds": request.seconds }))
}

// ── Lifecycle ───────────────────────────────────────────────────────

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
pub async fn serve(
    state: AppState,
    listen: std::net::SocketAddr,
) -> Result<(), CliError> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|source| CliError::Bind {
            addr: listen,
            source,
        })?;
    info!(addr = %listen, "exporter listening");

    let shutdown = state.shutdown.clone();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("exporter stopped");
    Ok(())
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "cannot listen for Ctrl-C");
                return;
            }
        }
        () = terminate => {}
    }

    info!("shutdown signal received");
    shutdown.cancel();
}

/// Re-read the config file on SIGHUP and apply a changed cache TTL.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    source: Arc<SnapshotSource>,
    config_path: Option<std::path::PathBuf>,
    overrides: ServeArgs,
    shutdown: CancellationToken,
) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGHUP, config reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                }
            }

            match config::reload_exporter(config_path.as_deref(), &overrides) {
                Ok(settings) => {
                    let ttl = settings.cache_ttl();
                    if ttl == source.ttl() {
                        info!("config reloaded, cache TTL unchanged");
                    } else {
                        source.set_ttl(ttl);
                    }
                }
                Err(e) => warn!(error = %e, "config reload failed, keeping current settings"),
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(
    _source: Arc<SnapshotSource>,
    _config_path: Option<std::path::PathBuf>,
    _overrides: ServeArgs,
    _shutdown: CancellationToken,
) {
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::metrics::testing::{sample_snapshot, source_with};

    fn test_state() -> AppState {
        let source = source_with(sample_snapshot());
        AppState {
            exporter: Arc::new(Exporter::new(Arc::clone(&source)).unwrap()),
            source,
            scrape_timeout: Duration::from_secs(5),
            shutdown: CancellationToken::new(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text_format() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            prometheus::TEXT_FORMAT
        );
        let text = body_text(response).await;
        assert!(text.contains(r#"unipoll_collector_up{collector="clients"} 1"#));
        assert!(text.contains("unipoll_ap_info"));
    }

    #[tokio::test]
    async fn healthz_does_not_fetch() {
        let state = test_state();
        let source = Arc::clone(&state.source);

        let response = router(state)
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#""status":"ok""#));
        assert!(source.age().is_none());
    }

    #[tokio::test]
    async fn invalidate_drops_the_cached_snapshot() {
        let state = test_state();
        let source = Arc::clone(&state.source);
        source
            .get_cached_data(&CancellationToken::new())
            .await
            .unwrap();
        assert!(source.cached().is_some());

        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/cache/invalidate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(source.cached().is_none());
    }

    #[tokio::test]
    async fn ttl_endpoint_changes_the_ttl() {
        let state = test_state();
        let source = Arc::clone(&state.source);

        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/admin/cache/ttl")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"seconds": 120}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(source.ttl(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn ttl_endpoint_rejects_bad_bodies() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/admin/cache/ttl")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"seconds": "soon"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
