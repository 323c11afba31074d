use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tower_http::services::ServeDir;

use hyperparam_report::{ReportConfig, ReportKind};

#[derive(Clone)]
struct AppState {
    config: Arc<ReportConfig>,
}

pub async fn serve(args: crate::ServeArgs, config: ReportConfig) -> Result<(), String> {
    let logs_service = ServeDir::new(config.logs.root.clone());
    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/log_viewer/:report", get(report_handler))
        .nest_service("/logs", logs_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    let reports: Vec<&str> = ReportKind::ALL.iter().map(|kind| kind.name()).collect();
    tracing::info!(%addr, ?reports, "serving log viewer");

    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn report_handler(
    State(state): State<AppState>,
    Path(report): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = ReportKind::from_name(&report)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown report: {}", report)))?;

    let config = state.config.clone();
    let result = tokio::task::spawn_blocking(move || kind.run(&query, &config))
        .await
        .map_err(|err| {
            tracing::error!(report = kind.name(), error = %err, "report task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "error".to_string())
        })?;

    match result {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)),
        Err(err) => {
            tracing::error!(report = kind.name(), error = %err, "report failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "error".to_string()))
        }
    }
}
