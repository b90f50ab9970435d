//! Route assembly for the headless REST + WS surface (no SPA/static asset
//! serving — there's no browser GUI here).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use super::{http, ws, AppCtx};

pub fn build_router(ctx: Arc<AppCtx>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "ok": true })) }))
        .route("/skill.md", get(http::skill_doc))
        .route("/v1/agents", post(http::register_agent))
        .route("/v1/tables", get(http::list_tables))
        .route("/v1/tables/:table_id/join", post(http::join_table))
        .route("/v1/tables/:table_id/leave", post(http::leave_table))
        .route("/v1/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
