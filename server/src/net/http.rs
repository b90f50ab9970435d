//! REST handlers: agent registration, table join/leave, table listing, and
//! the static skill document. Each handler reuses the same state-mutation
//! helpers the duplex channel calls, and returns a typed `ApiError`/
//! `ApiResult` so both transports report errors in the same shape.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use table_protocol::{
    AgentId, ErrorKind, JoinTableRequest, JoinTableResponse, RegisterAgentRequest,
    RegisterAgentResponse, TableStatus, TableSummary, CURRENT_PROTOCOL_VERSION,
    MIN_SUPPORTED_PROTOCOL_VERSION,
};

use crate::error::{ApiError, ApiResult};
use crate::net::AppCtx;
use crate::store::{AgentRecord, Store};
use crate::token;

fn bearer_api_key(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| ApiError::new(ErrorKind::Unauthorized, "missing bearer api key"))
}

pub async fn register_agent(
    State(ctx): State<Arc<AppCtx>>,
    Json(req): Json<RegisterAgentRequest>,
) -> ApiResult<Json<RegisterAgentResponse>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::new(ErrorKind::ValidationError, "name must not be empty"));
    }
    let agent_id = AgentId(token::generate(12));
    let api_key = token::generate(24);
    ctx.store.create_agent(AgentRecord {
        agent_id: agent_id.clone(),
        api_key: api_key.clone(),
        name: req.name,
    });
    Ok(Json(RegisterAgentResponse { agent_id, api_key }))
}

fn authenticate(ctx: &AppCtx, headers: &HeaderMap) -> ApiResult<AgentId> {
    let api_key = bearer_api_key(headers)?;
    ctx.store
        .get_agent_by_api_key(&api_key)
        .map(|record| record.agent_id)
        .ok_or_else(|| ApiError::new(ErrorKind::InvalidApiKey, "unknown api key"))
}

pub async fn join_table(
    State(ctx): State<Arc<AppCtx>>,
    Path(table_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<JoinTableRequest>,
) -> ApiResult<Json<JoinTableResponse>> {
    if let Some(client_version) = req.client_protocol_version {
        if client_version < MIN_SUPPORTED_PROTOCOL_VERSION {
            return Err(ApiError::new(
                ErrorKind::OutdatedClient,
                format!("client protocol version {client_version} is below the minimum supported {MIN_SUPPORTED_PROTOCOL_VERSION}"),
            ));
        }
    }
    let agent_id = authenticate(&ctx, &headers)?;
    let (seat_id, session_token, _state) = ctx
        .table_manager
        .join(&table_id, agent_id)
        .await
        .map_err(|k| ApiError::new(k, "failed to join table"))?;

    Ok(Json(JoinTableResponse {
        seat_id,
        session_token: session_token.clone(),
        ws_url: format!("/v1/ws?session={session_token}"),
        protocol_version: CURRENT_PROTOCOL_VERSION,
        min_supported_protocol_version: MIN_SUPPORTED_PROTOCOL_VERSION,
        skill_doc_url: "/skill.md".to_string(),
        action_timeout_ms: ctx.config.default_action_timeout_ms,
    }))
}

#[derive(serde::Deserialize)]
pub struct LeaveRequest {
    pub session_token: String,
}

pub async fn leave_table(
    State(ctx): State<Arc<AppCtx>>,
    Path(_table_id): Path<String>,
    Json(req): Json<LeaveRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.table_manager
        .leave(&req.session_token)
        .await
        .map_err(|k| ApiError::new(k, "failed to leave table"))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(serde::Deserialize)]
pub struct ListTablesQuery {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> ApiResult<TableStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "waiting" => Ok(TableStatus::Waiting),
        "running" => Ok(TableStatus::Running),
        "ended" => Ok(TableStatus::Ended),
        other => Err(ApiError::new(
            ErrorKind::ValidationError,
            format!("unknown status filter: {other}"),
        )),
    }
}

pub async fn list_tables(
    State(ctx): State<Arc<AppCtx>>,
    Query(query): Query<ListTablesQuery>,
) -> ApiResult<Json<Vec<TableSummary>>> {
    let tables = ctx.table_manager.list_tables();
    let filtered = match query.status {
        Some(raw) => {
            let status = parse_status(&raw)?;
            tables.into_iter().filter(|t| t.status == status).collect()
        }
        None => tables,
    };
    Ok(Json(filtered))
}

pub const SKILL_DOC_TEMPLATE: &str = include_str!("../../skill.md");

pub async fn skill_doc(State(ctx): State<Arc<AppCtx>>) -> impl axum::response::IntoResponse {
    let base_url = format!("http://{}", ctx.config.bind_addr);
    let ws_url = format!("ws://{}/v1/ws", ctx.config.bind_addr);
    let doc = SKILL_DOC_TEMPLATE
        .replace("{{BASE_URL}}", &base_url)
        .replace("{{WS_URL}}", &ws_url);
    ([("content-type", "text/markdown")], doc)
}
