//! The duplex channel: one agent (or observer) per socket, subscribed to a
//! table's [`crate::broadcast::Hub`] and able to submit actions.
//!
//! Races broadcast receipt against inbound client frames via
//! `tokio::select! { biased; ... }`, backed by a per-seat bounded queue so a
//! seat's own frames are never silently dropped, plus a server-initiated
//! ping/pong liveness check that closes a socket that's stopped responding.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use table_protocol::{ClientFrame, ErrorKind, ServerFrame};
use tokio::time::Instant;

use super::AppCtx;
use crate::error::ApiError;

const SERVER_PING_INTERVAL: Duration = Duration::from_secs(30);
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Either a seated agent (`session`, minted by `/v1/tables/{id}/join`) or an
/// unauthenticated observer watching one table's public snapshots (`table`).
/// Exactly one of the two must be present.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub session: Option<String>,
    pub table: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<Arc<AppCtx>>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    match (query.session, query.table) {
        (Some(session), _) => ws.on_upgrade(move |socket| handle_socket(socket, ctx, session)),
        (None, Some(table_id)) => ws.on_upgrade(move |socket| handle_observer_socket(socket, ctx, table_id)),
        (None, None) => ws
            .on_upgrade(move |mut socket| async move {
                let _ = send_frame(
                    &mut socket,
                    &ApiError::new(ErrorKind::ValidationError, "must provide either ?session= or ?table=").to_frame(),
                )
                .await;
            }),
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> bool {
    match serde_json::to_string(frame) {
        Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
        Err(err) => {
            tracing::error!(?err, "failed to serialize ServerFrame");
            false
        }
    }
}

async fn handle_socket(mut socket: WebSocket, ctx: Arc<AppCtx>, session_token: String) {
    let Some(session) = ctx.table_manager.sessions.resolve(&session_token) else {
        let _ = send_frame(
            &mut socket,
            &ApiError::new(ErrorKind::InvalidSession, "unknown or expired session").to_frame(),
        )
        .await;
        return;
    };
    let Some(handle) = ctx.table_manager.get(&session.table_id) else {
        let _ = send_frame(
            &mut socket,
            &ApiError::new(ErrorKind::TableNotFound, "table no longer exists").to_frame(),
        )
        .await;
        return;
    };

    {
        let table = handle.table.lock().await;
        let initial = table.public_state_for(Some(session.seat_id));
        let _ = send_frame(
            &mut socket,
            &ServerFrame::GameState {
                state_seq: table.state_seq,
                turn_token: table.current_hand.as_ref().and_then(|h| h.turn_token.clone()),
                payload: initial,
            },
        )
        .await;
    }

    let mut seat_rx = handle.hub.subscribe_seat(session.seat_id);
    let mut ping_timer = tokio::time::interval(SERVER_PING_INTERVAL);
    ping_timer.tick().await; // first tick fires immediately; consume it
    let mut last_pong = Instant::now();

    loop {
        tokio::select! {
            biased;

            frame = seat_rx.recv() => {
                match frame {
                    Some(frame) => {
                        if !send_frame(&mut socket, &frame).await {
                            break;
                        }
                    }
                    None => break, // hub dropped us: SLOW_CONSUMER or table teardown
                }
            }

            _ = ping_timer.tick() => {
                if last_pong.elapsed() > SERVER_PING_INTERVAL + PONG_TIMEOUT {
                    tracing::warn!(seat = session.seat_id.0, table = %session.table_id, "pong timeout, closing socket");
                    break;
                }
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_pong = Instant::now();
                        handle_client_text(&ctx, &mut socket, &session_token, &text).await;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    handle.hub.unsubscribe_seat(session.seat_id);
}

/// An observer socket: no session, no actions, just a feed of public
/// snapshots for one table. Built on the hub's lossy `broadcast` channel
/// rather than a seat's guaranteed-delivery queue, so a slow observer is
/// left behind (coalesced to the latest state) instead of disconnected.
async fn handle_observer_socket(mut socket: WebSocket, ctx: Arc<AppCtx>, table_id: String) {
    let Some(handle) = ctx.table_manager.get(&table_id) else {
        let _ = send_frame(
            &mut socket,
            &ApiError::new(ErrorKind::TableNotFound, "table no longer exists").to_frame(),
        )
        .await;
        return;
    };

    {
        let table = handle.table.lock().await;
        let initial = table.public_state_for(None);
        let _ = send_frame(
            &mut socket,
            &ServerFrame::GameState {
                state_seq: table.state_seq,
                turn_token: None,
                payload: initial,
            },
        )
        .await;
    }

    let mut observer_rx = handle.hub.subscribe_observer();
    let mut ping_timer = tokio::time::interval(SERVER_PING_INTERVAL);
    ping_timer.tick().await;
    let mut last_pong = Instant::now();

    loop {
        tokio::select! {
            biased;

            frame = observer_rx.recv() => {
                match frame {
                    Ok(frame) => {
                        if !send_frame(&mut socket, &frame).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }

            _ = ping_timer.tick() => {
                if last_pong.elapsed() > SERVER_PING_INTERVAL + PONG_TIMEOUT {
                    tracing::warn!(table = %table_id, "observer pong timeout, closing socket");
                    break;
                }
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_pong = Instant::now();
                        if let Ok(ClientFrame::Ping) = serde_json::from_str::<ClientFrame>(&text) {
                            let _ = send_frame(&mut socket, &ServerFrame::Pong).await;
                        } else {
                            let _ = send_frame(
                                &mut socket,
                                &ApiError::new(ErrorKind::Unauthorized, "observers cannot submit actions").to_frame(),
                            )
                            .await;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}

async fn handle_client_text(ctx: &Arc<AppCtx>, socket: &mut WebSocket, session_token: &str, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(err) => {
            let _ = send_frame(
                socket,
                &ApiError::new(ErrorKind::ValidationError, format!("malformed frame: {err}")).to_frame(),
            )
            .await;
            return;
        }
    };

    match frame {
        ClientFrame::Ping => {
            let _ = send_frame(socket, &ServerFrame::Pong).await;
        }
        ClientFrame::Action { turn_token, kind } => {
            match ctx.table_manager.apply_action(session_token, &turn_token, kind).await {
                Ok(state) => {
                    let _ = send_frame(
                        socket,
                        &ServerFrame::GameState {
                            state_seq: state.state_seq,
                            turn_token: state.turn_token.clone(),
                            payload: state,
                        },
                    )
                    .await;
                }
                Err(kind) => {
                    let _ = send_frame(socket, &ApiError::new(kind, kind.code()).to_frame()).await;
                }
            }
        }
    }
}
