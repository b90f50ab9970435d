use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use table_protocol::{ClientFrame, JoinTableRequest, JoinTableResponse, PlayerAction, RegisterAgentRequest, RegisterAgentResponse, ServerFrame, Stage};
use table_server::net::AppCtx;
use table_server::store::MemStore;
use table_server::table_manager::TableManager;
use table_server::Config;

async fn spawn_test_server() -> Result<(String, String)> {
    let config = Arc::new(Config::for_tests());
    let (table_manager, mut timeouts_rx) = TableManager::new(config.clone());
    let store: Arc<dyn table_server::store::Store> = Arc::new(MemStore::new());
    let table_id = table_manager.create_table(6, 5, 10, 1000);

    {
        let table_manager = table_manager.clone();
        tokio::spawn(async move {
            while let Some(fired) = timeouts_rx.recv().await {
                table_manager.apply_timeout_default(fired).await;
            }
        });
    }

    let ctx = Arc::new(AppCtx { table_manager, store, config });
    let app = table_server::net::build_router(ctx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    Ok((format!("http://{}", addr), table_id))
}

async fn register(base: &str, name: &str) -> Result<RegisterAgentResponse> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/v1/agents"))
        .json(&RegisterAgentRequest { name: name.to_string() })
        .send()
        .await?
        .json::<RegisterAgentResponse>()
        .await?;
    Ok(resp)
}

async fn join(base: &str, table_id: &str, api_key: &str) -> Result<JoinTableResponse> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/v1/tables/{table_id}/join"))
        .bearer_auth(api_key)
        .json(&JoinTableRequest { client_protocol_version: None })
        .send()
        .await?
        .json::<JoinTableResponse>()
        .await?;
    Ok(resp)
}

/// Two agents register, join the same table over REST, connect over the
/// duplex channel, and check/call their way to a completed hand.
#[tokio::test]
async fn heads_up_hand_completes_over_rest_and_ws() -> Result<()> {
    let (base, table_id) = spawn_test_server().await?;

    let alice = register(&base, "alice").await?;
    let bob = register(&base, "bob").await?;

    let alice_join = join(&base, &table_id, &alice.api_key).await?;
    let bob_join = join(&base, &table_id, &bob.api_key).await?;

    let ws_base = base.replacen("http://", "ws://", 1);
    let (alice_ws, _) = tokio_tungstenite::connect_async(format!("{ws_base}{}", alice_join.ws_url)).await?;
    let (bob_ws, _) = tokio_tungstenite::connect_async(format!("{ws_base}{}", bob_join.ws_url)).await?;

    let (mut alice_write, mut alice_read) = alice_ws.split();
    let (mut bob_write, mut bob_read) = bob_ws.split();

    async fn next_state<R>(read: &mut R) -> Option<table_protocol::GameStatePublic>
    where
        R: StreamExt<Item = std::result::Result<tokio_tungstenite::tungstenite::Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let start = tokio::time::Instant::now();
        while start.elapsed() < Duration::from_secs(2) {
            if let Ok(Some(Ok(tokio_tungstenite::tungstenite::Message::Text(txt)))) =
                tokio::time::timeout(Duration::from_millis(300), read.next()).await
            {
                if let Ok(frame) = serde_json::from_str::<ServerFrame>(&txt) {
                    match frame {
                        ServerFrame::GameState { payload, .. } => return Some(payload),
                        ServerFrame::HandComplete { payload } => return Some(payload),
                        _ => continue,
                    }
                }
            } else {
                break;
            }
        }
        None
    }

    // Each client gets its initial personalized snapshot on connect.
    let mut alice_state = next_state(&mut alice_read).await.expect("alice initial state");
    let mut bob_state = next_state(&mut bob_read).await.expect("bob initial state");

    // Every mutation is broadcast to both seats, so both sockets observe
    // the same sequence of snapshots; only the current `to_act` seat needs
    // to actually submit an action.
    let mut guard = 0;
    while alice_state.stage != Stage::Complete && guard < 50 {
        guard += 1;
        if alice_state.to_act == Some(alice_join.seat_id) {
            let turn_token = alice_state.turn_token.clone().expect("turn token while hand is live");
            let frame = ClientFrame::Action { turn_token, kind: PlayerAction::Call };
            alice_write
                .send(tokio_tungstenite::tungstenite::Message::Text(serde_json::to_string(&frame)?))
                .await?;
        } else if bob_state.to_act == Some(bob_join.seat_id) {
            let turn_token = bob_state.turn_token.clone().expect("turn token while hand is live");
            let frame = ClientFrame::Action { turn_token, kind: PlayerAction::Call };
            bob_write
                .send(tokio_tungstenite::tungstenite::Message::Text(serde_json::to_string(&frame)?))
                .await?;
        }

        if let Some(s) = next_state(&mut alice_read).await {
            alice_state = s;
        }
        if let Some(s) = next_state(&mut bob_read).await {
            bob_state = s;
        }
    }

    assert_eq!(alice_state.stage, Stage::Complete, "hand should reach completion");
    let total_stack: u64 = alice_state.seats.iter().map(|s| s.stack).sum();
    assert_eq!(total_stack, 2000, "chips must be conserved across the hand");
    Ok(())
}
