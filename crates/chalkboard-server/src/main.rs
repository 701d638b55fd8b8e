//! Chalkboard WebSocket Relay Server
//!
//! Keeps the board history and relays drawing and presence messages between
//! everyone connected to the single shared board.
//!
//! ## Protocol
//!
//! Clients connect to `/ws/{client_id}?username=...` and exchange JSON frames:
//! ```json
//! { "type": "draw", "tool": "pencil", "color": "#000000", "size": 4, "fromX": 0, "fromY": 0, "toX": 5, "toY": 5, "eraser": false }
//! { "type": "clear" }
//! { "type": "ping" }
//! ```
//! The server answers with `history` on connect, relays `draw`/`clear`, and
//! announces `user_joined`, `user_left` and `user_count`.

mod history;
mod state;

use axum::{
    Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use chalkboard_core::protocol::{ClientMessage, ServerMessage};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use state::BoardState;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Server command line arguments.
#[derive(Parser, Debug)]
#[command(name = "chalkboard-server")]
#[command(about = "Relay and history server for a shared Chalkboard")]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "CHALKBOARD_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Number of draw events kept for late joiners
    #[arg(long, env = "CHALKBOARD_HISTORY_LIMIT", default_value_t = history::DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chalkboard_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let state = Arc::new(BoardState::new(args.history_limit));

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws/{client_id}", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("Chalkboard relay server listening on {}", args.bind);
    info!("WebSocket endpoint: ws://{}/ws/{{client_id}}?username=...", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Index page
async fn index() -> &'static str {
    "Chalkboard Relay Server - Connect via WebSocket at /ws/{client_id}?username=..."
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    username: Option<String>,
}

/// Username from the query, or `User-` and the first four characters of the id.
fn resolve_username(client_id: &str, requested: Option<String>) -> String {
    match requested {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("User-{}", client_id.chars().take(4).collect::<String>()),
    }
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<BoardState>>,
) -> impl IntoResponse {
    let username = resolve_username(&client_id, params.username);
    ws.on_upgrade(move |socket| handle_socket(socket, state, client_id, username))
}

fn encode(msg: &ServerMessage) -> Option<Message> {
    match msg.to_frame() {
        Ok(frame) => Some(Message::Text(frame.into())),
        Err(e) => {
            warn!("Failed to encode message: {}", e);
            None
        }
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<BoardState>, client_id: String, username: String) {
    info!("New connection: {} ({})", client_id, username);

    let (mut sender, mut receiver) = socket.split();
    let mut joined = state.join(&client_id, &username);

    // History first, then the count.
    let greeting = [
        joined.history.clone(),
        ServerMessage::UserCount { count: joined.user_count },
    ];
    for msg in &greeting {
        let Some(frame) = encode(msg) else { continue };
        if sender.send(frame).await.is_err() {
            state.leave(&client_id, joined.connection);
            return;
        }
    }

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match ClientMessage::from_frame(text.as_str()) {
                            Ok(Some(ClientMessage::Draw(event))) => state.draw(&client_id, event),
                            Ok(Some(ClientMessage::Clear)) => {
                                info!("Board cleared by {}", username);
                                state.clear(&client_id);
                            }
                            Ok(Some(ClientMessage::Ping)) => {
                                if let Some(frame) = encode(&ServerMessage::Pong) {
                                    if sender.send(frame).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Ok(Some(ClientMessage::Unknown)) | Ok(None) => {
                                debug!("Ignoring unknown message from {}", client_id);
                            }
                            Err(e) => warn!("Invalid message from {}: {}", client_id, e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore binary/ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", client_id, e);
                        break;
                    }
                }
            }

            // Relay board traffic from everyone else
            msg = joined.rx.recv() => {
                match msg {
                    Ok((from, server_msg)) => {
                        // Don't echo back to sender
                        if from == client_id {
                            continue;
                        }
                        let Some(frame) = encode(&server_msg) else { continue };
                        if sender.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Dropping the socket makes the client reconnect and replay history.
                        warn!("{} fell behind by {} messages, disconnecting", client_id, missed);
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    // Cleanup on disconnect
    state.leave(&client_id, joined.connection);
    info!(
        "Connection closed: {} ({}), {} still connected",
        client_id,
        username,
        state.user_count()
    );
}
