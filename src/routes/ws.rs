//! WebSocket handler: live feed push plus request/response frames.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers with the hub, and enters a
//! `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Hub frames (`disruption:update`, `agent:activity`) → forward to client
//! - Search debounce deadline → run the held `search:query`
//!
//! `chat:send` replies wait out a typing delay in a spawned task and come
//! back through the hub channel, so the loop keeps serving other frames.
//!
//! Handler functions are pure business logic. They validate input and
//! return an `Outcome`. The dispatch layer owns all outbound concerns.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends frames → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply now, hold until the debounce fires,
//!    or answer later through the hub)
//! 4. Close → unregister, drop rate-limit and chat state

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame, Status};
use crate::services::search::{self, Filters, Page, SearchQuery};
use crate::services::{chatbot, feed, hub};
use crate::state::AppState;

/// Records returned by `disruption:list` when no limit is given.
const DEFAULT_LIST_LIMIT: usize = 50;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide what the sender receives and when.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Hold the request; the connection loop answers once the debounce
    /// window passes without a newer search.
    Debounce(PendingSearch),
    /// Answer the chat message once its typing delay has passed.
    Chat(chatbot::PendingChat),
}

/// A validated `search:query` waiting out the debounce window.
struct PendingSearch {
    req: Frame,
    filters: Filters,
    page: Page,
    deadline: Instant,
}

/// Per-connection state threaded through dispatch.
struct Connection {
    client_id: Uuid,
    pending_search: Option<PendingSearch>,
}

impl Connection {
    fn new(client_id: Uuid) -> Self {
        Self { client_id, pending_search: None }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut client_rx = hub::register(&state, client_id).await;

    let welcome = Frame::request("session:connected", Data::new())
        .with_data("client_id", client_id.to_string())
        .with_data("greeting", chatbot::GREETING)
        .with_data("quick_prompts", serde_json::json!(chatbot::QUICK_PROMPTS));
    if send_frame(&mut socket, &welcome).await.is_err() {
        hub::unregister(&state, client_id).await;
        return;
    }

    info!(%client_id, "ws: client connected");

    let mut conn = Connection::new(client_id);

    loop {
        let deadline = conn.pending_search.as_ref().map(|p| p.deadline);
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let frames = process_inbound_text(&state, &mut conn, text.as_str()).await;
                        for frame in frames {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(frame) = run_pending_search(&state, &mut conn).await {
                    if send_frame(&mut socket, &frame).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    hub::unregister(&state, client_id).await;
    state.rate_limiter.forget(client_id);
    state.chats.write().await.remove(client_id);
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// Transport concerns stay in `run_ws` so tests can drive dispatch directly.
async fn process_inbound_text(state: &AppState, conn: &mut Connection, text: &str) -> Vec<Frame> {
    let client_id = conn.client_id;
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let prefix = req.prefix();
    let result = match prefix {
        "disruption" => handle_disruption(state, &req).await,
        "search" => handle_search(state, &req),
        "chat" => handle_chat(state, client_id, &req),
        "feed" => handle_feed(state, &req).await,
        _ => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Debounce(pending)) => {
            // A newer query supersedes the held one; close it out so the
            // client never waits on a reply that will not come.
            match conn.pending_search.replace(pending) {
                Some(old) => vec![old.req.done_with(Data::new()).with_data("superseded", true)],
                None => vec![],
            }
        }
        Ok(Outcome::Chat(pending)) => {
            if pending.delay.is_zero() {
                let reply = chatbot::answer(state, pending).await;
                return vec![req.done_with(to_data(&reply))];
            }
            spawn_chat_reply(state.clone(), client_id, req, pending);
            vec![]
        }
        Err(err_frame) => vec![err_frame],
    }
}

/// Sleep through the typing delay off the connection loop, then queue the
/// reply on the client's hub channel. Skipped if the client left meanwhile.
fn spawn_chat_reply(state: AppState, client_id: Uuid, req: Frame, pending: chatbot::PendingChat) {
    tokio::spawn(async move {
        tokio::time::sleep(pending.delay).await;
        if !hub::is_registered(&state, client_id).await {
            return;
        }
        let reply = chatbot::answer(&state, pending).await;
        if !hub::send_to(&state, client_id, req.done_with(to_data(&reply))).await {
            debug!(%client_id, "ws: chat reply dropped");
        }
    });
}

/// Answer the held search, if any. Reads the feed at fire time so the
/// results reflect records that arrived during the debounce window.
async fn run_pending_search(state: &AppState, conn: &mut Connection) -> Option<Frame> {
    let pending = conn.pending_search.take()?;
    let records = state.feed.read().await.snapshot();
    let results = search::search(&records, &pending.filters, pending.page);
    Some(pending.req.done_with(to_data(&results)))
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_disruption(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "list" => {
            let limit = req
                .data
                .get("limit")
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_LIST_LIMIT);
            let (disruptions, total) = {
                let feed = state.feed.read().await;
                let records = feed.snapshot();
                let total = records.len();
                (records.into_iter().take(limit).collect::<Vec<_>>(), total)
            };
            let mut data = Data::new();
            data.insert("total".into(), serde_json::json!(total));
            data.insert("disruptions".into(), serde_json::to_value(&disruptions).unwrap_or_default());
            Ok(Outcome::Reply(data))
        }
        "get" => {
            let Some(id) = req.data.get("id").and_then(|v| v.as_str()) else {
                return Err(req.error("id required"));
            };
            match feed::find(state, id).await {
                Ok(disruption) => {
                    let mut data = Data::new();
                    data.insert("disruption".into(), serde_json::to_value(&disruption).unwrap_or_default());
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        op => Err(req.error(format!("unknown disruption op: {op}"))),
    }
}

fn handle_search(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "query" => {
            let parsed = SearchQuery::from_data(&req.data).and_then(|q| q.parse());
            match parsed {
                Ok((filters, page)) => Ok(Outcome::Debounce(PendingSearch {
                    req: req.clone(),
                    filters,
                    page,
                    deadline: Instant::now() + state.config.search_debounce,
                })),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        op => Err(req.error(format!("unknown search op: {op}"))),
    }
}

fn handle_chat(state: &AppState, client_id: Uuid, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "send" => {
            let message = req.data.get("message").and_then(|v| v.as_str()).unwrap_or_default();
            chatbot::prepare(state, client_id, message)
                .map(Outcome::Chat)
                .map_err(|e| req.error_from(&e))
        }
        op => Err(req.error(format!("unknown chat op: {op}"))),
    }
}

async fn handle_feed(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "status" => {
            let (records, capacity, latest) = {
                let feed = state.feed.read().await;
                let latest = feed.latest().map(|d| (d.id.clone(), d.timestamp));
                (feed.len(), feed.capacity(), latest)
            };
            let (latest_id, latest_at) = latest.unzip();
            let mut data = Data::new();
            data.insert("records".into(), serde_json::json!(records));
            data.insert("capacity".into(), serde_json::json!(capacity));
            data.insert("latest_id".into(), serde_json::json!(latest_id));
            data.insert("latest_at".into(), serde_json::json!(latest_at));
            data.insert("clients".into(), serde_json::json!(hub::client_count(state).await));
            data.insert("upstream".into(), serde_json::json!(*state.upstream.read().await));
            data.insert("active_alerts".into(), serde_json::json!(state.alerts.read().await.active_count()));
            Ok(Outcome::Reply(data))
        }
        op => Err(req.error(format!("unknown feed op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Flatten a serializable struct into frame data.
fn to_data<T: Serialize>(value: &T) -> Data {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => Data::new(),
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let message = frame
            .data
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else if frame.parent_id.is_some() {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
