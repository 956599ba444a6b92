//! Hub service: websocket client registry and fan-out.
//!
//! DESIGN
//! ======
//! Each connection owns a bounded `mpsc` receiver; the hub keeps the sender.
//! Broadcasts are best-effort: a client whose channel is full simply misses
//! the frame. There is no replay, so late joiners fetch a snapshot with
//! `disruption:list` instead.

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::frame::Frame;
use crate::state::AppState;

/// Per-connection outbound queue depth.
pub const CLIENT_CHANNEL_CAPACITY: usize = 256;

/// Register a connection and return the receiver its socket loop drains.
pub async fn register(state: &AppState, client_id: Uuid) -> mpsc::Receiver<Frame> {
    let (tx, rx) = mpsc::channel(CLIENT_CHANNEL_CAPACITY);
    state.clients.write().await.insert(client_id, tx);
    rx
}

pub async fn unregister(state: &AppState, client_id: Uuid) {
    state.clients.write().await.remove(&client_id);
}

pub async fn is_registered(state: &AppState, client_id: Uuid) -> bool {
    state.clients.read().await.contains_key(&client_id)
}

/// Queue a frame for one client. Returns false when the client is gone or
/// its channel is full.
pub async fn send_to(state: &AppState, client_id: Uuid, frame: Frame) -> bool {
    let clients = state.clients.read().await;
    let Some(tx) = clients.get(&client_id) else {
        return false;
    };
    tx.try_send(frame).is_ok()
}

pub async fn client_count(state: &AppState) -> usize {
    state.clients.read().await.len()
}

/// Send a frame to every connected client, optionally skipping one.
/// Returns how many clients accepted the frame.
pub async fn broadcast(state: &AppState, frame: &Frame, exclude: Option<Uuid>) -> usize {
    let clients = state.clients.read().await;
    let mut delivered = 0;

    for (client_id, tx) in clients.iter() {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full or closed, skip it.
        if tx.try_send(frame.clone()).is_ok() {
            delivered += 1;
        } else {
            debug!(%client_id, syscall = %frame.syscall, "hub: dropped frame for slow client");
        }
    }

    delivered
}

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;
