//! Live progress: one SSE stream per session and a `/ws` socket that
//! subscribes to one session at a time.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use devduel_core::events::ProgressEvent;
use futures::{
    stream::{self, Stream},
    SinkExt, StreamExt,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::SharedState;

const HEARTBEAT: Duration = Duration::from_secs(15);

/// SSE stream of one session's progress with a heartbeat comment
#[utoipa::path(
    get,
    path = "/api/v1/duel/{id}/events",
    tag = "duel",
    params(("id" = String, Path, description = "Duel session id")),
    responses(
        (status = 200, description = "text/event-stream of progress events")
    )
)]
pub async fn duel_events(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    // The stream ends after the event that carries a terminal stage
    let stream = stream::unfold((rx, id, false), |(mut rx, id, finished)| async move {
        if finished {
            return None;
        }
        loop {
            match tokio::time::timeout(HEARTBEAT, rx.recv()).await {
                Ok(Ok(event)) if event.is_for(&id) => {
                    let done = event.stage.is_terminal();
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    return Some((Ok(Event::default().data(json)), (rx, id, done)));
                }
                Ok(Ok(_)) => continue,
                Ok(Err(RecvError::Lagged(skipped))) => {
                    tracing::warn!(duel_id = %id, "SSE subscriber lagged, {} events skipped", skipped);
                    continue;
                }
                Ok(Err(RecvError::Closed)) => return None,
                Err(_) => {
                    return Some((Ok(Event::default().comment("heartbeat")), (rx, id, false)));
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Inbound socket frames
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Subscribe {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Outbound socket frames
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ServerMessage<'a> {
    Subscribed {
        #[serde(rename = "sessionId")]
        session_id: &'a str,
    },
    Progress {
        #[serde(flatten)]
        event: &'a ProgressEvent,
    },
    Error {
        message: String,
    },
}

impl ServerMessage<'_> {
    fn to_message(&self) -> Message {
        Message::Text(serde_json::to_string(self).unwrap_or_default())
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<ProgressEvent>) {
    let (mut sender, mut receiver) = socket.split();
    // A later subscribe replaces the earlier one
    let mut subscription: Option<String> = None;

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => continue,
                };
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Subscribe { session_id }) => {
                        tracing::debug!(duel_id = %session_id, "WebSocket subscribed");
                        let reply = ServerMessage::Subscribed { session_id: &session_id }.to_message();
                        subscription = Some(session_id);
                        reply
                    }
                    Err(e) => ServerMessage::Error { message: format!("Invalid message: {}", e) }.to_message(),
                };
                if sender.send(reply).await.is_err() {
                    break;
                }
            }
            event = rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("WebSocket subscriber lagged, {} events skipped", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let wanted = subscription.as_deref().is_some_and(|id| event.is_for(id));
                if wanted && sender.send(ServerMessage::Progress { event: &event }.to_message()).await.is_err() {
                    break;
                }
            }
        }
    }
}
