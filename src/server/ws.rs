use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::audio::AudioPayload;
use crate::session::{ClientEvent, ServerEvent, Session};

/// GET /ws — upgrade to the per-connection event protocol.
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One invocation per connection; owns the session for its whole lifetime.
///
/// Outbound events flow through an unbounded channel into a writer task so
/// pipeline runs can emit without holding the socket; inbound events are
/// dispatched to the session in arrival order.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = format!("session-{}", uuid::Uuid::new_v4());
    info!("Connection opened: {}", session_id);
    state.active_sessions.fetch_add(1, Ordering::SeqCst);

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer_session_id = session_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("{}: failed to serialize event: {}", writer_session_id, e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                debug!("{}: socket closed while writing", writer_session_id);
                break;
            }
        }
    });

    let mut session = Session::new(session_id.clone(), state.shared.clone(), events_tx);

    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => dispatch(&mut session, event).await,
                Err(e) => {
                    // Malformed envelopes are reported but never fatal
                    warn!("{}: unparseable event: {}", session_id, e);
                    session.emit_error(format!("unrecognized event: {}", e));
                }
            },
            Ok(Message::Binary(bytes)) => {
                // Binary frames are raw little-endian PCM
                session.audio_frame(AudioPayload::Bytes(bytes));
            }
            Ok(Message::Close(_)) => {
                debug!("{}: close frame received", session_id);
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                debug!("{}: socket error: {}", session_id, e);
                break;
            }
        }
    }

    session.disconnect();
    state.active_sessions.fetch_sub(1, Ordering::SeqCst);
    writer.abort();
    info!("Connection closed: {}", session_id);
}

async fn dispatch(session: &mut Session, event: ClientEvent) {
    match event {
        ClientEvent::StartTranscription => session.start().await,
        ClientEvent::SetLanguages {
            speech_language,
            translation_from,
            translation_to,
        } => session.set_languages(speech_language, translation_from, translation_to),
        ClientEvent::SetSttProvider { provider } => session.set_provider(provider),
        ClientEvent::SetPunctuationPreferences { enabled, style } => {
            session.set_punctuation(enabled, style)
        }
        ClientEvent::AudioData { frame } => session.audio_frame(frame.into()),
        ClientEvent::StopTranscription => session.stop().await,
    }
}
