pub mod session;

pub use session::{spawn_session, Attachment, ClientId, SessionHandle, SessionMessage, Update};

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use livepad_core::protocol::{ClientMessage, ProtocolError, ServerMessage};
use livepad_core::PaneHeights;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("the preview session has ended")]
    SessionClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Clone)]
struct AppState {
    session: SessionHandle,
    page: Arc<str>,
}

/// The handler for the HTTP request (this gets called when the HTTP GET lands at the start
/// of websocket negotiation). After this completes, the actual switching from HTTP to
/// websocket protocol will occur. A plain GET gets the playground page.
async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    if let Some(ws) = ws {
        ws.on_upgrade(|ws| async move { handle_websocket(ws, state.session).await })
    } else {
        (StatusCode::OK, Html(state.page.to_string())).into_response()
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), ServerError> {
    let text = msg.to_json()?;
    socket
        .send(WsMessage::Text(text))
        .await
        .map_err(|_| ServerError::SessionClosed)
}

/// Attaches a client and sends it the snapshot it starts from.
async fn attach(
    socket: &mut WebSocket,
    session: &SessionHandle,
) -> Result<tokio::sync::broadcast::Receiver<Update>, ServerError> {
    let (snapshot, updates) = session.attach().await?;
    send_message(socket, &ServerMessage::from(snapshot)).await?;
    Ok(updates)
}

fn to_session_message(msg: ClientMessage, client: ClientId) -> Option<SessionMessage> {
    let msg = match msg {
        ClientMessage::Edit { buffer, text } => SessionMessage::Edit {
            buffer,
            text,
            origin: Some(client),
        },
        ClientMessage::PointerDown {
            y,
            code_height,
            preview_height,
        } => SessionMessage::PointerDown {
            y,
            heights: PaneHeights::new(code_height, preview_height),
        },
        ClientMessage::PointerMove { y } => SessionMessage::PointerMove { y },
        ClientMessage::PointerUp => SessionMessage::PointerUp,
        ClientMessage::RequestSnapshot => return None,
    };
    Some(msg)
}

async fn handle_websocket(mut socket: WebSocket, session: SessionHandle) {
    let client = session.register_client();

    let Ok(mut updates) = attach(&mut socket, &session).await else {
        return;
    };

    tracing::debug!(client, "Client attached");

    loop {
        tokio::select! {
            update = updates.recv() => {
                let resync = match update {
                    Ok(update) if !update.is_for(client) => false,
                    Ok(update) => {
                        if send_message(&mut socket, &update.message).await.is_err() {
                            break;
                        }
                        false
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(client, skipped, "Client fell behind, resynchronizing");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };

                if resync {
                    match attach(&mut socket, &session).await {
                        Ok(rx) => updates = rx,
                        Err(_) => break,
                    }
                }
            }
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::debug!(?err, "WebSocket error");
                        break;
                    }
                };

                let msg = match ClientMessage::parse(&text) {
                    Ok(msg) => msg,
                    Err(err) => {
                        tracing::warn!(client, ?err, "Ignoring malformed client message");
                        continue;
                    }
                };

                match to_session_message(msg, client) {
                    Some(msg) => {
                        if session.send(msg).is_err() {
                            break;
                        }
                    }
                    None => match attach(&mut socket, &session).await {
                        Ok(rx) => updates = rx,
                        Err(_) => break,
                    },
                }
            }
        }
    }

    let _ = socket.send(WsMessage::Close(None)).await;

    tracing::debug!(client, "Client detached");
}

/// Routes of the playground: the page and the WebSocket endpoint share `/`.
pub fn router(session: SessionHandle, page: String) -> Router {
    let state = AppState {
        session,
        page: page.into(),
    };

    Router::new()
        .route("/", get(ws_handler))
        .layer(Extension(state))
}

/// URL of the playground served on `addr`.
pub fn playground_url(addr: SocketAddr) -> String {
    let host = if addr.ip().is_unspecified() {
        "127.0.0.1".to_string()
    } else {
        addr.ip().to_string()
    };
    format!("http://{host}:{}", addr.port())
}

/// Serves the playground until Ctrl-C.
pub async fn serve(
    listener: tokio::net::TcpListener,
    session: SessionHandle,
    page: String,
    open_browser: bool,
) -> Result<(), ServerError> {
    let app = router(session, page);

    let url = playground_url(listener.local_addr()?);

    if open_browser {
        if let Err(err) = webbrowser::open(&url) {
            tracing::warn!(?err, %url, "Failed to open the browser");
        }
    }

    tracing::debug!("Listening on {listener:?}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepad_core::BufferKind;

    #[test]
    fn test_to_session_message() {
        assert!(matches!(
            to_session_message(
                ClientMessage::PointerDown {
                    y: 100,
                    code_height: 300,
                    preview_height: 200
                },
                7
            ),
            Some(SessionMessage::PointerDown {
                y: 100,
                heights: PaneHeights {
                    code_height: 300,
                    preview_height: 200
                }
            })
        ));
        assert!(matches!(
            to_session_message(
                ClientMessage::Edit {
                    buffer: BufferKind::Html,
                    text: "<p>".into()
                },
                7
            ),
            Some(SessionMessage::Edit {
                buffer: BufferKind::Html,
                origin: Some(7),
                ..
            })
        ));
        assert!(to_session_message(ClientMessage::RequestSnapshot, 7).is_none());
    }

    #[test]
    fn test_update_skips_its_origin() {
        let echo = Update {
            origin: Some(7),
            message: ServerMessage::Buffer {
                buffer: BufferKind::Css,
                text: "p{}".into(),
            },
        };
        assert!(!echo.is_for(7));
        assert!(echo.is_for(8));

        let render = Update {
            origin: None,
            message: ServerMessage::Render { ops: Vec::new() },
        };
        assert!(render.is_for(7));
    }

    #[test]
    fn test_playground_url() {
        assert_eq!(
            playground_url("0.0.0.0:3000".parse().unwrap()),
            "http://127.0.0.1:3000"
        );
        assert_eq!(
            playground_url("127.0.0.1:8080".parse().unwrap()),
            "http://127.0.0.1:8080"
        );
    }
}
