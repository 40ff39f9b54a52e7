use futures::{SinkExt, StreamExt};
use livepad_core::protocol::ServerMessage;
use livepad_core::{BufferKind, Document, PaneHeights, RenderOp, Session, SurfaceOptions};
use livepad_server::{router, spawn_session, SessionHandle, SessionMessage};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (SessionHandle, SocketAddr) {
    let (session, _ops) = Session::start(
        Document::new(),
        SurfaceOptions::default(),
        PaneHeights::new(300, 200),
    );
    let session = spawn_session(session, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(session.clone(), String::new());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (session, addr)
}

/// Connects and waits for the initial snapshot, so the client is attached.
async fn connect(addr: SocketAddr) -> (Client, ServerMessage) {
    let (mut client, _response) = connect_async(format!("ws://{addr}/")).await.unwrap();
    let snapshot = recv(&mut client).await;
    assert!(matches!(snapshot, ServerMessage::Snapshot { .. }));
    (client, snapshot)
}

async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send(client: &mut Client, value: serde_json::Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

fn render_body(markup: &str) -> ServerMessage {
    ServerMessage::Render {
        ops: vec![RenderOp::SetBody {
            markup: markup.into(),
        }],
    }
}

#[tokio::test]
async fn test_malformed_message_is_ignored() {
    let (_session, addr) = start_server().await;
    let (mut editor, _snapshot) = connect(addr).await;
    let (mut viewer, _snapshot) = connect(addr).await;

    editor
        .send(Message::Text("not json".into()))
        .await
        .unwrap();
    send(&mut editor, json!({ "type": "explode" })).await;
    send(
        &mut editor,
        json!({ "type": "edit", "buffer": "html", "text": "<p>ok</p>" }),
    )
    .await;

    assert_eq!(
        recv(&mut viewer).await,
        ServerMessage::Buffer {
            buffer: BufferKind::Html,
            text: "<p>ok</p>".into()
        }
    );
    assert_eq!(recv(&mut viewer).await, render_body("<p>ok</p>"));

    // The editing tab gets the render ops without its own text echoed back.
    assert_eq!(recv(&mut editor).await, render_body("<p>ok</p>"));
}

#[tokio::test]
async fn test_request_snapshot_returns_current_state() {
    let (_session, addr) = start_server().await;
    let (mut client, _snapshot) = connect(addr).await;

    send(
        &mut client,
        json!({ "type": "edit", "buffer": "css", "text": "p{color:red}" }),
    )
    .await;
    assert!(matches!(
        recv(&mut client).await,
        ServerMessage::Render { .. }
    ));

    send(&mut client, json!({ "type": "request_snapshot" })).await;

    match recv(&mut client).await {
        ServerMessage::Snapshot {
            ops,
            buffers,
            layout,
        } => {
            assert_eq!(buffers[&BufferKind::Css], "p{color:red}");
            assert!(ops.contains(&RenderOp::SetStyle {
                id: "live-preview-style".into(),
                text: "p{color:red}".into()
            }));
            assert_eq!(layout, PaneHeights::new(300, 200));
        }
        msg => panic!("expected a snapshot, got {msg:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_ends_only_that_client() {
    let (session, addr) = start_server().await;
    let (mut leaving, _snapshot) = connect(addr).await;
    let (mut staying, _snapshot) = connect(addr).await;

    leaving.close(None).await.unwrap();
    drop(leaving);

    session
        .send(SessionMessage::Edit {
            buffer: BufferKind::Html,
            text: "<p>still here</p>".into(),
            origin: None,
        })
        .unwrap();

    assert_eq!(
        recv(&mut staying).await,
        ServerMessage::Buffer {
            buffer: BufferKind::Html,
            text: "<p>still here</p>".into()
        }
    );
    assert_eq!(recv(&mut staying).await, render_body("<p>still here</p>"));

    let (_late, snapshot) = connect(addr).await;
    match snapshot {
        ServerMessage::Snapshot { buffers, .. } => {
            assert_eq!(buffers[&BufferKind::Html], "<p>still here</p>");
        }
        msg => panic!("expected a snapshot, got {msg:?}"),
    }
}

#[tokio::test]
async fn test_drag_over_socket_is_broadcast() {
    let (_session, addr) = start_server().await;
    let (mut dragging, _snapshot) = connect(addr).await;
    let (mut watching, _snapshot) = connect(addr).await;

    send(
        &mut dragging,
        json!({ "type": "pointer_down", "y": 100, "code_height": 300, "preview_height": 200 }),
    )
    .await;
    send(&mut dragging, json!({ "type": "pointer_move", "y": 2147483647 })).await;
    send(&mut dragging, json!({ "type": "pointer_move", "y": 150 })).await;
    send(&mut dragging, json!({ "type": "pointer_up" })).await;

    for client in [&mut dragging, &mut watching] {
        assert_eq!(
            recv(client).await,
            ServerMessage::Layout(PaneHeights::new(350, 150))
        );
    }
}
