use axum::body::Body;
use axum::http::{Request, StatusCode};
use livepad_core::assets::{Assets, PageOptions};
use livepad_core::protocol::ServerMessage;
use livepad_core::surface::DEFAULT_STYLESHEET_ID;
use livepad_core::{
    BufferKind, Document, EditorOptions, PaneHeights, RenderOp, Session, SurfaceOptions,
};
use livepad_server::{router, spawn_session, SessionHandle, SessionMessage, Update};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tower::ServiceExt;

fn start_session(source_dir: Option<PathBuf>) -> SessionHandle {
    let (session, _ops) = Session::start(
        Document::new(),
        SurfaceOptions::default(),
        PaneHeights::new(300, 200),
    );
    spawn_session(session, source_dir)
}

async fn next_update(updates: &mut Receiver<Update>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("Timed out waiting for an update")
        .expect("Update channel closed")
        .message
}

#[tokio::test]
async fn test_edit_is_broadcast_to_attached_clients() {
    let session = start_session(None);
    let (_snapshot, mut first) = session.attach().await.unwrap();
    let (_snapshot, mut second) = session.attach().await.unwrap();

    session
        .send(SessionMessage::Edit {
            buffer: BufferKind::Html,
            text: "<p>hi</p>".into(),
            origin: None,
        })
        .unwrap();

    for updates in [&mut first, &mut second] {
        assert_eq!(
            next_update(updates).await,
            ServerMessage::Buffer {
                buffer: BufferKind::Html,
                text: "<p>hi</p>".into()
            }
        );
        assert_eq!(
            next_update(updates).await,
            ServerMessage::Render {
                ops: vec![RenderOp::SetBody {
                    markup: "<p>hi</p>".into()
                }]
            }
        );
    }
}

#[tokio::test]
async fn test_late_client_gets_full_snapshot() {
    let session = start_session(None);

    let edits = [
        (BufferKind::Html, "<p>hi</p>"),
        (BufferKind::Css, "p{color:red}"),
        (BufferKind::Js, "document.title='t'"),
        (BufferKind::Js, "console.log(1)"),
    ];
    for (buffer, text) in edits {
        session
            .send(SessionMessage::Edit {
                buffer,
                text: text.into(),
                origin: None,
            })
            .unwrap();
    }

    let (snapshot, _updates) = session.attach().await.unwrap();

    assert_eq!(snapshot.render.body(), "<p>hi</p>");
    assert_eq!(
        snapshot.render.style(DEFAULT_STYLESHEET_ID),
        Some("p{color:red}")
    );
    assert_eq!(snapshot.render.style_count(), 1);
    assert_eq!(
        snapshot.render.scripts(),
        ["document.title='t'", "console.log(1)"]
    );
    assert_eq!(snapshot.buffers[&BufferKind::Js], "console.log(1)");
}

#[tokio::test]
async fn test_updates_follow_snapshot_without_overlap() {
    let session = start_session(None);

    session
        .send(SessionMessage::Edit {
            buffer: BufferKind::Js,
            text: "first()".into(),
            origin: None,
        })
        .unwrap();

    let (snapshot, mut updates) = session.attach().await.unwrap();

    session
        .send(SessionMessage::Edit {
            buffer: BufferKind::Js,
            text: "second()".into(),
            origin: None,
        })
        .unwrap();

    assert_eq!(snapshot.render.scripts(), ["first()"]);
    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Buffer {
            buffer: BufferKind::Js,
            text: "second()".into()
        }
    );
    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Render {
            ops: vec![RenderOp::AppendScript {
                text: "second()".into()
            }]
        }
    );
}

#[tokio::test]
async fn test_splitter_drag_broadcasts_layout() {
    let session = start_session(None);
    let (_snapshot, mut updates) = session.attach().await.unwrap();

    session
        .send(SessionMessage::PointerMove { y: 120 })
        .unwrap();
    session
        .send(SessionMessage::PointerDown {
            y: 100,
            heights: PaneHeights::new(300, 200),
        })
        .unwrap();
    session
        .send(SessionMessage::PointerMove { y: 150 })
        .unwrap();
    session.send(SessionMessage::PointerUp).unwrap();

    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Layout(PaneHeights::new(350, 150))
    );

    let (snapshot, _updates) = session.attach().await.unwrap();
    assert_eq!(snapshot.layout, PaneHeights::new(350, 150));
}

#[tokio::test]
async fn test_source_change_rereads_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("style.css"), "h1 { color: blue }").unwrap();

    let session = start_session(Some(dir.path().to_path_buf()));
    let (_snapshot, mut updates) = session.attach().await.unwrap();

    session
        .send(SessionMessage::SourceChanged(BufferKind::Css))
        .unwrap();

    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Buffer {
            buffer: BufferKind::Css,
            text: "h1 { color: blue }".into()
        }
    );
    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Render {
            ops: vec![RenderOp::SetStyle {
                id: DEFAULT_STYLESHEET_ID.into(),
                text: "h1 { color: blue }".into()
            }]
        }
    );
}

#[tokio::test]
async fn test_out_of_range_drag_keeps_session_alive() {
    let session = start_session(None);
    let (_snapshot, mut updates) = session.attach().await.unwrap();

    session
        .send(SessionMessage::PointerDown {
            y: -10,
            heights: PaneHeights::new(300, 200),
        })
        .unwrap();
    session
        .send(SessionMessage::PointerMove { y: i32::MAX })
        .unwrap();
    session
        .send(SessionMessage::PointerMove { y: i32::MIN })
        .unwrap();
    session
        .send(SessionMessage::PointerMove { y: 40 })
        .unwrap();

    assert_eq!(
        next_update(&mut updates).await,
        ServerMessage::Layout(PaneHeights::new(350, 150))
    );

    let (snapshot, _updates) = session.attach().await.unwrap();
    assert_eq!(snapshot.layout, PaneHeights::new(350, 150));
}

#[tokio::test]
async fn test_edit_origin_is_recorded() {
    let session = start_session(None);
    let (_snapshot, mut updates) = session.attach().await.unwrap();
    let client = session.register_client();

    session
        .send(SessionMessage::Edit {
            buffer: BufferKind::Css,
            text: "p{}".into(),
            origin: Some(client),
        })
        .unwrap();

    let echo = updates.recv().await.unwrap();
    assert!(!echo.is_for(client));
    assert!(echo.is_for(session.register_client()));

    let render = updates.recv().await.unwrap();
    assert!(render.is_for(client));
    assert!(matches!(render.message, ServerMessage::Render { .. }));
}

#[tokio::test]
async fn test_page_is_served_on_plain_get() {
    let session = start_session(None);
    let page = Assets::build_html(&PageOptions {
        editor: EditorOptions::default(),
        layout: PaneHeights::new(300, 200),
    });

    let response = router(session, page)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains(r#"id="live-preview""#));
    assert!(body.contains("const LIVEPAD_CONFIG"));
}
