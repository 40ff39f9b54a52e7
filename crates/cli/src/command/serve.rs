use crate::app::Args;
use anyhow::{Context, Result};
use clap::Parser;
use livepad_config::Config;
use livepad_core::assets::{Assets, PageOptions};
use livepad_core::watcher::read_source;
use livepad_core::{
    BufferKind, Document, EditorOptions, PaneHeights, Session, SourceWatcher, SurfaceOptions,
    WatchEvent, WatcherConfig,
};
use livepad_server::{SessionHandle, SessionMessage};
use std::path::{Path, PathBuf};

/// Starts the playground server.
#[derive(Parser, Debug, Clone)]
pub struct Serve {
    /// Port to listen on, `0` picks a free one.
    #[clap(long)]
    pub port: Option<u16>,

    /// Address to bind.
    #[clap(long)]
    pub host: Option<String>,

    /// Directory holding index.html, style.css and script.js to seed and follow the buffers.
    #[clap(long)]
    pub watch: Option<PathBuf>,

    /// Do not open the playground in the browser.
    #[clap(long)]
    pub no_browser: bool,
}

fn surface_options(config: &Config) -> SurfaceOptions {
    SurfaceOptions {
        stylesheet_id: config.preview.stylesheet_id.clone(),
        polyfill_url: config.preview.polyfill_url().map(ToString::to_string),
    }
}

fn editor_options(config: &Config) -> EditorOptions {
    EditorOptions {
        line_numbers: config.editor.line_numbers,
        auto_close_tags: config.editor.auto_close_tags,
        auto_close_brackets: config.editor.auto_close_brackets,
        theme: config.editor.theme.clone(),
    }
}

fn initial_layout(config: &Config) -> PaneHeights {
    PaneHeights::new(config.layout.code_height, config.layout.preview_height)
}

/// Loads the non-empty source files of `dir` into the buffers.
fn seed_buffers(session: &mut Session<Document>, dir: &Path) -> Result<()> {
    for kind in BufferKind::ALL {
        let text = read_source(dir, kind)
            .with_context(|| format!("failed to read {}", dir.join(kind.file_name()).display()))?;
        if !text.is_empty() {
            session.edit(kind, text);
        }
    }
    Ok(())
}

/// Forwards the file changes to the session, keeping the watcher alive meanwhile.
fn spawn_source_forwarder(dir: &Path, session: SessionHandle) -> Result<()> {
    let (watcher, mut events) = SourceWatcher::new(dir, WatcherConfig::default())?;

    tokio::spawn(async move {
        let _watcher = watcher;
        while let Some(event) = events.recv().await {
            match event {
                WatchEvent::Changed(kind) => {
                    if session.send(SessionMessage::SourceChanged(kind)).is_err() {
                        break;
                    }
                }
                WatchEvent::Error(err) => tracing::warn!(%err, "Source watcher error"),
            }
        }
    });

    Ok(())
}

impl Serve {
    pub async fn run(&self, args: Args) -> Result<()> {
        let (config, config_err) = livepad_config::load_config_on_startup(args.config_file);

        let _guard = crate::logging::init(args.log, &config.log)?;

        if let Some(err) = config_err {
            tracing::error!(?err, "Invalid config file, falling back to the defaults");
            eprintln!("Invalid config file, falling back to the defaults: {err}");
        }

        let (mut session, ops) = Session::start(
            Document::new(),
            surface_options(config),
            initial_layout(config),
        );
        tracing::debug!(?ops, "Preview surface initialized");

        if let Some(dir) = &self.watch {
            seed_buffers(&mut session, dir)?;
        }

        let handle = livepad_server::spawn_session(session, self.watch.clone());

        if let Some(dir) = &self.watch {
            spawn_source_forwarder(dir, handle.clone())?;
        }

        let page = Assets::build_html(&PageOptions {
            editor: editor_options(config),
            layout: initial_layout(config),
        });

        let host = self.host.as_deref().unwrap_or(&config.server.host);
        let port = self.port.unwrap_or(config.server.port);

        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .with_context(|| format!("failed to bind {host}:{port}"))?;

        let url = livepad_server::playground_url(listener.local_addr()?);
        println!("livepad is running at {url}");
        tracing::info!(%url, "Playground started");

        let open_browser = config.server.open_browser && !self.no_browser;

        livepad_server::serve(listener, handle, page, open_browser).await?;

        Ok(())
    }
}
