//! # Session Mirror demo
//!
//! Drives the variable mirror and member completion against a scripted
//! evaluation session.
//!
//! ## Usage
//!
//! ```text
//! session-mirror [--config mirror.yaml] [--fixture session.json] [QUERY...]
//! ```
//!
//! Each query is completed as if typed left of the cursor (`df$`, `lst$b$`,
//! `model@c`). An empty query lists the global variables.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use session_mirror_core::MirrorConfig;
use session_mirror_explorer::{forward_to_ui, CompletionResolver, SessionMirror};
use session_mirror_session::{EvaluationSession, ScriptedSession, TaskDispatcher, UiDispatcher};

const DEFAULT_FIXTURE: &str = include_str!("../fixtures/session.json");
const MAX_CANDIDATES: usize = 50;
const FIRST_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// Command line options.
#[derive(Debug, Default)]
struct Options {
    config: Option<String>,
    fixture: Option<String>,
    queries: Vec<String>,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut args = args.skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = Some(args.next().context("--config needs a path")?),
                "--fixture" => {
                    options.fixture = Some(args.next().context("--fixture needs a path")?)
                }
                _ => options.queries.push(arg),
            }
        }

        if options.queries.is_empty() {
            options.queries.push(String::new());
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = Options::parse(std::env::args())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &options.config {
        Some(path) => MirrorConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => MirrorConfig::default(),
    };

    let fixture = match &options.fixture {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {path}"))?,
        None => DEFAULT_FIXTURE.to_string(),
    };
    let session = Arc::new(ScriptedSession::from_json(&fixture)?);
    let dyn_session = Arc::clone(&session) as Arc<dyn EvaluationSession>;

    tracing::info!("Scripted session loaded, starting mirror");

    let mirror = Arc::new(SessionMirror::new(
        Arc::clone(&dyn_session),
        config.mirror.clone(),
    ));
    let _subscription = mirror.attach();

    // Render the variable list on the UI thread whenever it changes
    let (dispatcher, _ui_thread) = TaskDispatcher::spawn("ui")?;
    let (rendered_tx, mut rendered_rx) = mpsc::unbounded_channel();
    let _forwarder = forward_to_ui(
        mirror.subscribe_snapshots(),
        Arc::new(dispatcher) as Arc<dyn UiDispatcher>,
        move |snapshot| {
            println!("Global variables (generation {}):", snapshot.generation());
            for variable in snapshot.iter() {
                println!(
                    "  {:<16} {:?}{}",
                    variable.name(),
                    variable.kind(),
                    if variable.is_hidden() { " (hidden)" } else { "" }
                );
            }
            let _ = rendered_tx.send(snapshot.generation());
        },
    );

    session.notify_mutation();
    tokio::time::timeout(FIRST_SNAPSHOT_TIMEOUT, rendered_rx.recv())
        .await
        .context("Timed out waiting for the first snapshot")?;

    let resolver = CompletionResolver::new(mirror, dyn_session, config.completion);
    let cancel = CancellationToken::new();

    for query in &options.queries {
        let candidates = resolver.members(query, MAX_CANDIDATES, &cancel).await;
        println!(
            "{:?} ({} of ~{}): {}",
            query,
            candidates.len(),
            resolver.member_count(query),
            serde_json::to_string(&candidates)?
        );
    }

    tracing::info!("Session mirror demo finished");

    Ok(())
}
