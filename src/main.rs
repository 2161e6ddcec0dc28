use anyhow::Result;
use clap::Parser;
use fethr_coordinator::{Config, Coordinator, Notification, NullBackend};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Recording-session coordinator demo
///
/// Drives one scripted record -> transcribe -> quick-edit pass against a
/// logging backend and narrates the observed states.
#[derive(Parser, Debug)]
struct Args {
    /// Config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!("{} v0.1.0", cfg.service.name);

    let coordinator = Coordinator::spawn(cfg.timing.clone(), Arc::new(NullBackend));
    let mut snapshots = coordinator.watch();

    // Narrate every committed state change
    let observer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let session = snapshots.borrow_and_update().clone();
            info!(
                "state={:?} duration={}ms text={:?}",
                session.state, session.duration_ms, session.transcription_text
            );
        }
    });

    coordinator.notify(Notification::StartRecording)?;
    tokio::time::sleep(Duration::from_millis(1200)).await;

    coordinator.notify(Notification::StopAndTranscribe { auto_paste: true })?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The null backend returns no transcript, so the quick-edit sequence
    // is driven by the clipboard notification alone.
    coordinator.notify(Notification::CopiedToClipboard)?;
    tokio::time::sleep(Duration::from_millis(
        cfg.timing.success_hold_ms + cfg.timing.edit_ready_ms + 500,
    ))
    .await;

    info!("final state: {:?}", coordinator.snapshot().state);

    coordinator.shutdown().await?;
    observer.abort();

    Ok(())
}
