use anyhow::Result;
use tracing::info;

/// Commands issued to the backend process
///
/// Every call is best-effort: the coordinator logs failures and keeps
/// going, it never retries and never lets a backend error escape the
/// event loop.
#[async_trait::async_trait]
pub trait BackendPort: Send + Sync {
    /// Ask the native side to start capturing audio
    async fn start_recording(&self) -> Result<()>;

    /// Stop capture and run transcription
    ///
    /// Resolves with the transcribed text; an empty string means the
    /// backend had nothing to transcribe (redundant stop).
    async fn stop_and_transcribe(&self, auto_paste: bool) -> Result<String>;

    /// Acknowledge that the UI finished its reset, so the native hotkey
    /// listener can re-arm
    async fn signal_reset_complete(&self) -> Result<()>;

    /// Resize the pill window (advisory UI geometry)
    async fn resize_window(&self, width: u32, height: u32) -> Result<()>;
}

/// Backend that only logs, for demos and wiring tests
///
/// Returns an empty transcript, which the coordinator treats as a
/// redundant stop.
#[derive(Debug, Default)]
pub struct NullBackend;

#[async_trait::async_trait]
impl BackendPort for NullBackend {
    async fn start_recording(&self) -> Result<()> {
        info!("backend: start-recording-request");
        Ok(())
    }

    async fn stop_and_transcribe(&self, auto_paste: bool) -> Result<String> {
        info!("backend: stop-and-transcribe-request (auto_paste={})", auto_paste);
        Ok(String::new())
    }

    async fn signal_reset_complete(&self) -> Result<()> {
        info!("backend: reset-acknowledgement-signal");
        Ok(())
    }

    async fn resize_window(&self, width: u32, height: u32) -> Result<()> {
        info!("backend: resize-request {}x{}", width, height);
        Ok(())
    }
}
