// Shared test support: a scripted backend that records every command
// the coordinator issues.
//
// Not every test binary uses every helper.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use fethr_coordinator::BackendPort;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    StartRecording,
    StopAndTranscribe { auto_paste: bool },
    ResetComplete,
    Resize { width: u32, height: u32 },
}

/// Backend double for coordinator tests
///
/// Stop results are scripted per call; when the script runs out the
/// backend behaves like a redundant stop (empty transcript). A stop
/// delay simulates an in-flight transcription promise.
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    stop_results: Mutex<VecDeque<Result<String, String>>>,
    stop_delay: Duration,
    fail_start: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            stop_results: Mutex::new(VecDeque::new()),
            stop_delay: Duration::ZERO,
            fail_start: false,
        }
    }

    pub fn with_transcript(text: &str) -> Self {
        let backend = Self::new();
        backend.push_stop_result(Ok(text.to_string()));
        backend
    }

    pub fn push_stop_result(&self, result: Result<String, String>) {
        self.stop_results.lock().unwrap().push_back(result);
    }

    pub fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &BackendCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl BackendPort for ScriptedBackend {
    async fn start_recording(&self) -> Result<()> {
        self.record(BackendCall::StartRecording);
        if self.fail_start {
            return Err(anyhow!("audio device unavailable"));
        }
        Ok(())
    }

    async fn stop_and_transcribe(&self, auto_paste: bool) -> Result<String> {
        self.record(BackendCall::StopAndTranscribe { auto_paste });
        if !self.stop_delay.is_zero() {
            tokio::time::sleep(self.stop_delay).await;
        }
        let scripted = self.stop_results.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(String::new()),
        }
    }

    async fn signal_reset_complete(&self) -> Result<()> {
        self.record(BackendCall::ResetComplete);
        Ok(())
    }

    async fn resize_window(&self, width: u32, height: u32) -> Result<()> {
        self.record(BackendCall::Resize { width, height });
        Ok(())
    }
}

/// Let the coordinator loop drain everything queued at the current
/// (paused) instant
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
