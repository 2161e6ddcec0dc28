// Integration tests for the quick-edit sequence: the timed
// SUCCESS -> IDLE_EDIT_READY -> IDLE chain and everything that may
// preempt it.

mod common;

use common::{settle, BackendCall, ScriptedBackend};
use fethr_coordinator::{BackendPort, Coordinator, Event, Notification, SessionState, TimingConfig};
use std::sync::Arc;
use std::time::Duration;

fn spawn_coordinator(backend: ScriptedBackend) -> (Coordinator, Arc<ScriptedBackend>) {
    let backend = Arc::new(backend);
    let port: Arc<dyn BackendPort> = backend.clone();
    let coordinator = Coordinator::spawn(TimingConfig::default(), port);
    (coordinator, backend)
}

// Scenario: a transcription result opens the sequence; 1.5 s of SUCCESS,
// 7 s of edit-ready, then idle with the transcription gone.
#[tokio::test(start_paused = true)]
async fn transcription_result_runs_the_full_timed_sequence() {
    let backend = ScriptedBackend::with_transcript("hello world");
    let (coordinator, backend) = spawn_coordinator(backend);

    coordinator
        .notify(Notification::StopAndTranscribe { auto_paste: true })
        .unwrap();
    settle().await;

    let session = coordinator.snapshot();
    assert_eq!(session.state, SessionState::Success);
    assert_eq!(session.transcription_text.as_deref(), Some("hello world"));

    tokio::time::sleep(Duration::from_millis(1400)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let session = coordinator.snapshot();
    assert_eq!(session.state, SessionState::IdleEditReady);
    assert_eq!(session.transcription_text.as_deref(), Some("hello world"));

    // Still open shortly before the 8.5 s mark...
    tokio::time::sleep(Duration::from_millis(6800)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);

    // ...and fully reverted after it
    tokio::time::sleep(Duration::from_millis(200)).await;
    let session = coordinator.snapshot();
    assert_eq!(session.state, SessionState::Idle);
    assert!(session.transcription_text.is_none());
    assert_eq!(backend.count(&BackendCall::ResetComplete), 1);

    coordinator.shutdown().await.unwrap();
}

// A second copy within the success window supersedes the first chain:
// the countdown restarts and only the second chain ever fires.
#[tokio::test(start_paused = true)]
async fn second_begin_supersedes_the_first_chain() {
    let (coordinator, _backend) = spawn_coordinator(ScriptedBackend::new());

    coordinator.notify(Notification::CopiedToClipboard).unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    coordinator.notify(Notification::CopiedToClipboard).unwrap();
    settle().await;

    // The first chain would have left SUCCESS at t=1500; the restarted
    // one holds it until t=2500.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);

    // Idle arrives on the second chain's schedule (t = 1000 + 8500)
    tokio::time::sleep(Duration::from_millis(6800)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::Idle);

    coordinator.shutdown().await.unwrap();
}

// Restarting a recording mid-sequence must reset exactly once, then
// record, with the stale transcription cleared.
#[tokio::test(start_paused = true)]
async fn new_recording_preempts_the_sequence_with_one_reset() {
    let backend = ScriptedBackend::with_transcript("first take");
    let (coordinator, backend) = spawn_coordinator(backend);

    coordinator
        .notify(Notification::StopAndTranscribe { auto_paste: false })
        .unwrap();
    settle().await;
    assert_eq!(
        coordinator.snapshot().transcription_text.as_deref(),
        Some("first take")
    );

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);

    coordinator.notify(Notification::StartRecording).unwrap();
    settle().await;

    let session = coordinator.snapshot();
    assert_eq!(session.state, SessionState::Recording);
    assert!(session.transcription_text.is_none());
    assert_eq!(backend.count(&BackendCall::ResetComplete), 1);
    assert_eq!(backend.count(&BackendCall::StartRecording), 1);

    // The superseded chain's timers must never drag the session back
    tokio::time::sleep(Duration::from_millis(10000)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::Recording);
    assert_eq!(backend.count(&BackendCall::ResetComplete), 1);

    coordinator.shutdown().await.unwrap();
}

// An idle sync loses to an active sequence; any other sync preempts it.
#[tokio::test(start_paused = true)]
async fn idle_sync_is_dropped_while_the_sequence_runs() {
    let (coordinator, _backend) = spawn_coordinator(ScriptedBackend::new());

    coordinator.notify(Notification::CopiedToClipboard).unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    coordinator
        .notify(Notification::StateSync {
            state: "IDLE".to_string(),
        })
        .unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    // The sequence still expires on its own clock afterwards
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);

    coordinator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn non_idle_sync_preempts_the_sequence() {
    let (coordinator, backend) = spawn_coordinator(ScriptedBackend::new());

    coordinator.notify(Notification::CopiedToClipboard).unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    coordinator
        .notify(Notification::StateSync {
            state: "TRANSCRIBING".to_string(),
        })
        .unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Transcribing);
    assert_eq!(backend.count(&BackendCall::ResetComplete), 1);

    // No leftover phase timers
    tokio::time::sleep(Duration::from_millis(10000)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::Transcribing);

    coordinator.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn error_push_preempts_the_sequence() {
    let backend = ScriptedBackend::with_transcript("dictated text");
    let (coordinator, _backend) = spawn_coordinator(backend);

    coordinator
        .notify(Notification::StopAndTranscribe { auto_paste: true })
        .unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Success);

    coordinator
        .notify(Notification::ErrorOccurred {
            message: "Paste failed".to_string(),
        })
        .unwrap();
    settle().await;

    let session = coordinator.snapshot();
    assert_eq!(session.state, SessionState::Error);
    assert!(session.transcription_text.is_none());

    coordinator.shutdown().await.unwrap();
}

// The user's explicit edit action ends the countdown immediately.
#[tokio::test(start_paused = true)]
async fn user_edit_request_ends_the_sequence_synchronously() {
    let (coordinator, backend) = spawn_coordinator(ScriptedBackend::new());

    coordinator.notify(Notification::CopiedToClipboard).unwrap();
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(coordinator.snapshot().state, SessionState::IdleEditReady);

    coordinator.send(Event::EditRequested).unwrap();
    settle().await;
    assert_eq!(coordinator.snapshot().state, SessionState::Idle);
    assert_eq!(backend.count(&BackendCall::ResetComplete), 1);

    coordinator.shutdown().await.unwrap();
}
