use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

/// All coordinator timings, in milliseconds
///
/// Defaults match the pill UI: a short success flash, a generous
/// quick-edit window, and bounded error/auth countdowns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the SUCCESS flash is held before the edit-ready phase
    pub success_hold_ms: u64,

    /// How long the quick-edit window stays open before reverting to idle
    pub edit_ready_ms: u64,

    /// Auto-dismiss for errors pushed by the backend
    pub error_dismiss_ms: u64,

    /// Auto-dismiss for errors raised by a failed backend invocation
    pub backend_error_dismiss_ms: u64,

    /// Auth-failure window during which backend state pushes are ignored
    pub auth_window_ms: u64,

    /// Resolution of the recording duration ticker
    pub duration_tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            success_hold_ms: 1_500,
            edit_ready_ms: 7_000,
            error_dismiss_ms: 4_000,
            backend_error_dismiss_ms: 7_000,
            auth_window_ms: 10_000,
            duration_tick_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn success_hold(&self) -> Duration {
        Duration::from_millis(self.success_hold_ms)
    }

    pub fn edit_ready(&self) -> Duration {
        Duration::from_millis(self.edit_ready_ms)
    }

    pub fn error_dismiss(&self) -> Duration {
        Duration::from_millis(self.error_dismiss_ms)
    }

    pub fn backend_error_dismiss(&self) -> Duration {
        Duration::from_millis(self.backend_error_dismiss_ms)
    }

    pub fn auth_window(&self) -> Duration {
        Duration::from_millis(self.auth_window_ms)
    }

    pub fn duration_tick(&self) -> Duration {
        Duration::from_millis(self.duration_tick_ms)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "fethr-coordinator".to_string(),
            },
            timing: TimingConfig::default(),
        }
    }
}
