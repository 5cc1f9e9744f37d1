//! Debounced attention nudge
//!
//! Each accepted submission (re-)arms a single delay timer, so a burst of
//! stacked screenshots produces exactly one nudge. When the timer fires it
//! runs the configured nudge command (e.g. a script that focuses the editor
//! and types a prompt). The command is best-effort: by the time it runs the
//! item is already in the store, so failures are logged and swallowed.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Upper bound on nudge command runtime
const NUDGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Nudge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NudgeConfig {
    /// Enable the attention signal
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Delay before firing, so the user can stack more screenshots
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Command to run when the timer fires (split shell-style)
    #[serde(default)]
    pub command: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    3000
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            delay_ms: default_delay_ms(),
            command: None,
        }
    }
}

/// Owns the single debounce timer for the attention signal
pub struct Notifier {
    config: NudgeConfig,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Notifier {
    pub fn new(config: NudgeConfig) -> Self {
        Self {
            config,
            timer: Mutex::new(None),
        }
    }

    /// (Re-)arm the delay timer.
    ///
    /// Aborting the previous timer task is what coalesces a burst of
    /// submissions into one nudge. The fired task never touches the timer
    /// slot itself; only `arm`/`disarm` replace it, so a re-arm can never
    /// cancel a newer timer than the one it saw.
    pub async fn arm(&self) {
        if !self.config.enabled {
            debug!("Nudge disabled, not arming");
            return;
        }

        let config = self.config.clone();
        let mut timer = self.timer.lock().await;
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;
            if let Err(e) = fire(&config).await {
                // The submission that armed us already succeeded
                warn!("Nudge failed: {:#}", e);
            }
        }));
    }

    /// Cancel a scheduled nudge without firing it
    pub async fn disarm(&self) {
        if let Some(previous) = self.timer.lock().await.take() {
            previous.abort();
        }
    }

    /// Whether a nudge is currently scheduled
    pub async fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .await
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

/// Run the configured nudge command once
async fn fire(config: &NudgeConfig) -> Result<()> {
    let Some(command) = config.command.as_deref() else {
        info!("Feedback waiting; no nudge command configured");
        return Ok(());
    };

    let parts = shell_words::split(command).context("Failed to parse nudge command")?;
    let Some((program, args)) = parts.split_first() else {
        bail!("Nudge command is empty");
    };

    let output = timeout(
        NUDGE_TIMEOUT,
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .context("Nudge command timed out")?
    .context("Failed to run nudge command")?;

    if !output.status.success() {
        bail!(
            "Nudge command exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    info!("Nudged the agent");
    Ok(())
}
