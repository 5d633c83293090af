//! Hyprvoice Compositor Client
//!
//! Talks to Hyprland through the `hyprctl` command-line IPC surface:
//! JSON introspection queries (`activewindow`, `monitors`) and
//! fire-and-forget mutation dispatches (move, resize, toggle-floating,
//! exec).
//!
//! Every external call is wrapped in a bounded timeout; a hung compositor
//! is reported as [`CompositorError::Unavailable`] instead of blocking the
//! invocation forever.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hyprvoice_core_toggle::{ActiveWindow, Monitor};
use thiserror::Error;
use tracing::{debug, warn};

/// Default bound on a single `hyprctl` invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by the compositor boundary.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The `hyprctl` binary is not installed or not on PATH.
    #[error("hyprctl not found in PATH")]
    MissingHyprctl,

    /// The IPC command produced no output, unparseable output, or hung.
    #[error("compositor unavailable: {reason}")]
    Unavailable { reason: String },

    /// The active-window query returned the JSON null value.
    #[error("no active window")]
    NoActiveWindow,

    /// An app launch failed through both the dispatcher and the shell.
    #[error("launch failed: {reason}")]
    LaunchFailed { reason: String },
}

impl CompositorError {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Query and mutation surface of the compositor.
///
/// The toggle orchestrator is written against this trait so it can be
/// exercised with a fake compositor in tests. Mutations are best-effort:
/// they log failures and never propagate them to the caller.
#[async_trait]
pub trait Compositor {
    /// Snapshot of the currently focused window.
    async fn active_window(&self) -> Result<ActiveWindow, CompositorError>;

    /// The current monitor list.
    async fn monitors(&self) -> Result<Vec<Monitor>, CompositorError>;

    /// Flip the floating state of the addressed (or focused) window.
    async fn toggle_floating(&self, address: Option<&str>);

    /// Move the addressed (or focused) window to an exact origin.
    async fn move_window(&self, address: Option<&str>, x: i32, y: i32);

    /// Resize the addressed (or focused) window to exact dimensions.
    async fn resize_window(&self, address: Option<&str>, width: i32, height: i32);
}

/// Gate raw query output before JSON parsing.
///
/// Empty output means the IPC surface is gone; a literal `null` means
/// nothing is focused; anything that does not open a JSON object or array
/// is not recognizable as structured data.
fn gate_output(raw: &str) -> Result<&str, CompositorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CompositorError::unavailable("empty response"));
    }
    if trimmed == "null" {
        return Err(CompositorError::NoActiveWindow);
    }
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        let head: String = trimmed.chars().take(60).collect();
        return Err(CompositorError::unavailable(format!(
            "response is not JSON: {head}"
        )));
    }
    Ok(trimmed)
}

/// Parse the `activewindow` query output.
fn parse_active_window(raw: &str) -> Result<ActiveWindow, CompositorError> {
    let json = gate_output(raw)?;
    serde_json::from_str(json)
        .map_err(|e| CompositorError::unavailable(format!("bad activewindow payload: {e}")))
}

/// Parse the `monitors` query output.
fn parse_monitors(raw: &str) -> Result<Vec<Monitor>, CompositorError> {
    let json = gate_output(raw)?;
    serde_json::from_str(json)
        .map_err(|e| CompositorError::unavailable(format!("bad monitors payload: {e}")))
}

/// `hyprctl`-backed [`Compositor`] implementation.
pub struct HyprctlClient {
    hyprctl: PathBuf,
    timeout: Duration,
}

impl HyprctlClient {
    /// Locate `hyprctl` and build a client with the default timeout.
    pub fn new() -> Result<Self, CompositorError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Locate `hyprctl` and build a client with a custom per-call timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, CompositorError> {
        let hyprctl = which::which("hyprctl").map_err(|_| CompositorError::MissingHyprctl)?;
        Ok(Self { hyprctl, timeout })
    }

    /// Run `hyprctl -j <object>` and capture stdout.
    async fn query(&self, object: &str) -> Result<String, CompositorError> {
        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.hyprctl)
                .args(["-j", object])
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| CompositorError::unavailable(format!("query '{object}' timed out")))?
        .map_err(|e| CompositorError::unavailable(format!("failed to run hyprctl: {e}")))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a `hyprctl dispatch` mutation; true when it reported success.
    async fn dispatch(&self, args: &[&str]) -> bool {
        let run = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.hyprctl)
                .arg("dispatch")
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status(),
        )
        .await;

        match run {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                warn!("hyprctl dispatch {:?} failed to run: {}", args, e);
                false
            }
            Err(_) => {
                warn!("hyprctl dispatch {:?} timed out", args);
                false
            }
        }
    }

    /// Address-qualified-first dispatch with active-window fallback.
    ///
    /// The focused window may have changed between the query and this call,
    /// so the fallback is attempted whenever the addressed attempt does not
    /// report success, whatever its failure mode was. Failures are logged
    /// and swallowed: a partially-applied geometry beats aborting, and the
    /// whole operation is re-triggerable.
    async fn dispatch_with_fallback(&self, addressed: Option<Vec<String>>, active: Vec<String>) {
        if let Some(args) = addressed {
            let refs: Vec<&str> = args.iter().map(String::as_str).collect();
            if self.dispatch(&refs).await {
                return;
            }
            debug!("addressed dispatch {:?} failed, trying active window", args);
        }

        let refs: Vec<&str> = active.iter().map(String::as_str).collect();
        if !self.dispatch(&refs).await {
            warn!("dispatch {:?} failed", active);
        }
    }

    /// Launch an app command: `hyprctl dispatch exec`, with a detached
    /// shell spawn as fallback when the dispatcher refuses.
    pub async fn exec(&self, command: &str) -> Result<(), CompositorError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(CompositorError::LaunchFailed {
                reason: "empty command".to_string(),
            });
        }

        if self.dispatch(&["exec", command]).await {
            return Ok(());
        }
        debug!("dispatch exec failed, spawning '{}' via shell", command);

        tokio::process::Command::new("sh")
            .args(["-c", command])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| CompositorError::LaunchFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Compositor for HyprctlClient {
    async fn active_window(&self) -> Result<ActiveWindow, CompositorError> {
        let raw = self.query("activewindow").await?;
        parse_active_window(&raw)
    }

    async fn monitors(&self) -> Result<Vec<Monitor>, CompositorError> {
        let raw = self.query("monitors").await?;
        parse_monitors(&raw)
    }

    async fn toggle_floating(&self, address: Option<&str>) {
        let addressed = address.map(|a| {
            vec![
                "togglefloating".to_string(),
                format!("address:{a}"),
            ]
        });
        let active = vec!["togglefloating".to_string(), "active".to_string()];
        self.dispatch_with_fallback(addressed, active).await;
    }

    async fn move_window(&self, address: Option<&str>, x: i32, y: i32) {
        let addressed = address.map(|a| {
            vec![
                "movewindowpixel".to_string(),
                format!("exact {x} {y},address:{a}"),
            ]
        });
        let active = vec!["moveactive".to_string(), format!("exact {x} {y}")];
        self.dispatch_with_fallback(addressed, active).await;
    }

    async fn resize_window(&self, address: Option<&str>, width: i32, height: i32) {
        let addressed = address.map(|a| {
            vec![
                "resizewindowpixel".to_string(),
                format!("exact {width} {height},address:{a}"),
            ]
        });
        let active = vec![
            "resizeactive".to_string(),
            format!("exact {width} {height}"),
        ];
        self.dispatch_with_fallback(addressed, active).await;
    }
}
