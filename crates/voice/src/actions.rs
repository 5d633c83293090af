//! Desktop-side actions: scoped deletion, best-effort process close and
//! desktop notifications.
//!
//! None of these may crash the caller; everything degrades to an
//! [`ExecResult`] message or a silent no-op.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

/// Outcome of an executed action, with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub ok: bool,
    pub message: String,
}

impl ExecResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    } else if path == "~" {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    }
    PathBuf::from(path)
}

/// Delete a file or directory only if it resolves inside `base_dir`.
///
/// Both paths are canonicalized before the containment check, so symlinks
/// pointing outside the base are refused rather than followed.
pub fn safe_delete(target: &str, base_dir: &Path) -> ExecResult {
    let base = match expand_tilde(&base_dir.to_string_lossy()).canonicalize() {
        Ok(p) => p,
        Err(e) => return ExecResult::fail(format!("Base directory unavailable: {e}")),
    };
    let path = expand_tilde(target);
    let path = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => return ExecResult::fail(format!("Not found: {}", path.display())),
    };

    if !path.starts_with(&base) {
        return ExecResult::fail(format!("Refused (outside base): {}", path.display()));
    }

    let result = if path.is_dir() {
        std::fs::remove_dir_all(&path)
    } else {
        std::fs::remove_file(&path)
    };
    match result {
        Ok(()) => ExecResult::ok(format!("Deleted: {}", path.display())),
        Err(e) => ExecResult::fail(format!("Delete failed: {e}")),
    }
}

/// Alternate process names some apps register under.
fn close_candidates(exe: &str) -> Vec<String> {
    let mut candidates = vec![exe.to_string()];
    match exe {
        "brave" => candidates.push("brave-browser".to_string()),
        "onlyoffice-desktopeditors" => candidates.push("DesktopEditors".to_string()),
        "prismlauncher" => candidates.push("PrismLauncher".to_string()),
        "lunar-client" => candidates.push("lunar".to_string()),
        _ => {}
    }
    if exe.eq_ignore_ascii_case("discord") {
        candidates.push("Discord".to_string());
        candidates.push("discord".to_string());
    }
    candidates.dedup();
    candidates
}

async fn pkill(args: &[&str]) -> bool {
    let run = tokio::process::Command::new("pkill")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    matches!(run, Ok(status) if status.success())
}

/// Best-effort close of an app based on its launch command.
///
/// Prefers an exact process-name match (`pkill -x`), then falls back to a
/// full-commandline match (`pkill -f`).
pub async fn close_app(command: &str) -> ExecResult {
    let command = command.trim();
    if command.is_empty() {
        return ExecResult::fail("Empty command");
    }
    if which::which("pkill").is_err() {
        return ExecResult::fail("pkill not found (install procps-ng)");
    }

    let first = command.split_whitespace().next().unwrap_or(command);
    let exe = Path::new(first)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| first.to_string());

    for name in close_candidates(&exe) {
        if pkill(&["-x", &name]).await {
            return ExecResult::ok(format!("Closed: {name}"));
        }
    }

    for pattern in [exe.as_str(), command] {
        if pattern.is_empty() {
            continue;
        }
        if pkill(&["-f", pattern]).await {
            return ExecResult::ok(format!("Closed: {exe}"));
        }
    }

    ExecResult::fail(format!("Process not found: {exe}"))
}

/// Send a desktop notification via `notify-send`.
///
/// Requires a notification daemon on the session; silently does nothing
/// when `notify-send` is missing or the message is empty. Never fails the
/// caller over a notification.
pub async fn push_notification(title: &str, message: &str, ok: bool, timeout_ms: u32) {
    let title = title.trim();
    let title = if title.is_empty() { "Voice" } else { title };
    let message = message.trim();
    if message.is_empty() {
        return;
    }

    let Ok(notify_send) = which::which("notify-send") else {
        debug!("notify-send not found, skipping notification");
        return;
    };

    let urgency = if ok { "low" } else { "normal" };
    let run = tokio::process::Command::new(notify_send)
        .args([
            "-a",
            "hyprvoice",
            "-u",
            urgency,
            "-t",
            &timeout_ms.to_string(),
            title,
            message,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = run {
        debug!("notification failed: {}", e);
    }
}
