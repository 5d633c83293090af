//! Hyprvoice Toggle Core
//!
//! Pure logic for the pseudo-maximize toggle: snapshot types for the
//! compositor's active-window and monitor queries, stable window identity
//! resolution, usable-rectangle computation, and the maximize/restore
//! transition planner.
//!
//! Everything in this crate is side-effect free. Process execution lives in
//! `hyprvoice-compositor`; state persistence and orchestration live in the
//! `hyprvoice` binary.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;

/// Errors that can occur during geometry computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("usable monitor area is empty ({width}x{height})")]
    InvalidGeometry { width: i32, height: i32 },
}

/// A rectangle in screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the rectangle encloses any area at all.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Deserialize a single field, degrading to `Default` when the value is
/// missing or has the wrong shape.
///
/// The compositor occasionally reports odd values for individual fields
/// (e.g. a string where a number is expected). One corrupt field must not
/// block the toggle, so parsing never fails at field granularity.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Snapshot of the focused window, read fresh on every invocation.
///
/// Field names follow the compositor's `activewindow` JSON output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActiveWindow {
    /// Hexadecimal window handle; may be absent or junk (`""`, `"0x0"`).
    #[serde(deserialize_with = "lenient")]
    pub address: String,
    /// Owning process id; `0` means unknown.
    #[serde(deserialize_with = "lenient")]
    pub pid: i32,
    #[serde(deserialize_with = "lenient")]
    pub class: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    /// Id of the monitor the window currently sits on.
    #[serde(rename = "monitor", deserialize_with = "lenient")]
    pub monitor_id: i32,
    /// Current on-screen origin.
    #[serde(rename = "at", deserialize_with = "lenient")]
    pub position: (i32, i32),
    /// Current dimensions.
    #[serde(deserialize_with = "lenient")]
    pub size: (i32, i32),
    #[serde(deserialize_with = "lenient")]
    pub floating: bool,
}

/// Reserved margins of a monitor (space taken by bars and panels).
///
/// The compositor reports these either as a named object or as an ordered
/// `[left, right, top, bottom]` list; both shapes are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ReservedRepr")]
pub struct Reserved {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Reserved {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self { left, right, top, bottom }
    }
}

/// Wire-level shapes for [`Reserved`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ReservedRepr {
    Named {
        #[serde(default)]
        left: i32,
        #[serde(default)]
        right: i32,
        #[serde(default)]
        top: i32,
        #[serde(default)]
        bottom: i32,
    },
    Ordered(Vec<i32>),
}

impl From<ReservedRepr> for Reserved {
    fn from(repr: ReservedRepr) -> Self {
        match repr {
            ReservedRepr::Named { left, right, top, bottom } => {
                Self { left, right, top, bottom }
            }
            ReservedRepr::Ordered(values) => {
                let side = |i: usize| values.get(i).copied().unwrap_or(0);
                Self {
                    left: side(0),
                    right: side(1),
                    top: side(2),
                    bottom: side(3),
                }
            }
        }
    }
}

/// One entry of the compositor's monitor list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Monitor {
    #[serde(deserialize_with = "lenient")]
    pub id: i32,
    #[serde(deserialize_with = "lenient")]
    pub x: i32,
    #[serde(deserialize_with = "lenient")]
    pub y: i32,
    #[serde(deserialize_with = "lenient")]
    pub width: i32,
    #[serde(deserialize_with = "lenient")]
    pub height: i32,
    #[serde(deserialize_with = "lenient")]
    pub reserved: Reserved,
}

/// Compute the usable drawing area of the target monitor.
///
/// Selects the monitor whose id matches `target_id`, falling back to the
/// first monitor in the list, falling back to an all-zero monitor when the
/// list is empty. Reserved margins are subtracted from the monitor extent.
///
/// Returns [`GeometryError::InvalidGeometry`] when the resulting width or
/// height is not positive; there is nothing safe to resize into then.
pub fn usable_rect(monitors: &[Monitor], target_id: i32) -> Result<Rect, GeometryError> {
    let fallback = Monitor::default();
    let monitor = monitors
        .iter()
        .find(|m| m.id == target_id)
        .or_else(|| monitors.first())
        .unwrap_or(&fallback);

    let r = monitor.reserved;
    let rect = Rect::new(
        monitor.x + r.left,
        monitor.y + r.top,
        monitor.width - r.left - r.right,
        monitor.height - r.top - r.bottom,
    );

    if !rect.is_positive() {
        return Err(GeometryError::InvalidGeometry {
            width: rect.width,
            height: rect.height,
        });
    }
    Ok(rect)
}

/// Placeholder token produced when no identity strategy yields anything.
/// The orchestrator rejects it as unidentifiable.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Stable, filesystem-safe key correlating a window across the maximize
/// call and the matching restore call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowIdentity(String);

impl WindowIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether identity resolution degraded to the unusable placeholder.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_IDENTITY
    }
}

impl std::fmt::Display for WindowIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a compositor window handle.
///
/// A handle is usable when it is non-empty, not the null handle
/// (`"0x0"` / `"0"`), and is plain hexadecimal with an optional `0x` prefix.
pub fn valid_address(address: &str) -> Option<&str> {
    let addr = address.trim();
    if addr.is_empty() || addr == "0x0" || addr == "0" {
        return None;
    }
    let hex = addr.strip_prefix("0x").unwrap_or(addr);
    if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(addr)
    } else {
        None
    }
}

/// Restrict a raw key to the safe-token alphabet (alphanumerics, `.`, `_`,
/// `-`). An empty result becomes the [`UNKNOWN_IDENTITY`] placeholder.
fn sanitize_token(raw: &str) -> String {
    let token: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if token.is_empty() {
        UNKNOWN_IDENTITY.to_string()
    } else {
        token
    }
}

/// Derive the stable identity for a window snapshot.
///
/// Strategies in priority order:
/// 1. the validated window handle,
/// 2. `pid-<pid>` when the process id is known,
/// 3. `win-<12 hex chars of SHA-1(class + "\n" + title)>`.
///
/// Total function: with no handle, no pid and an entirely blank class/title
/// pair it yields the `unknown` placeholder, which callers must reject.
pub fn resolve_identity(window: &ActiveWindow) -> WindowIdentity {
    if let Some(addr) = valid_address(&window.address) {
        return WindowIdentity(sanitize_token(addr));
    }
    if window.pid > 0 {
        return WindowIdentity(format!("pid-{}", window.pid));
    }
    if window.class.is_empty() && window.title.is_empty() {
        return WindowIdentity(UNKNOWN_IDENTITY.to_string());
    }

    let mut hasher = Sha1::new();
    hasher.update(window.class.as_bytes());
    hasher.update(b"\n");
    hasher.update(window.title.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    WindowIdentity(format!("win-{}", &hex[..12]))
}

/// Per-window record persisted for exactly the maximized interval.
///
/// Its presence in the state store is the sole source of truth for "this
/// window is currently pseudo-maximized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    /// Floating/tiled mode before maximize.
    pub was_floating: bool,
    /// Geometry before maximize.
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowState {
    /// Capture the pre-maximize state of a window snapshot.
    pub fn capture(window: &ActiveWindow) -> Self {
        Self {
            was_floating: window.floating,
            x: window.position.0,
            y: window.position.1,
            w: window.size.0,
            h: window.size.1,
        }
    }

    /// The saved geometry as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// A single compositor mutation the dispatcher must issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOp {
    /// Flip the window between floating and tiled.
    ToggleFloating,
    /// Move the window to an exact origin.
    Move { x: i32, y: i32 },
    /// Resize the window to exact dimensions.
    Resize { width: i32, height: i32 },
}

/// Plan the NORMAL -> MAXIMIZED transition.
///
/// Returns the state record to persist plus the ordered mutations: float the
/// window if it is tiled, then move/resize it to the usable rectangle.
pub fn plan_maximize(window: &ActiveWindow, usable: Rect) -> (WindowState, Vec<DispatchOp>) {
    let saved = WindowState::capture(window);

    let mut ops = Vec::new();
    if !window.floating {
        ops.push(DispatchOp::ToggleFloating);
    }
    ops.push(DispatchOp::Move {
        x: usable.x,
        y: usable.y,
    });
    ops.push(DispatchOp::Resize {
        width: usable.width,
        height: usable.height,
    });

    (saved, ops)
}

/// Plan the MAXIMIZED -> NORMAL transition.
///
/// A window that was floating before maximize is re-floated if needed and
/// moved back to its exact saved geometry. A window that was tiled is handed
/// back to the tiling layout by dropping the floating flag; the layout
/// engine decides its geometry, so no move/resize is issued.
pub fn plan_restore(window: &ActiveWindow, saved: &WindowState) -> Vec<DispatchOp> {
    let mut ops = Vec::new();

    if saved.was_floating {
        if !window.floating {
            ops.push(DispatchOp::ToggleFloating);
        }
        ops.push(DispatchOp::Move {
            x: saved.x,
            y: saved.y,
        });
        ops.push(DispatchOp::Resize {
            width: saved.w,
            height: saved.h,
        });
    } else if window.floating {
        ops.push(DispatchOp::ToggleFloating);
    }

    ops
}
