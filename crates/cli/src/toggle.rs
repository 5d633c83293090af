//! Pseudo-maximize toggle orchestrator.
//!
//! Each invocation is a complete run: query the focused window, resolve its
//! identity, branch on the presence of a saved state record, and either
//! maximize (capture + save + float + move/resize to the monitor's usable
//! rectangle) or restore (replay the saved mode and geometry, then drop the
//! record).
//!
//! All fatal conditions are detected before any mutation is dispatched;
//! individual dispatch failures afterwards are best-effort and swallowed by
//! the compositor client.

use hyprvoice_compositor::{Compositor, CompositorError};
use hyprvoice_core_toggle::{
    plan_maximize, plan_restore, resolve_identity, usable_rect, valid_address, DispatchOp,
    GeometryError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::StateStore;

/// Terminal outcome of a successful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Maximized,
    Restored,
}

impl ToggleOutcome {
    /// The single machine-readable status token printed on stdout.
    pub fn status_token(&self) -> &'static str {
        match self {
            Self::Maximized => "MAXIMIZED",
            Self::Restored => "RESTORED",
        }
    }
}

/// Fatal toggle failures, each with its compatibility exit code.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("hyprctl not found in PATH")]
    MissingDependency,

    #[error("active window query failed: {0}")]
    ActiveWindowUnavailable(String),

    #[error("no active window")]
    NoActiveWindow,

    #[error("window identity could not be determined")]
    UnidentifiableWindow,

    #[error("monitor query failed: {0}")]
    MonitorsUnavailable(String),

    #[error("{0}")]
    InvalidGeometry(#[from] GeometryError),
}

impl ToggleError {
    /// Process exit code, reproduced verbatim for hotkey-script
    /// compatibility.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingDependency => 1,
            Self::ActiveWindowUnavailable(_) | Self::NoActiveWindow => 2,
            Self::UnidentifiableWindow => 3,
            Self::MonitorsUnavailable(_) | Self::InvalidGeometry(_) => 4,
        }
    }
}

fn active_window_error(e: CompositorError) -> ToggleError {
    match e {
        CompositorError::MissingHyprctl => ToggleError::MissingDependency,
        CompositorError::NoActiveWindow => ToggleError::NoActiveWindow,
        other => ToggleError::ActiveWindowUnavailable(other.to_string()),
    }
}

fn monitors_error(e: CompositorError) -> ToggleError {
    match e {
        CompositorError::MissingHyprctl => ToggleError::MissingDependency,
        other => ToggleError::MonitorsUnavailable(other.to_string()),
    }
}

async fn apply_ops<C: Compositor>(client: &C, address: Option<&str>, ops: &[DispatchOp]) {
    for op in ops {
        match *op {
            DispatchOp::ToggleFloating => client.toggle_floating(address).await,
            DispatchOp::Move { x, y } => client.move_window(address, x, y).await,
            DispatchOp::Resize { width, height } => {
                client.resize_window(address, width, height).await
            }
        }
    }
}

/// Run one toggle invocation against the compositor and state store.
pub async fn run_toggle<C: Compositor>(
    client: &C,
    store: &StateStore,
) -> Result<ToggleOutcome, ToggleError> {
    let window = client.active_window().await.map_err(active_window_error)?;

    let identity = resolve_identity(&window);
    if identity.is_unknown() {
        return Err(ToggleError::UnidentifiableWindow);
    }
    debug!("focused window resolved as '{}'", identity);

    let address = valid_address(&window.address).map(str::to_string);

    match store.load(&identity) {
        Some(saved) => {
            info!("restoring '{}'", identity);
            let ops = plan_restore(&window, &saved);
            apply_ops(client, address.as_deref(), &ops).await;
            store.delete(&identity);
            Ok(ToggleOutcome::Restored)
        }
        None => {
            let monitors = client.monitors().await.map_err(monitors_error)?;
            let usable = usable_rect(&monitors, window.monitor_id)?;
            info!("maximizing '{}' into {:?}", identity, usable);

            let (saved, ops) = plan_maximize(&window, usable);
            // The original tool never checked this write either; a failed
            // save means the restore leg is lost, not that the maximize
            // must be aborted.
            if let Err(e) = store.save(&identity, &saved) {
                warn!("could not save state for '{}': {}", identity, e);
            }
            apply_ops(client, address.as_deref(), &ops).await;
            Ok(ToggleOutcome::Maximized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hyprvoice_core_toggle::{ActiveWindow, Monitor, Reserved};
    use std::sync::Mutex;

    /// Mutation calls recorded by the fake compositor.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        ToggleFloating(Option<String>),
        Move(Option<String>, i32, i32),
        Resize(Option<String>, i32, i32),
    }

    /// Scripted compositor: preset query answers, recorded mutations.
    struct FakeCompositor {
        window: Mutex<Result<ActiveWindow, CompositorError>>,
        monitors: Result<Vec<Monitor>, CompositorError>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeCompositor {
        fn new(window: ActiveWindow, monitors: Vec<Monitor>) -> Self {
            Self {
                window: Mutex::new(Ok(window)),
                monitors: Ok(monitors),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_window_error(e: CompositorError) -> Self {
            Self {
                window: Mutex::new(Err(e)),
                monitors: Ok(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn set_window(&self, window: ActiveWindow) {
            *self.window.lock().unwrap() = Ok(window);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn clone_err(e: &CompositorError) -> CompositorError {
        match e {
            CompositorError::MissingHyprctl => CompositorError::MissingHyprctl,
            CompositorError::NoActiveWindow => CompositorError::NoActiveWindow,
            CompositorError::Unavailable { reason } => CompositorError::Unavailable {
                reason: reason.clone(),
            },
            CompositorError::LaunchFailed { reason } => CompositorError::LaunchFailed {
                reason: reason.clone(),
            },
        }
    }

    #[async_trait]
    impl Compositor for FakeCompositor {
        async fn active_window(&self) -> Result<ActiveWindow, CompositorError> {
            match &*self.window.lock().unwrap() {
                Ok(w) => Ok(w.clone()),
                Err(e) => Err(clone_err(e)),
            }
        }

        async fn monitors(&self) -> Result<Vec<Monitor>, CompositorError> {
            match &self.monitors {
                Ok(m) => Ok(m.clone()),
                Err(e) => Err(clone_err(e)),
            }
        }

        async fn toggle_floating(&self, address: Option<&str>) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::ToggleFloating(address.map(str::to_string)));
        }

        async fn move_window(&self, address: Option<&str>, x: i32, y: i32) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Move(address.map(str::to_string), x, y));
        }

        async fn resize_window(&self, address: Option<&str>, width: i32, height: i32) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Resize(address.map(str::to_string), width, height));
        }
    }

    fn floating_window() -> ActiveWindow {
        ActiveWindow {
            address: "0xabc123".to_string(),
            pid: 42,
            class: "kitty".to_string(),
            title: "sh".to_string(),
            monitor_id: 0,
            position: (100, 150),
            size: (640, 480),
            floating: true,
        }
    }

    fn monitor_1080p() -> Vec<Monitor> {
        vec![Monitor {
            id: 0,
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            reserved: Reserved::new(0, 0, 30, 0),
        }]
    }

    fn empty_dir(dir: &tempfile::TempDir) -> bool {
        std::fs::read_dir(dir.path())
            .map(|mut d| d.next().is_none())
            .unwrap_or(true)
    }

    #[tokio::test]
    async fn test_maximize_saves_state_and_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let fake = FakeCompositor::new(floating_window(), monitor_1080p());

        let outcome = run_toggle(&fake, &store).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Maximized);
        assert_eq!(outcome.status_token(), "MAXIMIZED");

        // Floating window: no toggle, just move/resize to the usable rect
        assert_eq!(
            fake.calls(),
            vec![
                Call::Move(Some("0xabc123".to_string()), 0, 30),
                Call::Resize(Some("0xabc123".to_string()), 1920, 1050),
            ]
        );
        assert!(!empty_dir(&dir));
    }

    #[tokio::test]
    async fn test_maximize_tiled_window_floats_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let mut window = floating_window();
        window.floating = false;
        let fake = FakeCompositor::new(window, monitor_1080p());

        run_toggle(&fake, &store).await.unwrap();
        assert_eq!(
            fake.calls()[0],
            Call::ToggleFloating(Some("0xabc123".to_string()))
        );
    }

    #[tokio::test]
    async fn test_toggle_pair_restores_floating_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let fake = FakeCompositor::new(floating_window(), monitor_1080p());

        assert_eq!(
            run_toggle(&fake, &store).await.unwrap(),
            ToggleOutcome::Maximized
        );
        assert_eq!(
            run_toggle(&fake, &store).await.unwrap(),
            ToggleOutcome::Restored
        );

        // Second run moved the window back to its exact original geometry
        let calls = fake.calls();
        assert_eq!(
            &calls[2..],
            &[
                Call::Move(Some("0xabc123".to_string()), 100, 150),
                Call::Resize(Some("0xabc123".to_string()), 640, 480),
            ]
        );
        // ...and left no residual state record
        assert!(empty_dir(&dir));
    }

    #[tokio::test]
    async fn test_restore_tiled_window_ends_tiled_without_move() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let mut window = floating_window();
        window.floating = false;
        let fake = FakeCompositor::new(window.clone(), monitor_1080p());

        run_toggle(&fake, &store).await.unwrap();

        // The maximize floated it
        window.floating = true;
        fake.set_window(window);

        run_toggle(&fake, &store).await.unwrap();
        let calls = fake.calls();
        // Restore leg is exactly one un-float, no move/resize
        assert_eq!(
            &calls[3..],
            &[Call::ToggleFloating(Some("0xabc123".to_string()))]
        );
        assert!(empty_dir(&dir));
    }

    #[tokio::test]
    async fn test_invalid_geometry_aborts_without_state_or_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let monitors = vec![Monitor {
            id: 0,
            width: 0,
            height: 1080,
            ..Default::default()
        }];
        let fake = FakeCompositor::new(floating_window(), monitors);

        let err = run_toggle(&fake, &store).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(fake.calls().is_empty());
        assert!(empty_dir(&dir));
    }

    #[tokio::test]
    async fn test_no_active_window_exits_2_and_leaves_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let fake = FakeCompositor::with_window_error(CompositorError::NoActiveWindow);

        let err = run_toggle(&fake, &store).await.unwrap_err();
        assert!(matches!(err, ToggleError::NoActiveWindow));
        assert_eq!(err.exit_code(), 2);
        assert!(empty_dir(&dir));
    }

    #[tokio::test]
    async fn test_compositor_unavailable_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let fake = FakeCompositor::with_window_error(CompositorError::Unavailable {
            reason: "socket gone".to_string(),
        });

        let err = run_toggle(&fake, &store).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_unidentifiable_window_exits_3() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let blank = ActiveWindow::default();
        let fake = FakeCompositor::new(blank, monitor_1080p());

        let err = run_toggle(&fake, &store).await.unwrap_err();
        assert!(matches!(err, ToggleError::UnidentifiableWindow));
        assert_eq!(err.exit_code(), 3);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_address_dispatches_without_address() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        let mut window = floating_window();
        window.address = "0x0".to_string(); // null handle, pid still valid
        let fake = FakeCompositor::new(window, monitor_1080p());

        run_toggle(&fake, &store).await.unwrap();
        assert_eq!(
            fake.calls(),
            vec![Call::Move(None, 0, 30), Call::Resize(None, 1920, 1050)]
        );
        // Identity fell back to the pid
        let path = dir.path().join("pid-42.json");
        assert!(path.exists());
    }
}
