//! Hyprvoice Voice Pipeline
//!
//! Turns an already-transcribed utterance into a desktop action: intent
//! classification over a small verb grammar, fuzzy app-name resolution
//! tolerant of speech-recognizer mis-hearings, and the actions themselves
//! (scoped deletion, process close, desktop notifications).
//!
//! Speech-to-text decoding is deliberately outside this crate; the binary's
//! `intent` subcommand is the boundary a recognizer pipes text into.

pub mod actions;
pub mod apps;
pub mod intent;
pub mod text;

pub use actions::ExecResult;
pub use apps::{build_apps_map, resolve_app, MatchThresholds, ResolvedApp};
pub use intent::{classify, Intent, IntentContext, IntentOutcome};
pub use text::normalize_text;
