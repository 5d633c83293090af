//! Intent classification over transcribed utterances.
//!
//! The grammar is a small verb set (French plus the English words the French
//! recognizer sometimes emits anyway). Classification is pure: it yields an
//! [`IntentOutcome`] describing what to do, and the binary executes it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use regex::Regex;
use std::sync::LazyLock;

use crate::apps::{resolve_app, MatchThresholds, ResolvedApp};
use crate::text::normalize_text;

static OPEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:ouvre|lance|demarre|open|launch|start|run)\s+(.+)$").unwrap()
});

static DELETE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:supprime|efface|delete)\s+(.+)$").unwrap());

/// A parsed spoken intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Launch an app by spoken name.
    Open(String),
    /// Delete a configured alias target.
    Delete(String),
    /// List the available commands.
    Help,
}

/// Parse normalized text into an intent.
pub fn parse_intent(normalized: &str) -> Option<Intent> {
    if let Some(caps) = OPEN_PATTERN.captures(normalized) {
        return Some(Intent::Open(caps[1].trim().to_string()));
    }
    if let Some(caps) = DELETE_PATTERN.captures(normalized) {
        return Some(Intent::Delete(caps[1].trim().to_string()));
    }
    if normalized == "aide" || normalized == "help" {
        return Some(Intent::Help);
    }
    None
}

/// Mutable matching context: configuration plus the cooldown clock.
#[derive(Debug, Clone)]
pub struct IntentContext {
    /// Expanded app map (see [`crate::apps::build_apps_map`]).
    pub apps: HashMap<String, String>,
    /// Base directory the deleter may not escape.
    pub delete_base_dir: PathBuf,
    /// Normalized alias -> target path map for deletion.
    pub delete_aliases: HashMap<String, String>,
    /// Fuzzy-match thresholds.
    pub thresholds: MatchThresholds,
    /// Minimum gap between two executed actions.
    pub cooldown: Duration,
    last_action: Option<Instant>,
}

impl IntentContext {
    pub fn new(
        apps: HashMap<String, String>,
        delete_base_dir: PathBuf,
        delete_aliases: HashMap<String, String>,
        thresholds: MatchThresholds,
        cooldown: Duration,
    ) -> Self {
        Self {
            apps,
            delete_base_dir,
            delete_aliases: delete_aliases
                .into_iter()
                .map(|(k, v)| (normalize_text(&k), v))
                .collect(),
            thresholds,
            cooldown,
            last_action: None,
        }
    }

    /// Gate against double-triggered utterances; arms the clock on success.
    pub fn cooldown_ok(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_action {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_action = Some(now);
        true
    }
}

/// What an utterance should result in.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Launch the resolved app.
    Launch {
        spoken: String,
        app: ResolvedApp,
    },
    /// Delete this target (already alias-resolved, not yet path-checked).
    Delete { target: String },
    /// Print the command summary.
    Help,
    /// The open verb matched but no app resolved safely.
    UnknownApp { spoken: String },
    /// The delete verb matched but the alias is not configured.
    UnknownAlias { spoken: String },
    /// An action resolved but the cooldown suppressed it.
    Cooldown,
}

/// Resolve a spoken deletion alias: exact key, then containment either way.
fn resolve_delete_alias(spoken: &str, aliases: &HashMap<String, String>) -> Option<String> {
    let key = normalize_text(spoken);
    if let Some(target) = aliases.get(&key) {
        return Some(target.clone());
    }
    for (name, target) in aliases {
        if &key == name || name.contains(&key) || key.contains(name.as_str()) {
            return Some(target.clone());
        }
    }
    None
}

/// Classify a raw utterance. `None` means the text matched no intent at all.
pub fn classify(raw_text: &str, ctx: &mut IntentContext) -> Option<IntentOutcome> {
    let text = normalize_text(raw_text);
    if text.is_empty() {
        return None;
    }

    match parse_intent(&text)? {
        Intent::Open(spoken) => {
            let Some(resolved) = resolve_app(&spoken, &ctx.apps, ctx.thresholds) else {
                return Some(IntentOutcome::UnknownApp { spoken });
            };
            if !ctx.cooldown_ok() {
                return Some(IntentOutcome::Cooldown);
            }
            Some(IntentOutcome::Launch {
                spoken,
                app: resolved,
            })
        }
        Intent::Delete(spoken) => {
            let Some(target) = resolve_delete_alias(&spoken, &ctx.delete_aliases) else {
                return Some(IntentOutcome::UnknownAlias { spoken });
            };
            if !ctx.cooldown_ok() {
                return Some(IntentOutcome::Cooldown);
            }
            Some(IntentOutcome::Delete { target })
        }
        Intent::Help => Some(IntentOutcome::Help),
    }
}
