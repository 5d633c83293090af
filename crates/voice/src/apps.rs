//! App-name resolution against the configured app map.
//!
//! The map is expanded with many normalized aliases per app so that typical
//! recognizer mis-hearings still resolve; anything that slips past the alias
//! net goes through a fuzzy score with a configurable launch threshold.

use std::collections::{BTreeSet, HashMap};

use crate::text::{normalize_text, similarity, skeleton, strip_fillers};

/// French articles prepended to app names in speech ("ouvre le firefox").
const APP_ARTICLES: &[&str] = &[
    "le", "la", "les", "un", "une", "du", "de", "des", "mon", "ma", "mes",
];

/// Generic role words that may be spoken with or without the app name.
const ROLE_WORDS: &[&str] = &[
    "browser",
    "navigateur",
    "client",
    "launcher",
    "slicer",
    "sliceur",
    "editor",
    "editeur",
];

/// Thresholds guarding fuzzy app launches.
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    /// Minimum fuzzy score to launch at all.
    pub score: f64,
    /// Stricter score required for very short spoken inputs.
    pub short_score: f64,
    /// Inputs shorter than this use `short_score`.
    pub min_len: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            score: 0.72,
            short_score: 0.90,
            min_len: 4,
        }
    }
}

/// An app resolved from spoken input.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedApp {
    /// The map key that matched.
    pub name: String,
    /// The launch command.
    pub command: String,
    /// Match score in `[0, 1]`.
    pub score: f64,
    /// Whether the spoken input matched a key verbatim.
    pub exact: bool,
}

/// Build the normalized app map with generated aliases.
///
/// Explicit user keys are normalized but never overwritten; each app then
/// contributes a large set of extra alias keys for mis-hearing tolerance.
pub fn build_apps_map(apps_cfg: &HashMap<String, String>) -> HashMap<String, String> {
    let mut explicit: HashMap<String, String> = HashMap::new();
    for (name, cmd) in apps_cfg {
        let key = normalize_text(name);
        if !key.is_empty() {
            explicit.insert(key, cmd.clone());
        }
    }

    let mut expanded = explicit.clone();
    for (canonical, cmd) in &explicit {
        for alias in app_aliases(canonical) {
            expanded.entry(alias).or_insert_with(|| cmd.clone());
        }
    }
    expanded
}

/// Singular/plural variants of one token.
fn plural_toggle(token: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    out.insert(token.to_string());
    if token.len() > 2 {
        if let Some(stripped) = token.strip_suffix('s') {
            out.insert(stripped.to_string());
        } else {
            out.insert(format!("{token}s"));
        }
    }
    out
}

/// Cartesian product of per-token plural variants.
fn token_variants(tokens: &[&str]) -> BTreeSet<String> {
    let mut combos: Vec<Vec<String>> = vec![Vec::new()];
    for token in tokens {
        let choices = plural_toggle(token);
        let mut next = Vec::new();
        for prefix in &combos {
            for choice in &choices {
                let mut combo = prefix.clone();
                combo.push(choice.clone());
                next.push(combo);
            }
        }
        combos = next;
    }
    combos.into_iter().map(|c| c.join(" ")).collect()
}

/// Generate alias keys for one canonical app key.
fn app_aliases(canonical: &str) -> BTreeSet<String> {
    let key = normalize_text(canonical);
    if key.is_empty() {
        return BTreeSet::new();
    }
    let tokens: Vec<&str> = key.split_whitespace().collect();
    let mut variants: BTreeSet<String> = BTreeSet::new();

    variants.insert(key.clone());
    variants.insert(key.replace(' ', ""));

    for article in APP_ARTICLES {
        variants.insert(format!("{article} {key}"));
    }

    variants.extend(token_variants(&tokens));

    // Accept the name without generic role words ("brave browser" -> "brave")
    let base_tokens: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !ROLE_WORDS.contains(t))
        .collect();
    let base = if base_tokens.is_empty() {
        key.clone()
    } else {
        base_tokens.join(" ")
    };
    if base != key {
        variants.insert(base.clone());
        variants.insert(base.replace(' ', ""));
    }

    let is_browser = matches!(key.as_str(), "firefox" | "chromium" | "brave" | "brave browser")
        || tokens.contains(&"browser")
        || tokens.contains(&"navigateur");
    if is_browser {
        for word in ["browser", "navigateur", "navigateur web"] {
            variants.insert(format!("{base} {word}"));
            variants.insert(format!("{word} {base}"));
        }
    }

    if key.contains("slicer") || key.contains("sliceur") {
        for word in ["slicer", "sliceur"] {
            variants.insert(format!("{base} {word}"));
            variants.insert(format!("{word} {base}"));
        }
    }

    if tokens.len() >= 2 {
        variants.insert(tokens[0].to_string());
        variants.insert(tokens[..2].join(" "));
        variants.insert(tokens[tokens.len() - 2..].join(" "));
    }

    // High-value aliases for apps the recognizer mangles the most
    let extra: &[&str] = match key.as_str() {
        "chromium" => &["chrome", "google chrome", "chrom"],
        "brave" | "brave browser" => &["brave", "brave navigateur", "navigateur brave"],
        "lunar client" | "lunar-client" | "lunarclient" | "lunar" => &[
            "lunar",
            "lunar clients",
            "lunare client",
            "lunare cliants",
            "lunaire client",
        ],
        "prism launcher" | "prismlauncher" => &["prism", "prisme launcher", "prisme", "prismlauncher"],
        "prusa slicer" | "prusa" => &["prusa", "prusa sliceur", "prusa slicer"],
        "orca slicer" | "orca" => &["orca", "orca sliceur", "orca slicer"],
        "libreoffice" | "libre office" => &[
            "libreoffice",
            "libre office",
            "libre office writer",
            "libre office calc",
        ],
        "onlyoffice" | "only office" => &[
            "onlyoffice",
            "only office",
            "onmly office",
            "only ofice",
            "only ofis",
        ],
        "discord" => &["discorde", "discor", "dis code"],
        "shotcut" => &["shot cut", "shotcut", "short cut"],
        _ => &[],
    };
    for alias in extra {
        variants.insert((*alias).to_string());
    }

    variants
        .into_iter()
        .map(|v| normalize_text(&v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Token-set Jaccard overlap.
fn token_jaccard(a: &str, b: &str) -> f64 {
    let sa: BTreeSet<&str> = a.split_whitespace().collect();
    let sb: BTreeSet<&str> = b.split_whitespace().collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count() as f64;
    let union = sa.union(&sb).count() as f64;
    inter / union
}

/// Lightweight fuzzy score in `[0, 1]` between spoken input and an app key.
///
/// Mostly char-level similarity with token overlap as a stabilizer; strong
/// char similarity is never penalized just because tokenization differs
/// ("fire fox" vs "firefox").
pub fn app_match_score(spoken_key: &str, app_key: &str) -> f64 {
    if spoken_key.is_empty() || app_key.is_empty() {
        return 0.0;
    }

    let spoken = strip_fillers(spoken_key);
    if spoken.is_empty() {
        return 0.0;
    }
    let app = normalize_text(app_key);

    let base: f64 = if spoken.len() >= 4 && (app.contains(&spoken) || spoken.contains(&app)) {
        0.88
    } else {
        0.0
    };

    let spoken_nospace = spoken.replace(' ', "");
    let app_nospace = app.replace(' ', "");
    let skel_sim = similarity(&skeleton(&spoken), &skeleton(&app));
    let char_sim = similarity(&spoken, &app)
        .max(similarity(&spoken_nospace, &app_nospace))
        .max(skel_sim);
    let jaccard = token_jaccard(&spoken, &app);

    let combined = 0.80 * char_sim + 0.20 * jaccard;
    base.max(combined).max(char_sim)
}

/// Resolve spoken input to an app, or `None` when nothing matches safely.
pub fn resolve_app(
    app_spoken: &str,
    apps: &HashMap<String, String>,
    thresholds: MatchThresholds,
) -> Option<ResolvedApp> {
    let key = normalize_text(app_spoken);
    if key.is_empty() {
        return None;
    }

    let key_clean = strip_fillers(&key);
    let mut candidates = vec![key.clone()];
    if !key_clean.is_empty() && key_clean != key {
        candidates.push(key_clean.clone());
    }

    // Exact key hit
    for candidate in &candidates {
        if let Some(cmd) = apps.get(candidate) {
            return Some(ResolvedApp {
                name: candidate.clone(),
                command: cmd.clone(),
                score: 1.0,
                exact: candidate == &key,
            });
        }
    }

    // Containment (cheap and usually safe)
    for candidate in &candidates {
        for (name, cmd) in apps {
            if candidate == name
                || (candidate.len() >= 4 && (name.contains(candidate) || candidate.contains(name)))
            {
                return Some(ResolvedApp {
                    name: name.clone(),
                    command: cmd.clone(),
                    score: 0.90,
                    exact: false,
                });
            }
        }
    }

    // Fuzzy: best match above threshold
    let mut best: Option<ResolvedApp> = None;
    for candidate in &candidates {
        for (name, cmd) in apps {
            let score = app_match_score(candidate, name);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ResolvedApp {
                    name: name.clone(),
                    command: cmd.clone(),
                    score,
                    exact: false,
                });
            }
        }
    }
    let best = best?;

    // Avoid accidental launches on extremely short inputs
    let effective = if key_clean.is_empty() { &key } else { &key_clean };
    if effective.len() < thresholds.min_len && best.score < thresholds.short_score {
        return None;
    }
    if best.score < thresholds.score {
        return None;
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_apps_map_normalizes_keys() {
        let map = build_apps_map(&config(&[("Firefox", "firefox")]));
        assert_eq!(map.get("firefox"), Some(&"firefox".to_string()));
    }

    #[test]
    fn test_build_apps_map_never_overwrites_explicit_keys() {
        // "brave" generates a "brave browser" alias, but the user defined it
        let map = build_apps_map(&config(&[
            ("brave", "brave"),
            ("brave browser", "brave-browser --special"),
        ]));
        assert_eq!(
            map.get("brave browser"),
            Some(&"brave-browser --special".to_string())
        );
    }

    #[test]
    fn test_aliases_include_articles_and_joined_form() {
        let map = build_apps_map(&config(&[("lunar client", "lunar-client")]));
        assert!(map.contains_key("le lunar client"));
        assert!(map.contains_key("lunarclient"));
        assert!(map.contains_key("lunar"));
        assert!(map.contains_key("lunaire client"));
    }

    #[test]
    fn test_aliases_include_plural_toggles() {
        let map = build_apps_map(&config(&[("lunar client", "lunar-client")]));
        assert!(map.contains_key("lunar clients"));
    }

    #[test]
    fn test_aliases_strip_role_words() {
        let map = build_apps_map(&config(&[("brave browser", "brave")]));
        assert!(map.contains_key("brave"));
        assert!(map.contains_key("navigateur brave"));
    }

    #[test]
    fn test_resolve_exact() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        let hit = resolve_app("firefox", &map, MatchThresholds::default()).unwrap();
        assert!(hit.exact);
        assert_eq!(hit.score, 1.0);
        assert_eq!(hit.command, "firefox");
    }

    #[test]
    fn test_resolve_with_article() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        let hit = resolve_app("le firefox", &map, MatchThresholds::default()).unwrap();
        assert_eq!(hit.command, "firefox");
    }

    #[test]
    fn test_resolve_fuzzy_mishearing() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        let hit = resolve_app("fire foxe", &map, MatchThresholds::default()).unwrap();
        assert_eq!(hit.command, "firefox");
        assert!(!hit.exact);
        assert!(hit.score >= 0.72);
    }

    #[test]
    fn test_resolve_rejects_weak_match() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        assert!(resolve_app("spotify", &map, MatchThresholds::default()).is_none());
    }

    #[test]
    fn test_resolve_rejects_short_weak_input() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        assert!(resolve_app("fi", &map, MatchThresholds::default()).is_none());
    }

    #[test]
    fn test_resolve_empty_input() {
        let map = build_apps_map(&config(&[("firefox", "firefox")]));
        assert!(resolve_app("  ", &map, MatchThresholds::default()).is_none());
    }

    #[test]
    fn test_score_substring_boost() {
        assert!(app_match_score("prusa", "prusa slicer") >= 0.88);
    }

    #[test]
    fn test_score_empty_inputs() {
        assert_eq!(app_match_score("", "firefox"), 0.0);
        assert_eq!(app_match_score("le la de", "firefox"), 0.0);
    }
}
