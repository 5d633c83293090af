//! hyprvoice — voice command dispatch and window tools for Hyprland.
//!
//! Subcommands:
//! - `maximize` — toggle the focused window between its geometry and the
//!   monitor's usable rectangle (the hotkey entry point; prints exactly
//!   `MAXIMIZED` or `RESTORED` and uses fixed exit codes).
//! - `intent` — classify and execute a transcribed utterance (the boundary
//!   a speech recognizer pipes text into).
//! - `launch` / `close` / `delete` — direct access to the same actions.

mod config;
mod store;
mod toggle;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use hyprvoice_compositor::{CompositorError, HyprctlClient};
use hyprvoice_voice::{
    actions, build_apps_map, classify, resolve_app, ExecResult, IntentContext, IntentOutcome,
    MatchThresholds,
};
use store::StateStore;
use toggle::run_toggle;

#[derive(Parser)]
#[command(name = "hyprvoice")]
#[command(author, version, about = "Voice command dispatch and window tools for Hyprland")]
struct Cli {
    /// Path to an explicit config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Toggle pseudo-maximize on the focused window
    Maximize,
    /// Classify and execute a transcribed utterance
    Intent {
        /// The transcribed words
        text: Vec<String>,
    },
    /// Resolve an app name and launch it
    Launch {
        /// The (possibly misheard) app name
        app: Vec<String>,
    },
    /// Resolve an app name and close its process
    Close {
        /// The (possibly misheard) app name
        app: Vec<String>,
    },
    /// Delete a configured alias target (scoped to the base directory)
    Delete {
        /// The spoken alias
        alias: Vec<String>,
    },
}

fn init_logging(config: &Config) -> Result<()> {
    let log_level = match config.behavior.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // default fallback for invalid values
    };
    // stdout carries only the machine-readable status token
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn make_client(config: &Config) -> Result<HyprctlClient, CompositorError> {
    HyprctlClient::with_timeout(Duration::from_millis(config.compositor.timeout_ms))
}

fn intent_context(config: &Config) -> IntentContext {
    IntentContext::new(
        build_apps_map(&config.apps),
        PathBuf::from(&config.delete.base_dir),
        config.delete.aliases.clone(),
        MatchThresholds {
            score: config.matching.threshold,
            short_score: config.matching.short_threshold,
            min_len: config.matching.min_len,
        },
        Duration::from_millis(config.matching.cooldown_ms),
    )
}

async fn run_maximize(config: &Config) -> i32 {
    let client = match make_client(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("hyprvoice: {e}");
            return 1;
        }
    };
    let store = StateStore::new();

    match run_toggle(&client, &store).await {
        Ok(outcome) => {
            println!("{}", outcome.status_token());
            0
        }
        Err(e) => {
            eprintln!("hyprvoice: {e}");
            e.exit_code()
        }
    }
}

/// Execute a launch through the compositor, annotating fuzzy guesses the
/// way the voice loop reports them.
async fn launch_app(
    client: &HyprctlClient,
    spoken: &str,
    app: &hyprvoice_voice::ResolvedApp,
) -> ExecResult {
    let result = match client.exec(&app.command).await {
        Ok(()) => ExecResult::ok(format!("Launched: {}", app.command)),
        Err(e) => ExecResult::fail(format!("Launch error: {e}")),
    };
    if app.exact {
        return result;
    }
    let verb = if result.ok { "guessed" } else { "tried" };
    ExecResult {
        ok: result.ok,
        message: format!(
            "{} ({}: '{}' -> '{}', score={:.2})",
            result.message, verb, spoken, app.name, app.score
        ),
    }
}

async fn run_intent(config: &Config, text: &str) -> i32 {
    let mut ctx = intent_context(config);
    let Some(outcome) = classify(text, &mut ctx) else {
        return 0; // not a command; stay quiet
    };

    let result = match outcome {
        IntentOutcome::Launch { spoken, app } => match make_client(config) {
            Ok(client) => launch_app(&client, &spoken, &app).await,
            Err(e) => ExecResult::fail(format!("Launch error: {e}")),
        },
        IntentOutcome::Delete { target } => {
            actions::safe_delete(&target, &ctx.delete_base_dir)
        }
        IntentOutcome::Help => ExecResult::ok(
            "Commands: 'ouvre <app>' | 'lance <app>' | 'supprime <alias>' (apps: fuzzy match)",
        ),
        IntentOutcome::UnknownApp { spoken } => {
            ExecResult::fail(format!("Unknown app: {spoken}"))
        }
        IntentOutcome::UnknownAlias { spoken } => {
            ExecResult::fail(format!("Unknown delete alias: {spoken}"))
        }
        IntentOutcome::Cooldown => return 0,
    };

    println!("{}", result.message);
    if config.notifications.enabled {
        actions::push_notification(
            "Voice",
            &result.message,
            result.ok,
            config.notifications.timeout_ms,
        )
        .await;
    }
    if result.ok {
        0
    } else {
        1
    }
}

async fn run_launch(config: &Config, spoken: &str) -> i32 {
    let ctx = intent_context(config);
    let Some(app) = resolve_app(spoken, &ctx.apps, ctx.thresholds) else {
        eprintln!("hyprvoice: unknown app: {spoken}");
        return 1;
    };
    let result = match make_client(config) {
        Ok(client) => launch_app(&client, spoken, &app).await,
        Err(e) => ExecResult::fail(format!("Launch error: {e}")),
    };
    println!("{}", result.message);
    if result.ok {
        0
    } else {
        1
    }
}

async fn run_close(config: &Config, spoken: &str) -> i32 {
    let ctx = intent_context(config);
    // Close the configured command when the name resolves; otherwise try
    // the spoken text as a process name directly.
    let command = resolve_app(spoken, &ctx.apps, ctx.thresholds)
        .map(|app| app.command)
        .unwrap_or_else(|| spoken.to_string());
    let result = actions::close_app(&command).await;
    println!("{}", result.message);
    if result.ok {
        0
    } else {
        1
    }
}

async fn run_delete(config: &Config, spoken: &str) -> i32 {
    let mut ctx = intent_context(config);
    // Reuse the intent path so alias containment matching stays identical
    let result = match classify(&format!("supprime {spoken}"), &mut ctx) {
        Some(IntentOutcome::Delete { target }) => {
            actions::safe_delete(&target, &ctx.delete_base_dir)
        }
        _ => ExecResult::fail(format!("Unknown delete alias: {spoken}")),
    };
    println!("{}", result.message);
    if result.ok {
        0
    } else {
        1
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("hyprvoice: {e:#}. Using defaults.");
        Config::default()
    });

    if let Err(e) = init_logging(&config) {
        eprintln!("hyprvoice: failed to initialize logging: {e}");
    }

    let code = match cli.command {
        Commands::Maximize => run_maximize(&config).await,
        Commands::Intent { text } => run_intent(&config, &text.join(" ")).await,
        Commands::Launch { app } => run_launch(&config, &app.join(" ")).await,
        Commands::Close { app } => run_close(&config, &app.join(" ")).await,
        Commands::Delete { alias } => run_delete(&config, &alias.join(" ")).await,
    };

    if code != 0 {
        warn!("exiting with code {}", code);
    }
    std::process::exit(code);
}
