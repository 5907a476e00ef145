use anyhow::{Context, Result};
use bubbles::app::{App, AppEvent};
use bubbles::config::Config;
use bubbles::host::{FixtureHost, HostApi};
use bubbles::selection::SelectionController;
use bubbles::ui;
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/bubbles/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("bubbles");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "bubbles", about = "Terminal chat client with a searchable chat sidebar")]
struct Args {
    /// Config file (default: ~/.config/bubbles/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serve chats from a JSON fixture file
    #[arg(long, value_name = "FILE", conflicts_with = "seed")]
    fixture: Option<PathBuf>,

    /// Use the built-in demo chats, ignoring any configured fixture
    #[arg(long)]
    seed: bool,
}

/// Log to a file in the config directory; the terminal belongs to the TUI.
fn init_tracing(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("bubbles.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_host(args: &Args, config: &Config) -> Result<Arc<dyn HostApi>> {
    let host = if args.seed {
        FixtureHost::seeded()
    } else {
        match args.fixture.as_ref().or(config.fixture.as_ref()) {
            Some(path) => FixtureHost::from_path(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?,
            None => {
                tracing::info!("No fixture configured, using built-in seed data");
                FixtureHost::seeded()
            }
        }
    };
    Ok(Arc::new(host.with_display_name(config.display_name.clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(&config_dir) {
            let mut perms = metadata.permissions();
            perms.set_mode(0o700);
            if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                eprintln!(
                    "Warning: failed to set permissions on {}: {}",
                    config_dir.display(),
                    e
                );
            }
        }
    }

    init_tracing(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), ?config, "Configuration loaded");

    let host = build_host(&args, &config)?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let (controller, chat_rx) = SelectionController::channel();
    let mut app = App::new(host, config, controller);

    ui::run(&mut app, event_tx, event_rx, chat_rx).await?;

    println!("Goodbye!");
    Ok(())
}
