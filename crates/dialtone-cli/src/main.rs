//! `dialtone`: operator tools for a running Dialtone server.
//!
//! # Usage
//!
//! ```text
//! dialtone dashboard --url http://localhost:5000
//! dialtone dashboard --config dialtone.toml
//! dialtone setup --output dialtone.toml
//! ```

mod app;
mod client;
mod setup;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Args, Parser, Subcommand};
use client::ApiClient;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use dialtone_core::credentials::Credentials;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use setup::{Prompter, SetupFile};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dialtone", version, about = "Dialtone operator tools")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Live view of the calls a server is handling.
  Dashboard(DashboardArgs),
  /// Interactively write carrier credentials to a config file.
  Setup(SetupArgs),
}

#[derive(Args, Debug)]
struct DashboardArgs {
  /// Path to the server's TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the dialtone server (default: http://localhost:<port>).
  #[arg(long, env = "DIALTONE_URL")]
  url: Option<String>,
}

#[derive(Args, Debug)]
struct SetupArgs {
  /// Where to write the settings.
  #[arg(short, long, value_name = "FILE", default_value = "dialtone.toml")]
  output: PathBuf,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// The parts of the server's config file the dashboard cares about.
#[derive(Deserialize)]
#[serde(default)]
struct ConfigFile {
  port:             u16,
  max_active_calls: usize,
}

impl Default for ConfigFile {
  fn default() -> Self {
    Self {
      port:             5000,
      max_active_calls: 20,
    }
  }
}

fn read_config(path: Option<&PathBuf>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  match cli.command {
    Command::Dashboard(args) => dashboard(args).await,
    Command::Setup(args) => run_setup(args),
  }
}

fn run_setup(args: SetupArgs) -> Result<()> {
  // Logs go to stderr so they don't interleave with the prompts.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let mut config: toml::Table = match std::fs::read_to_string(&args.output) {
    Ok(raw) => toml::from_str(&raw)
      .with_context(|| format!("parsing {}", args.output.display()))?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => toml::Table::new(),
    Err(e) => {
      return Err(e)
        .with_context(|| format!("reading {}", args.output.display()));
    }
  };
  let SetupFile {
    base_url: file_url,
    twilio: file_creds,
  } = SetupFile::from_table(&config);
  let existing = Credentials::from_env().or(file_creds);
  let existing_url = std::env::var("BASE_URL").ok().or(file_url);

  let stdin = io::stdin();
  let mut prompt = Prompter::new(stdin.lock(), io::stdout());
  let settings =
    setup::run(&mut prompt, &existing, existing_url.as_deref())?;
  let Some(settings) = settings else {
    return Ok(());
  };

  settings.merge_into(&mut config)?;
  let text = toml::to_string_pretty(&config).context("serialising settings")?;
  std::fs::write(&args.output, text)
    .with_context(|| format!("writing {}", args.output.display()))?;
  prompt.say(&format!("Settings written to {}.", args.output.display()))?;
  prompt.say("Restart dialtone-server for them to take effect.")?;
  Ok(())
}

async fn dashboard(args: DashboardArgs) -> Result<()> {
  let file_cfg = read_config(args.config.as_ref())?;
  let url = args
    .url
    .unwrap_or_else(|| format!("http://localhost:{}", file_cfg.port));

  let client = ApiClient::new(url)?;
  let mut app = App::new(client, file_cfg.max_active_calls);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    if app.refresh_due() {
      app.refresh().await;
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(100))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
