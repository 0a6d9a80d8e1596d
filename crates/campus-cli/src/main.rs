//! `campus`, a terminal client for the school-administration backend.
//!
//! # Usage
//!
//! ```
//! campus --url http://localhost:5000 --role librarian
//! campus tui --resource library
//! campus list fees
//! campus show students 65f1c0ffee
//! campus --config ~/.config/campus.toml delete library 65f1c0ffee
//! ```

mod app;
mod form;
mod notify;
mod screen;
mod settings;
mod table;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::{App, ResourceKind};
use campus_client::{ApiClient, ResourceBackend};
use campus_core::{
  fee::FeeRecord,
  library::LibraryRecord,
  resource::{RecordId, Resource},
  role::Role,
  staff::StaffMember,
  student::Student,
};
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notify::Notifier;
use ratatui::{Terminal, backend::CrosstermBackend};
use screen::ScreenContext;
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", about = "Terminal client for the school-administration backend")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:5000).
  #[arg(long, env = "CAMPUS_URL")]
  url: Option<String>,

  /// Role of the signed-in user: admin, staff, librarian or student.
  #[arg(long)]
  role: Option<Role>,

  /// Write logs to this file. In TUI mode logs are dropped without one.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Interactive screens (default).
  Tui {
    /// Tab to open first.
    #[arg(long, value_enum, default_value = "students")]
    resource: ResourceKind,
  },
  /// Print a resource table.
  List {
    #[arg(value_enum)]
    resource: ResourceKind,
  },
  /// Print one record as JSON.
  Show {
    #[arg(value_enum)]
    resource: ResourceKind,
    id:       String,
  },
  /// Delete one record.
  Delete {
    #[arg(value_enum)]
    resource: ResourceKind,
    id:       String,
  },
}

/// Run `$body` with `$r` bound to the record type for `$kind`.
macro_rules! with_resource {
  ($kind:expr, $r:ident => $body:expr) => {
    match $kind {
      ResourceKind::Students => {
        type $r = Student;
        $body
      }
      ResourceKind::Library => {
        type $r = LibraryRecord;
        $body
      }
      ResourceKind::Staff => {
        type $r = StaffMember;
        $body
      }
      ResourceKind::Fees => {
        type $r = FeeRecord;
        $body
      }
    }
  };
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let command = args.command.unwrap_or(Command::Tui { resource: ResourceKind::Students });

  let settings = Settings::load(
    args.config,
    Overrides { base_url: args.url, role: args.role, log_file: args.log_file },
  )?;
  init_tracing(matches!(command, Command::Tui { .. }), settings.log_file.as_deref())?;

  let client = ApiClient::new(settings.api()).context("building HTTP client")?;
  let role = settings.role;
  tracing::info!(base_url = %settings.base_url, %role, "starting");

  match command {
    Command::Tui { resource } => run_tui(client, &settings, resource).await,
    Command::List { resource } => with_resource!(resource, R => list::<R>(&client, role).await),
    Command::Show { resource, id } => with_resource!(resource, R => show::<R>(&client, &id).await),
    Command::Delete { resource, id } => {
      with_resource!(resource, R => delete::<R>(&client, role, &id).await)
    }
  }
}

/// Logs go to stderr, or to `log_file` when given. The TUI owns the
/// terminal, so without a file it logs nothing.
fn init_tracing(tui: bool, log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None if tui => {}
    None => tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init(),
  }
  Ok(())
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn list<R: Resource>(client: &ApiClient, role: Role) -> Result<()> {
  let snapshot = client.list::<R>().await?;
  if snapshot.rejected > 0 {
    eprintln!("warning: skipped {} malformed record(s)", snapshot.rejected);
  }
  let view = table::render(&snapshot.records, role, &R::columns());
  println!("{}", R::TITLE);
  print!("{}", view.to_text());
  Ok(())
}

async fn show<R: Resource>(client: &ApiClient, id: &str) -> Result<()> {
  let record = client.get::<R>(&RecordId::from(id)).await?;
  println!("{}", serde_json::to_string_pretty(&record).context("encoding record")?);
  Ok(())
}

async fn delete<R: Resource>(client: &ApiClient, role: Role, id: &str) -> Result<()> {
  if R::is_read_only(role) {
    bail!("the {role} role cannot delete {} records", R::COLLECTION);
  }
  let ack = client.delete::<R>(&RecordId::from(id)).await?;
  println!("{}", ack.message.unwrap_or_else(|| format!("{} deleted successfully", R::NOUN)));
  Ok(())
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(client: ApiClient, settings: &Settings, start: ResourceKind) -> Result<()> {
  let ctx = ScreenContext {
    role:        settings.role,
    notifier:    Notifier::new(settings.toast_ttl()),
    close_delay: settings.close_delay(),
  };
  let mut app = App::new(Arc::new(client), ctx, start);

  // Set up the terminal.
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

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.pump();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests;
