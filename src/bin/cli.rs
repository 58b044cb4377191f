//! Fellowship CLI
//!
//! One-shot commands against the attendance backend:
//! - List, add and remove members
//! - Show or start the active session
//! - Show live attendance
//! - Register attendance from a scanned link
//! - Generate a default config file

use clap::{Parser, Subcommand, ValueEnum};
use fellowship_attendance::config::generate_default_config;
use fellowship_attendance::render::{AttendanceList, MemberList, MessageLine, SessionView};
use fellowship_attendance::{
    logging, AttendanceViewModel, Config, HttpAttendanceApi, MemberId, MessageKind, NewMember,
    Outcome, RegistrationForm, UiMessage,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fellowship-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage fellowship members, sessions and attendance")]
#[command(long_about = "Fellowship Attendance CLI.\nTalks to the attendance backend configured in fellowship.toml or FELLOWSHIP_* variables.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./fellowship.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all members
    Members,

    /// Add a member
    AddMember {
        /// Full name
        #[arg(short, long)]
        name: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Remove a member by id
    RemoveMember {
        /// Member id (see `members`)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the active session and its scan link
    Session,

    /// Start a new session, ending the current one
    NewSession {
        /// Session name, e.g. "Sunday Service"
        name: String,
    },

    /// Show live attendance for the current session
    Attendance,

    /// Register attendance through a session's scan link
    Scan {
        /// Scanned link, e.g. https://example.org/attend/<session-id>
        link: String,
        /// Phone number
        #[arg(short, long)]
        phone: String,
        /// Name (first visit only)
        #[arg(short, long)]
        name: Option<String>,
        /// Email (first visit only)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = logging::bootstrap(|| Config::resolve(cli.config.as_deref()))?;
    if let Some(url) = &cli.base_url {
        config.backend.base_url = url.clone();
        config.validate()?;
    }
    logging::init(&config.logging);

    let api = Arc::new(HttpAttendanceApi::new(&config.backend)?);
    let dashboard = AttendanceViewModel::from_config(Arc::clone(&api), &config.dashboard);

    let ok = match cli.command {
        Commands::Members => {
            dashboard.refresh_members().await;
            let snapshot = dashboard.snapshot().await;
            report_error(snapshot.message.as_ref())
                && output(cli.format, &snapshot.members, || {
                    MemberList(&snapshot.members).to_string()
                })?
        }

        Commands::AddMember { name, email, phone } => {
            let mut draft = NewMember::new(name, email);
            draft.phone = phone;
            dashboard.set_member_draft(draft).await;
            let outcome = dashboard.create_member().await;
            report(outcome, dashboard.message().await)
        }

        Commands::RemoveMember { id, yes } => {
            let confirm = |prompt: &str| yes || ask(prompt);
            let outcome = dashboard.remove_member(&MemberId::new(id), &confirm).await;
            if outcome == Outcome::Skipped {
                println!("Cancelled");
            }
            report(outcome, dashboard.message().await)
        }

        Commands::Session => {
            dashboard.refresh_active_session().await;
            let snapshot = dashboard.snapshot().await;
            if !report_error(snapshot.message.as_ref()) {
                false
            } else {
                match &snapshot.active_session {
                    Some(session) => output(cli.format, session, || {
                        format!(
                            "{}{} members | {} present | {} first-time\n",
                            SessionView::new(session, &config.dashboard.scan_base_url),
                            snapshot.stats.total_members,
                            snapshot.stats.present_count,
                            snapshot.stats.first_time_count
                        )
                    })?,
                    None => {
                        println!("No active session");
                        true
                    }
                }
            }
        }

        Commands::NewSession { name } => {
            dashboard.set_session_name_draft(name).await;
            let outcome = dashboard.create_session().await;
            if outcome.is_completed() {
                let snapshot = dashboard.snapshot().await;
                if let Some(session) = &snapshot.active_session {
                    print!(
                        "{}",
                        SessionView::new(session, &config.dashboard.scan_base_url)
                    );
                }
            }
            report(outcome, dashboard.message().await)
        }

        Commands::Attendance => {
            tokio::join!(
                dashboard.refresh_active_session(),
                dashboard.refresh_attendance()
            );
            let snapshot = dashboard.snapshot().await;
            report_error(snapshot.message.as_ref())
                && output(cli.format, &snapshot.attendance, || {
                    format!(
                        "{}{} Present | {} Absent | {} First-Time\n",
                        AttendanceList(&snapshot.attendance),
                        snapshot.present_count(),
                        snapshot.absent_count(),
                        snapshot.stats.first_time_count
                    )
                })?
        }

        Commands::Scan {
            link,
            phone,
            name,
            email,
        } => {
            let form = RegistrationForm::from_link(api, &link);
            form.set_phone(phone).await;
            if let Some(name) = name {
                form.set_name(name).await;
            }
            if let Some(email) = email {
                form.set_email(email).await;
            }
            let outcome = form.submit().await;
            report(outcome, form.message().await)
        }

        Commands::Config { .. } => true,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print a value as JSON or as its table rendering
fn output<T: Serialize>(
    format: Format,
    value: &T,
    table: impl FnOnce() -> String,
) -> anyhow::Result<bool> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Table => print!("{}", table()),
    }
    Ok(true)
}

/// Print an error banner to stderr; true when there was none
fn report_error(message: Option<&UiMessage>) -> bool {
    match message {
        Some(message) if message.kind == MessageKind::Error => {
            eprint!("{}", MessageLine(message));
            false
        }
        _ => true,
    }
}

fn report(outcome: Outcome, message: Option<UiMessage>) -> bool {
    if let Some(message) = &message {
        if message.kind == MessageKind::Error {
            eprint!("{}", MessageLine(message));
        } else {
            print!("{}", MessageLine(message));
        }
    }
    matches!(outcome, Outcome::Completed | Outcome::Skipped)
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
