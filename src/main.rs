use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actions;
mod config;
mod error;
mod filter;
mod fixtures;
mod format;
mod group;
mod models;
mod paginate;
mod policy;
mod report;
mod views;

use actions::LoggingActions;
use config::{parse_closed, parse_timestamp, PreviewConfig};
use models::{StaffRoleType, SyncSource, SyncStatus};
use views::{ActionsView, ErrorViewMode, ErrorsView, FilterChange, SyncLogsView};

#[derive(Parser)]
#[command(name = "sync-monitor")]
#[command(about = "Preview harness for the DrChrono / Deep Cura / Coda sync monitoring dashboard", long_about = None)]
struct Cli {
    /// Snapshot JSON to render instead of the bundled fixture
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Clock for relative times (RFC 3339), defaults to now
    #[arg(long, global = true, value_parser = parse_timestamp)]
    now: Option<DateTime<Utc>>,
    /// Act as this role instead of the snapshot's current user
    #[arg(long, global = true, value_parser = parse_closed::<StaffRoleType>)]
    role: Option<StaffRoleType>,
    #[arg(long, global = true)]
    page_size: Option<usize>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Severity,
    Source,
}

#[derive(Subcommand)]
enum Commands {
    /// Service health, 24h metrics and recent activity
    Overview,
    /// Browse sync logs with filters and pagination
    Logs {
        #[arg(long, value_parser = parse_closed::<SyncSource>)]
        source: Option<SyncSource>,
        #[arg(long, value_parser = parse_closed::<SyncStatus>)]
        status: Option<SyncStatus>,
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Show the detail panel of this log
        #[arg(long)]
        expand: Option<String>,
    },
    /// Unresolved errors and unlinked Deep Cura notes
    Errors {
        #[arg(long, value_enum, default_value = "severity")]
        group_by: GroupBy,
        #[arg(long)]
        expand: Option<String>,
    },
    /// Manual sync actions and running operations
    Actions,
    /// Alert events that still need attention and the configured rules
    Alerts,
    /// Staff with dashboard access by role
    Staff,
    /// Request a manual sync action; fires only with --confirm
    Trigger {
        action_id: String,
        #[arg(long)]
        confirm: bool,
    },
    /// Acknowledge an open error
    Ack { error_id: String },
    /// Retry the sync behind an error
    Retry { error_id: String },
    /// Resolve an error
    Resolve { error_id: String },
    /// Assign an error to a team member
    Assign { error_id: String, assignee: String },
    /// Add a triage note to an error
    Note { error_id: String, text: String },
    /// Link a Deep Cura note to a clinical note
    Link {
        note_id: String,
        clinical_note_id: String,
    },
    /// Dismiss an unlinked Deep Cura note
    Dismiss { note_id: String, reason: String },
    /// Check the snapshot against the model invariants
    Validate,
    /// Replace the snapshot's sync logs with a CSV export and browse them
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write every view into one markdown file
    Report {
        #[arg(long, default_value = "sync-monitor.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sync_monitor=debug"
    } else {
        "sync_monitor=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PreviewConfig::resolve(cli.snapshot, cli.now, cli.role, cli.page_size);

    let mut snapshot = fixtures::load_or_sample(config.snapshot_path.as_deref())
        .context("failed to load monitoring snapshot")?;
    if !matches!(cli.command, Commands::Validate | Commands::Import { .. }) {
        fixtures::warn_violations(&snapshot);
    }
    let user = config.user(&snapshot.current_user);
    let mut actions = LoggingActions;

    match cli.command {
        Commands::Overview => {
            let view = views::overview(&snapshot, config.now);
            print!("{}", report::render_overview(&view));
        }
        Commands::Logs {
            source,
            status,
            table,
            from,
            to,
            search,
            page,
            expand,
        } => {
            let mut view = SyncLogsView::new(config.page_size);
            let changes = [
                source.map(|s| FilterChange::Source(Some(s))),
                status.map(|s| FilterChange::Status(Some(s))),
                table.map(FilterChange::TableName),
                from.map(|d| FilterChange::DateFrom(Some(d))),
                to.map(|d| FilterChange::DateTo(Some(d))),
            ];
            for change in changes.into_iter().flatten() {
                view.change_filter(change, &mut actions);
            }
            if let Some(query) = search {
                view.search(&query, &mut actions);
            }
            view.go_to_page(page, &snapshot.sync_logs);
            if let Some(id) = expand {
                view.toggle(&id);
                view.view_log(&id, &mut actions);
            }
            print!("{}", report::render_sync_logs(&view.project(&snapshot.sync_logs)));
        }
        Commands::Errors { group_by, expand } => {
            let mut view = ErrorsView::default();
            view.set_mode(match group_by {
                GroupBy::Severity => ErrorViewMode::Severity,
                GroupBy::Source => ErrorViewMode::Source,
            });
            if let Some(id) = expand {
                view.toggle(&id);
            }
            let projection = view.project(
                &snapshot.sync_errors,
                &snapshot.unlinked_deep_cura_notes,
                &user,
            );
            print!("{}", report::render_errors(&projection, config.now));
        }
        Commands::Actions => {
            let projection = ActionsView::default().project(
                &snapshot.sync_actions,
                &snapshot.running_sync_operations,
                &user,
                config.now,
            );
            print!("{}", report::render_actions(&projection));
        }
        Commands::Alerts => {
            print!("{}", report::render_alerts(&snapshot, config.now));
        }
        Commands::Staff => {
            print!("{}", report::render_staff(&snapshot));
        }
        Commands::Trigger { action_id, confirm } => {
            let mut view = ActionsView::default();
            let action = view.request(
                &snapshot.sync_actions,
                &snapshot.running_sync_operations,
                &action_id,
                &user,
            )?;
            println!("{}", action.confirmation_message);
            if confirm {
                let triggered = view.confirm(&mut actions)?;
                println!("Triggered {triggered}.");
            } else {
                view.cancel();
                println!("Not triggered; pass --confirm to run it.");
            }
        }
        Commands::Ack { error_id } => {
            ErrorsView::default().acknowledge(&snapshot.sync_errors, &error_id, &user, &mut actions)?;
            println!("Acknowledge requested for {error_id}.");
        }
        Commands::Retry { error_id } => {
            ErrorsView::default().retry(&snapshot.sync_errors, &error_id, &user, &mut actions)?;
            println!("Retry requested for {error_id}.");
        }
        Commands::Resolve { error_id } => {
            ErrorsView::default().resolve(&snapshot.sync_errors, &error_id, &user, &mut actions)?;
            println!("Resolve requested for {error_id}.");
        }
        Commands::Assign { error_id, assignee } => {
            ErrorsView::default().assign(
                &snapshot.sync_errors,
                &error_id,
                &assignee,
                &user,
                &mut actions,
            )?;
            println!("Assignment of {error_id} to {assignee} requested.");
        }
        Commands::Note { error_id, text } => {
            ErrorsView::default().add_note(&snapshot.sync_errors, &error_id, &text, &user, &mut actions)?;
            println!("Note on {error_id} submitted.");
        }
        Commands::Link {
            note_id,
            clinical_note_id,
        } => {
            ErrorsView::default().link_note(
                &snapshot.unlinked_deep_cura_notes,
                &note_id,
                &clinical_note_id,
                &user,
                &mut actions,
            )?;
            println!("Link of {note_id} to {clinical_note_id} requested.");
        }
        Commands::Dismiss { note_id, reason } => {
            ErrorsView::default().dismiss_note(
                &snapshot.unlinked_deep_cura_notes,
                &note_id,
                &reason,
                &user,
                &mut actions,
            )?;
            println!("Dismissal of {note_id} requested.");
        }
        Commands::Validate => {
            let violations = fixtures::validate_snapshot(&snapshot);
            if violations.is_empty() {
                println!("Snapshot satisfies all invariants.");
            } else {
                for violation in &violations {
                    println!("- {violation}");
                }
                warn!(count = violations.len(), "snapshot has invariant violations");
            }
        }
        Commands::Import { csv } => {
            snapshot.sync_logs = fixtures::import_sync_logs_csv(&csv)
                .with_context(|| format!("failed to import {}", csv.display()))?;
            println!(
                "Imported {} sync logs from {}.",
                snapshot.sync_logs.len(),
                csv.display()
            );
            fixtures::warn_violations(&snapshot);
            let view = SyncLogsView::new(config.page_size);
            print!("{}", report::render_sync_logs(&view.project(&snapshot.sync_logs)));
        }
        Commands::Report { out } => {
            let report = report::build_report(&snapshot, &user, config.now);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
