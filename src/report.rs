use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::filter::filter_where;
use crate::format::{format_count, format_duration, format_relative_time, format_timestamp};
use crate::group::group_by;
use crate::policy::lowest_trigger_role;
use crate::models::{AlertEventStatus, ClosedEnum, CurrentUser, MonitoringSnapshot, SyncLog};
use crate::views::{
    overview, ActionsProjection, ActionsView, ErrorsProjection, ErrorsView, Overview, SyncLogPage,
    SyncLogsView,
};

pub fn render_overview(view: &Overview<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Sync Monitor");
    let _ = writeln!(output, "Last refreshed {}", view.last_refreshed);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Service Health");

    for card in &view.services {
        let service = card.service;
        let _ = writeln!(
            output,
            "- {} [{}] last sync {} ({}), {} records / {} errors in 24h",
            service.name,
            service.status.label(),
            card.last_sync,
            card.last_duration,
            format_count(service.records_synced_last24h),
            service.error_count_last24h
        );
        if let Some(webhooks) = service.webhooks_received_last24h {
            let _ = writeln!(output, "  - {} webhooks received", format_count(webhooks));
        }
        if let Some(warning) = &service.warning_message {
            let _ = writeln!(output, "  - warning: {warning}");
        }
    }

    let metrics = view.last24_hours;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Last 24 Hours");
    let _ = writeln!(
        output,
        "- Syncs: {} ({}% success, {} failed)",
        format_count(metrics.total_syncs),
        view.success_rate,
        metrics.failed_syncs
    );
    let _ = writeln!(
        output,
        "- Average latency: {}",
        format_duration(metrics.average_latency_ms)
    );
    let _ = writeln!(
        output,
        "- Records: {} created, {} updated",
        format_count(metrics.records_created),
        format_count(metrics.records_updated)
    );
    let _ = writeln!(
        output,
        "- Webhooks: {}, Coda pushes: {}",
        format_count(metrics.webhooks_received),
        format_count(metrics.coda_pushes)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Records in Database");
    for (label, count) in view.record_counts {
        let _ = writeln!(output, "- {label}: {}", format_count(count));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sync Activity (7 Days)");
    if view.chart.is_empty() {
        let _ = writeln!(output, "No sync activity recorded.");
    }
    for bar in &view.chart {
        let width = (bar.height_pct / 5.0).round() as usize;
        let _ = writeln!(
            output,
            "- {} {:<20} {} ok / {} failed ({:.1}% failed)",
            bar.date.format("%a"),
            "#".repeat(width),
            bar.successful,
            bar.failed,
            bar.failed_pct
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Errors");
    if view.errors.open == 0 {
        let _ = writeln!(output, "No open errors.");
    } else {
        let _ = writeln!(
            output,
            "{} open ({} critical, {} high)",
            view.errors.open, view.errors.open_critical, view.errors.open_high
        );
    }
    for (label, count) in &view.errors.by_type {
        let _ = writeln!(output, "- {label}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if view.activity.is_empty() {
        let _ = writeln!(output, "No sync activity recorded.");
    }
    for log in view.activity {
        let _ = writeln!(
            output,
            "- {} {} {} {} [{}] {}",
            log.started_at.format("%H:%M"),
            log.source.label(),
            log.operation.label(),
            log.table_name,
            log.status.label(),
            format_duration(log.duration_ms)
        );
    }

    output
}

pub fn render_sync_logs(page: &SyncLogPage<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Sync Logs");
    if page.rows.is_empty() {
        let _ = writeln!(output, "No sync logs match the current filters.");
        return output;
    }

    let _ = writeln!(output, "| Time | Source | Table | Records | Status | Duration |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for log in &page.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            format_timestamp(log.started_at),
            log.source.label(),
            log.table_name,
            log.records_total,
            log.status.label(),
            format_duration(log.duration_ms)
        );
    }

    if let Some((first, last)) = page.showing {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Showing {first}-{last} of {} logs (page {} of {})",
            page.matching, page.page, page.total_pages
        );
    }

    if let Some(log) = page.expanded {
        let _ = writeln!(output);
        render_log_detail(&mut output, log);
    }

    output
}

fn render_log_detail(output: &mut String, log: &SyncLog) {
    let _ = writeln!(output, "### {}", log.id);
    let _ = writeln!(
        output,
        "- Records: {} total | {} created | {} updated | {} failed",
        log.records_total, log.records_created, log.records_updated, log.records_failed
    );
    let _ = writeln!(output, "- Triggered by: {}", log.triggered_by.label());
    let _ = writeln!(output, "- Operation: {}", log.operation.label());
    if let Some(message) = &log.error_message {
        let _ = writeln!(output, "- Error: {message}");
    }
    if let Some(message) = &log.warning_message {
        let _ = writeln!(output, "- Warning: {message}");
    }
    if let Some(drchrono_id) = log.drchrono_id {
        let _ = writeln!(output, "- DrChrono ID: {drchrono_id}");
    }
    if let Some(note_id) = &log.clinical_note_id {
        let _ = writeln!(output, "- Clinical note: {note_id}");
    }
}

pub fn render_errors(projection: &ErrorsProjection<'_>, now: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Errors");
    let counts: Vec<String> = projection
        .unresolved_by_severity
        .iter()
        .map(|(severity, count)| format!("{} {count}", severity.label()))
        .collect();
    let _ = writeln!(output, "Unresolved: {}", counts.join(", "));

    for section in &projection.sections {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {} ({})", section.title, section.errors.len());
        if section.errors.is_empty() {
            let _ = writeln!(output, "Nothing here.");
        }
        for error in &section.errors {
            let _ = writeln!(
                output,
                "- {} [{}] {}: {} ({}, {} retries)",
                error.id,
                error.status.label(),
                error.error_type.label(),
                error.message,
                format_relative_time(error.occurred_at, now),
                error.retry_count
            );
        }
    }

    if let Some(error) = projection.expanded {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {} detail", error.id);
        let _ = writeln!(output, "- Code: {}", error.error_code);
        if let Some(record) = &error.affected_record_id {
            let kind = error.affected_record_type.as_deref().unwrap_or("record");
            let _ = writeln!(output, "- Affected {kind}: {record}");
        }
        if let Some(assignee) = &error.assigned_to {
            let _ = writeln!(output, "- Assigned to: {assignee}");
        }
        let _ = writeln!(output, "- Runbook: {}", error.runbook_url);
        if let Some(trace) = &error.stack_trace {
            let _ = writeln!(output, "```\n{trace}\n```");
        }
        for note in &error.notes {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                note.author,
                format_relative_time(note.created_at, now),
                note.content
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "### Unlinked Deep Cura Notes ({})",
        projection.pending_notes.len()
    );
    if projection.pending_notes.is_empty() {
        let _ = writeln!(output, "All Deep Cura notes are linked.");
    }
    for note in &projection.pending_notes {
        let suggestion = note
            .best_suggestion()
            .map(|s| {
                format!(
                    "best match {} ({:.0}%, {})",
                    s.id,
                    s.match_confidence * 100.0,
                    s.match_reason
                )
            })
            .unwrap_or_else(|| "no suggested match".to_string());
        let _ = writeln!(
            output,
            "- {} {} with {} on {}: {}",
            note.id, note.patient_name, note.provider_name, note.session_date, suggestion
        );
    }

    if !projection.can_triage {
        let _ = writeln!(output);
        let _ = writeln!(output, "Read-only: triage actions require operator or admin.");
    }

    output
}

pub fn render_actions(projection: &ActionsProjection<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Sync Actions");
    let _ = writeln!(output, "### Running ({})", projection.running.len());
    if projection.running.is_empty() {
        let _ = writeln!(output, "No operations running.");
    }
    for card in &projection.running {
        let op = card.operation;
        let progress = op
            .progress
            .map(|p| format!(", {p:.0}%"))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "- {} started by {} {}{progress}",
            op.action_name, op.started_by, card.started
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Available");
    for card in &projection.actions {
        let state = if !card.disabled() {
            "ready".to_string()
        } else if card.running {
            "running".to_string()
        } else {
            format!(
                "requires {}",
                lowest_trigger_role(card.action.required_role).label()
            )
        };
        let _ = writeln!(
            output,
            "- {} ({}) [{}] ~{}: {}",
            card.action.name,
            card.action.id,
            state,
            card.action.estimated_duration,
            card.action.description
        );
        let _ = writeln!(
            output,
            "  {} {}",
            card.action.method.as_str(),
            card.action.endpoint
        );
    }

    if let Some(action) = projection.confirming {
        let _ = writeln!(output);
        let _ = writeln!(output, "Confirm {}: {}", action.name, action.confirmation_message);
    }

    output
}

/// Alert events still needing attention, then every configured rule.
pub fn render_alerts(snapshot: &MonitoringSnapshot, now: DateTime<Utc>) -> String {
    let mut output = String::new();
    let active = filter_where(&snapshot.alert_events, |event| {
        event.status != AlertEventStatus::Resolved
    });

    let _ = writeln!(output, "## Alerts");
    let _ = writeln!(output, "### Active ({})", active.len());
    if active.is_empty() {
        let _ = writeln!(output, "No active alerts.");
    }
    for event in &active {
        let _ = writeln!(
            output,
            "- [{}] {} ({}) {}: {}",
            event.severity.label(),
            event.rule_name,
            event.status.label(),
            format_relative_time(event.triggered_at, now),
            event.summary
        );
        let _ = writeln!(output, "  {}", event.details);
        if let Some(at) = event.acknowledged_at {
            let _ = writeln!(output, "  Acknowledged {}", format_timestamp(at));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Rules");
    for rule in &snapshot.alert_rules {
        let window = rule
            .window
            .as_deref()
            .map(|w| format!(" over {w}"))
            .unwrap_or_default();
        let enabled = if rule.enabled { "" } else { " (disabled)" };
        let _ = writeln!(
            output,
            "- {} ({}){enabled}: {} {}{window} [{}] -> {}",
            rule.name,
            rule.id,
            rule.condition,
            rule.threshold,
            rule.severity.label(),
            rule.notification_channels.join(", ")
        );
        let _ = writeln!(output, "  {} <{}>", rule.description, rule.gcp_console_url);
    }

    output
}

/// Staff with dashboard access, grouped by role.
pub fn render_staff(snapshot: &MonitoringSnapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Staff");
    for (role, members) in group_by(&snapshot.staff_roles, |member| member.role) {
        let names: Vec<String> = members
            .iter()
            .map(|member| {
                format!(
                    "{} <{}> since {}",
                    member.name,
                    member.email,
                    member.created_at.format("%b %-d, %Y")
                )
            })
            .collect();
        let listed = if names.is_empty() {
            "none".to_string()
        } else {
            names.join("; ")
        };
        let _ = writeln!(output, "- {}: {listed}", role.label());
    }

    output
}

/// Every screen rendered into one markdown document.
pub fn build_report(snapshot: &MonitoringSnapshot, user: &CurrentUser, now: DateTime<Utc>) -> String {
    let logs = SyncLogsView::default().project(&snapshot.sync_logs);
    let errors = ErrorsView::default().project(
        &snapshot.sync_errors,
        &snapshot.unlinked_deep_cura_notes,
        user,
    );
    let actions = ActionsView::default().project(
        &snapshot.sync_actions,
        &snapshot.running_sync_operations,
        user,
        now,
    );

    [
        render_overview(&overview(snapshot, now)),
        render_sync_logs(&logs),
        render_errors(&errors, now),
        render_actions(&actions),
        render_alerts(snapshot, now),
        render_staff(snapshot),
    ]
    .join("\n")
}
