use chrono::{DateTime, NaiveDate, Utc};

use crate::format::{format_duration, format_relative_time, success_rate, title_case};
use crate::group::count_where;
use crate::models::{
    ErrorStatus, Last24HoursMetrics, MonitoringSnapshot, ServiceHealth, Severity, SyncError,
    SyncLog,
};

const ACTIVITY_FEED_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct ServiceCard<'a> {
    pub service: &'a ServiceHealth,
    pub last_sync: String,
    pub last_duration: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub date: NaiveDate,
    pub successful: u64,
    pub failed: u64,
    /// Bar height as a percentage of the busiest day.
    pub height_pct: f64,
    /// Share of the bar that failed, 0 to 100.
    pub failed_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub open: usize,
    pub open_critical: usize,
    pub open_high: usize,
    pub by_type: Vec<(String, u64)>,
}

#[derive(Debug, Clone)]
pub struct Overview<'a> {
    pub last_refreshed: String,
    pub services: Vec<ServiceCard<'a>>,
    pub last24_hours: &'a Last24HoursMetrics,
    pub success_rate: String,
    pub record_counts: [(&'static str, u64); 8],
    pub chart: Vec<ChartBar>,
    pub errors: ErrorSummary,
    pub unresolved_error_count: usize,
    pub activity: &'a [SyncLog],
}

pub fn overview(snapshot: &MonitoringSnapshot, now: DateTime<Utc>) -> Overview<'_> {
    let metrics = &snapshot.sync_metrics;
    let last_refreshed = snapshot
        .last_refreshed_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "Just now".to_string());

    let services = snapshot
        .service_health
        .iter()
        .map(|service| ServiceCard {
            service,
            last_sync: format_relative_time(service.last_sync_at, now),
            last_duration: format_duration(service.last_sync_duration_ms),
        })
        .collect();

    let activity_len = snapshot.sync_logs.len().min(ACTIVITY_FEED_LEN);

    Overview {
        last_refreshed,
        services,
        last24_hours: &metrics.last24_hours,
        success_rate: success_rate(
            metrics.last24_hours.successful_syncs,
            metrics.last24_hours.total_syncs,
        ),
        record_counts: metrics.total_records_in_db.entries(),
        chart: chart_bars(snapshot),
        errors: error_summary(snapshot),
        unresolved_error_count: count_where(&snapshot.sync_errors, |error| {
            error.status == ErrorStatus::Open
        }),
        activity: &snapshot.sync_logs[..activity_len],
    }
}

fn chart_bars(snapshot: &MonitoringSnapshot) -> Vec<ChartBar> {
    let days = &snapshot.sync_metrics.last7_days.syncs_by_day;
    let max_value = days
        .iter()
        .map(|day| day.successful + day.failed)
        .max()
        .unwrap_or(0);

    days.iter()
        .map(|day| {
            let total = day.successful + day.failed;
            let height_pct = if max_value == 0 {
                0.0
            } else {
                total as f64 / max_value as f64 * 100.0
            };
            let failed_pct = if total == 0 {
                0.0
            } else {
                day.failed as f64 / total as f64 * 100.0
            };
            ChartBar {
                date: day.date,
                successful: day.successful,
                failed: day.failed,
                height_pct,
                failed_pct,
            }
        })
        .collect()
}

fn error_summary(snapshot: &MonitoringSnapshot) -> ErrorSummary {
    let open: Vec<&SyncError> = snapshot
        .sync_errors
        .iter()
        .filter(|error| error.status == ErrorStatus::Open)
        .collect();
    let open_with = |severity: Severity| open.iter().filter(|e| e.severity == severity).count();

    ErrorSummary {
        open: open.len(),
        open_critical: open_with(Severity::Critical),
        open_high: open_with(Severity::High),
        by_type: snapshot
            .sync_metrics
            .last7_days
            .errors_by_type
            .iter()
            .map(|stat| (title_case(&stat.error_type), stat.count))
            .collect(),
    }
}
