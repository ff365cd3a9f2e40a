use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SnapshotError;
use crate::models::{
    MonitoringSnapshot, SyncLog, SyncOperation, SyncSource, SyncStatus, SyncTrigger,
};

const SAMPLE_SNAPSHOT: &str = include_str!("../fixtures/sample_snapshot.json");

pub fn sample_snapshot() -> Result<MonitoringSnapshot, SnapshotError> {
    parse_snapshot(SAMPLE_SNAPSHOT)
}

pub fn parse_snapshot(raw: &str) -> Result<MonitoringSnapshot, SnapshotError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_snapshot(path: &Path) -> Result<MonitoringSnapshot, SnapshotError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_snapshot(&raw)?;
    debug!(
        path = %path.display(),
        sync_logs = snapshot.sync_logs.len(),
        sync_errors = snapshot.sync_errors.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Reads sync log rows exported from the sync service.
///
/// Rows without an `id` get a generated one; a missing `duration_ms` is
/// derived from the start and completion timestamps.
pub fn import_sync_logs_csv(csv_path: &Path) -> Result<Vec<SyncLog>, SnapshotError> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: Option<String>,
        source: SyncSource,
        operation: SyncOperation,
        table_name: String,
        status: SyncStatus,
        records_total: u64,
        records_created: u64,
        records_updated: u64,
        records_failed: u64,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        duration_ms: Option<u64>,
        triggered_by: SyncTrigger,
        drchrono_id: Option<i64>,
        error_code: Option<String>,
        error_message: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut logs = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|source| SnapshotError::Csv {
            row: index + 1,
            source,
        })?;

        let duration_ms = row.duration_ms.unwrap_or_else(|| {
            row.completed_at
                .map(|completed| (completed - row.started_at).num_milliseconds().max(0) as u64)
                .unwrap_or(0)
        });

        logs.push(SyncLog {
            id: row
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("import-{}", Uuid::new_v4())),
            source: row.source,
            operation: row.operation,
            table_name: row.table_name,
            status: row.status,
            records_total: row.records_total,
            records_created: row.records_created,
            records_updated: row.records_updated,
            records_failed: row.records_failed,
            started_at: row.started_at,
            completed_at: row.completed_at,
            duration_ms,
            triggered_by: row.triggered_by,
            drchrono_id: row.drchrono_id,
            linked_to_clinical_note: None,
            clinical_note_id: None,
            warning_message: None,
            error_message: row.error_message,
            error_code: row.error_code,
        });
    }

    Ok(logs)
}

/// A record that breaks one of the model's invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub record_id: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record_id, self.message)
    }
}

/// Checks the numeric and temporal invariants the type system cannot.
///
/// Violations are reported, not rejected: the snapshot is still rendered.
pub fn validate_snapshot(snapshot: &MonitoringSnapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut flag = |record_id: &str, message: String| {
        violations.push(Violation {
            record_id: record_id.to_string(),
            message,
        });
    };

    for log in &snapshot.sync_logs {
        let accounted = log.records_created + log.records_updated + log.records_failed;
        if accounted > log.records_total {
            flag(
                &log.id,
                format!(
                    "created+updated+failed ({accounted}) exceeds total ({})",
                    log.records_total
                ),
            );
        }
        if log.status == SyncStatus::Running && log.completed_at.is_some() {
            flag(&log.id, "running sync has a completion time".to_string());
        }
        if log.elapsed_ms().is_some_and(|elapsed| elapsed < 0) {
            flag(&log.id, "completed before it started".to_string());
        }
    }

    for error in &snapshot.sync_errors {
        if let Some(log_id) = &error.sync_log_id {
            if !snapshot.sync_logs.iter().any(|log| &log.id == log_id) {
                debug!(error_id = %error.id, sync_log_id = %log_id, "error references a log outside the snapshot");
            }
        }
        for pair in error.notes.windows(2) {
            if pair[1].created_at < pair[0].created_at {
                flag(&error.id, "notes are not in insertion order".to_string());
                break;
            }
        }
    }

    for note in &snapshot.unlinked_deep_cura_notes {
        for suggestion in &note.suggested_clinical_notes {
            if !(0.0..=1.0).contains(&suggestion.match_confidence) {
                flag(
                    &note.id,
                    format!(
                        "suggestion {} confidence {} outside [0, 1]",
                        suggestion.id, suggestion.match_confidence
                    ),
                );
            }
        }
    }

    for operation in &snapshot.running_sync_operations {
        if let Some(progress) = operation.progress {
            if !(0.0..=100.0).contains(&progress) {
                flag(&operation.id, format!("progress {progress} outside [0, 100]"));
            }
        }
    }

    violations
}

/// Loads the snapshot from `path`, or the bundled fixture when none is given.
pub fn load_or_sample(path: Option<&Path>) -> Result<MonitoringSnapshot, SnapshotError> {
    match path {
        Some(path) => load_snapshot(path),
        None => sample_snapshot(),
    }
}

/// Logs every invariant violation at `warn` and returns how many there were.
pub fn warn_violations(snapshot: &MonitoringSnapshot) -> usize {
    let violations = validate_snapshot(snapshot);
    for violation in &violations {
        warn!(%violation, "snapshot invariant violated");
    }
    violations.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_fixture_parses_and_is_consistent() {
        let snapshot = sample_snapshot().unwrap();
        assert!(!snapshot.sync_logs.is_empty());
        assert!(!snapshot.sync_errors.is_empty());
        assert!(!snapshot.sync_actions.is_empty());
        assert_eq!(validate_snapshot(&snapshot), Vec::new());
    }

    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let raw = SAMPLE_SNAPSHOT.replacen("\"status\": \"healthy\"", "\"status\": \"degraded\"", 1);
        assert!(matches!(parse_snapshot(&raw), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn count_and_time_violations_are_reported() {
        let mut snapshot = sample_snapshot().unwrap();
        let log = &mut snapshot.sync_logs[0];
        log.records_created = log.records_total + 1;
        log.completed_at = Some(log.started_at - chrono::Duration::seconds(1));
        log.status = SyncStatus::Completed;
        let id = log.id.clone();

        let violations = validate_snapshot(&snapshot);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.record_id == id));
    }

    #[test]
    fn loading_leaves_violations_to_the_caller() {
        let mut snapshot = sample_snapshot().unwrap();
        snapshot.sync_logs[0].records_created = snapshot.sync_logs[0].records_total + 1;
        let raw = serde_json::to_string(&snapshot).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        let loaded = load_or_sample(Some(file.path())).unwrap();

        assert_eq!(validate_snapshot(&loaded).len(), 1);
        assert_eq!(warn_violations(&loaded), 1);
        assert_eq!(warn_violations(&sample_snapshot().unwrap()), 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snapshot.json"));
    }

    #[test]
    fn loads_snapshot_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_SNAPSHOT.as_bytes()).unwrap();
        let snapshot = load_or_sample(Some(file.path())).unwrap();
        assert_eq!(snapshot.current_user.role, sample_snapshot().unwrap().current_user.role);
    }

    #[test]
    fn imports_csv_rows_and_fills_gaps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id,source,operation,table_name,status,records_total,records_created,records_updated,records_failed,started_at,completed_at,duration_ms,triggered_by,drchrono_id,error_code,error_message"
        )
        .unwrap();
        writeln!(
            file,
            "log-a,drchrono,webhook,patients,completed,3,1,2,0,2026-01-15T14:30:00Z,2026-01-15T14:30:02Z,,webhook,88120,,"
        )
        .unwrap();
        writeln!(
            file,
            ",coda,push,appointments,running,0,0,0,0,2026-01-15T14:31:00Z,,,manual,,,"
        )
        .unwrap();
        file.flush().unwrap();

        let logs = import_sync_logs_csv(file.path()).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, "log-a");
        assert_eq!(logs[0].duration_ms, 2_000);
        assert_eq!(logs[0].drchrono_id, Some(88_120));
        assert!(logs[1].id.starts_with("import-"));
        assert_eq!(logs[1].status, SyncStatus::Running);
        assert!(logs[1].completed_at.is_none());
    }

    #[test]
    fn csv_with_unknown_source_names_the_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id,source,operation,table_name,status,records_total,records_created,records_updated,records_failed,started_at,completed_at,duration_ms,triggered_by,drchrono_id,error_code,error_message"
        )
        .unwrap();
        writeln!(
            file,
            "log-b,athena,webhook,patients,completed,1,1,0,0,2026-01-15T14:30:00Z,2026-01-15T14:30:01Z,1000,webhook,,,"
        )
        .unwrap();
        file.flush().unwrap();

        let err = import_sync_logs_csv(file.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::Csv { row: 1, .. }));
    }
}
