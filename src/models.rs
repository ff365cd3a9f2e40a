use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A categorical value drawn from a fixed set.
///
/// `ALL` lists every value in display order so that grouping can emit a
/// section for each value, including the empty ones.
pub trait ClosedEnum: Copy + Ord + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSource {
    Drchrono,
    Deepcura,
    Coda,
}

impl ClosedEnum for SyncSource {
    const ALL: &'static [Self] = &[Self::Drchrono, Self::Deepcura, Self::Coda];

    fn label(&self) -> &'static str {
        match self {
            Self::Drchrono => "DrChrono",
            Self::Deepcura => "Deep Cura",
            Self::Coda => "Coda",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Webhook,
    Gridhook,
    FullSync,
    Push,
}

impl ClosedEnum for SyncOperation {
    const ALL: &'static [Self] = &[Self::Webhook, Self::Gridhook, Self::FullSync, Self::Push];

    fn label(&self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Gridhook => "gridhook",
            Self::FullSync => "full sync",
            Self::Push => "push",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Completed,
    Failed,
    Partial,
    Running,
}

impl ClosedEnum for SyncStatus {
    const ALL: &'static [Self] = &[Self::Completed, Self::Failed, Self::Partial, Self::Running];

    fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Success",
            Self::Failed => "Failed",
            Self::Partial => "Partial",
            Self::Running => "Running",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Webhook,
    Scheduler,
    Pubsub,
    Manual,
}

impl ClosedEnum for SyncTrigger {
    const ALL: &'static [Self] = &[Self::Webhook, Self::Scheduler, Self::Pubsub, Self::Manual];

    fn label(&self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Scheduler => "scheduler",
            Self::Pubsub => "pubsub",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    pub id: String,
    pub source: SyncSource,
    pub operation: SyncOperation,
    pub table_name: String,
    pub status: SyncStatus,
    pub records_total: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub records_failed: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub triggered_by: SyncTrigger,
    #[serde(default)]
    pub drchrono_id: Option<i64>,
    #[serde(default)]
    pub linked_to_clinical_note: Option<bool>,
    #[serde(default)]
    pub clinical_note_id: Option<String>,
    #[serde(default)]
    pub warning_message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl SyncLog {
    /// Elapsed time between start and completion, absent while running.
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.started_at).num_milliseconds())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl ClosedEnum for Severity {
    const ALL: &'static [Self] = &[Self::Critical, Self::High, Self::Medium, Self::Low];

    fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    RateLimit,
    Timeout,
    AuthExpired,
    DecryptionFailed,
    LinkingFailed,
    Unknown,
}

impl ClosedEnum for ErrorType {
    const ALL: &'static [Self] = &[
        Self::RateLimit,
        Self::Timeout,
        Self::AuthExpired,
        Self::DecryptionFailed,
        Self::LinkingFailed,
        Self::Unknown,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::RateLimit => "Rate Limit",
            Self::Timeout => "Timeout",
            Self::AuthExpired => "Auth Expired",
            Self::DecryptionFailed => "Decryption Failed",
            Self::LinkingFailed => "Linking Failed",
            Self::Unknown => "Unknown",
        }
    }
}

/// Triage state of an error. Progresses open → acknowledged → resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl ErrorStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl ClosedEnum for ErrorStatus {
    const ALL: &'static [Self] = &[Self::Open, Self::Acknowledged, Self::Resolved];

    fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Acknowledged => "Acknowledged",
            Self::Resolved => "Resolved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNote {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub id: String,
    pub sync_log_id: Option<String>,
    pub source: SyncSource,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub table_name: Option<String>,
    pub message: String,
    pub error_code: String,
    pub affected_record_id: Option<String>,
    pub affected_record_type: Option<String>,
    pub stack_trace: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub status: ErrorStatus,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub notes: Vec<ErrorNote>,
    pub retry_count: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub runbook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalCode {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedClinicalNote {
    pub id: String,
    pub drchrono_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub match_confidence: f64,
    pub match_reason: String,
}

/// Review state of an unlinked note. `Linked` and `Dismissed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlinkedNoteStatus {
    PendingReview,
    Linked,
    Dismissed,
}

impl ClosedEnum for UnlinkedNoteStatus {
    const ALL: &'static [Self] = &[Self::PendingReview, Self::Linked, Self::Dismissed];

    fn label(&self) -> &'static str {
        match self {
            Self::PendingReview => "Pending review",
            Self::Linked => "Linked",
            Self::Dismissed => "Dismissed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkedDeepCuraNote {
    pub id: String,
    pub session_date: NaiveDate,
    pub patient_name: String,
    pub patient_drchrono_id: i64,
    pub provider_name: String,
    pub soap_subjective: String,
    #[serde(default)]
    pub icd10_codes: Vec<MedicalCode>,
    #[serde(default)]
    pub cpt_codes: Vec<MedicalCode>,
    pub received_at: DateTime<Utc>,
    pub status: UnlinkedNoteStatus,
    #[serde(default)]
    pub suggested_clinical_notes: Vec<SuggestedClinicalNote>,
    pub review_notes: Option<String>,
}

impl UnlinkedDeepCuraNote {
    /// Suggestion with the highest match confidence, first one wins ties.
    pub fn best_suggestion(&self) -> Option<&SuggestedClinicalNote> {
        self.suggested_clinical_notes.iter().fold(None, |best, candidate| match best {
            Some(current) if current.match_confidence >= candidate.match_confidence => {
                Some(current)
            }
            _ => Some(candidate),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Warning,
    Error,
}

impl ClosedEnum for ServiceStatus {
    const ALL: &'static [Self] = &[Self::Healthy, Self::Warning, Self::Error];

    fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub id: String,
    pub name: String,
    pub status: ServiceStatus,
    pub last_sync_at: DateTime<Utc>,
    pub last_sync_duration_ms: u64,
    pub records_synced_last24h: u64,
    pub error_count_last24h: u64,
    pub webhooks_received_last24h: Option<u64>,
    #[serde(default)]
    pub warning_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    pub patients: u64,
    pub appointments: u64,
    pub clinical_notes: u64,
    pub deep_cura_notes: u64,
    pub medications: u64,
    pub problems: u64,
    pub allergies: u64,
    pub insurance_records: u64,
}

impl RecordCounts {
    pub fn entries(&self) -> [(&'static str, u64); 8] {
        [
            ("Patients", self.patients),
            ("Appointments", self.appointments),
            ("Clinical Notes", self.clinical_notes),
            ("Deep Cura Notes", self.deep_cura_notes),
            ("Medications", self.medications),
            ("Problems", self.problems),
            ("Allergies", self.allergies),
            ("Insurance Records", self.insurance_records),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Last24HoursMetrics {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    pub average_latency_ms: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub webhooks_received: u64,
    pub coda_pushes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySyncStat {
    pub date: NaiveDate,
    pub successful: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorTypeStat {
    #[serde(rename = "type")]
    pub error_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Last7DaysMetrics {
    pub syncs_by_day: Vec<DailySyncStat>,
    pub errors_by_type: Vec<ErrorTypeStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub total_records_in_db: RecordCounts,
    pub last24_hours: Last24HoursMetrics,
    pub last7_days: Last7DaysMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertEventStatus {
    Triggered,
    Acknowledged,
    Resolved,
}

impl ClosedEnum for AlertEventStatus {
    const ALL: &'static [Self] = &[Self::Triggered, Self::Acknowledged, Self::Resolved];

    fn label(&self) -> &'static str {
        match self {
            Self::Triggered => "Triggered",
            Self::Acknowledged => "Acknowledged",
            Self::Resolved => "Resolved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub condition: String,
    pub threshold: String,
    pub window: Option<String>,
    pub severity: Severity,
    pub enabled: bool,
    #[serde(default)]
    pub notification_channels: Vec<String>,
    pub gcp_console_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub status: AlertEventStatus,
    pub triggered_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRoleType {
    Admin,
    Operator,
    Viewer,
}

impl ClosedEnum for StaffRoleType {
    const ALL: &'static [Self] = &[Self::Admin, Self::Operator, Self::Viewer];

    fn label(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Viewer => "viewer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub required_role: StaffRoleType,
    pub estimated_duration: String,
    pub confirmation_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Running,
    Completed,
    Failed,
}

impl ClosedEnum for OperationStatus {
    const ALL: &'static [Self] = &[Self::Running, Self::Completed, Self::Failed];

    fn label(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningSyncOperation {
    pub id: String,
    pub action_id: String,
    pub action_name: String,
    pub started_at: DateTime<Utc>,
    pub started_by: String,
    #[serde(default)]
    pub progress: Option<f64>,
    pub status: OperationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRole {
    pub email: String,
    pub name: String,
    pub role: StaffRoleType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
    pub name: String,
    pub role: StaffRoleType,
}

/// Everything the dashboard renders, supplied as one finalized snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSnapshot {
    pub service_health: Vec<ServiceHealth>,
    pub sync_metrics: SyncMetrics,
    pub sync_logs: Vec<SyncLog>,
    pub sync_errors: Vec<SyncError>,
    #[serde(default)]
    pub unlinked_deep_cura_notes: Vec<UnlinkedDeepCuraNote>,
    #[serde(default)]
    pub alert_rules: Vec<AlertRule>,
    #[serde(default)]
    pub alert_events: Vec<AlertEvent>,
    #[serde(default)]
    pub sync_actions: Vec<SyncAction>,
    #[serde(default)]
    pub running_sync_operations: Vec<RunningSyncOperation>,
    #[serde(default)]
    pub staff_roles: Vec<StaffRole>,
    pub current_user: CurrentUser,
    #[serde(default)]
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_enums_reject_unknown_values() {
        let parsed: Result<SyncSource, _> = serde_json::from_str("\"athena\"");
        assert!(parsed.is_err());
        let parsed: SyncOperation = serde_json::from_str("\"full_sync\"").unwrap();
        assert_eq!(parsed, SyncOperation::FullSync);
    }

    #[test]
    fn enum_order_matches_display_sections() {
        assert_eq!(Severity::ALL.first(), Some(&Severity::Critical));
        assert!(Severity::Critical < Severity::Low);
        assert_eq!(SyncSource::ALL.len(), 3);
    }

    #[test]
    fn best_suggestion_prefers_highest_confidence() {
        let suggestion = |id: &str, confidence: f64| SuggestedClinicalNote {
            id: id.to_string(),
            drchrono_id: 1,
            appointment_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            appointment_time: "09:30".to_string(),
            match_confidence: confidence,
            match_reason: "same patient".to_string(),
        };
        let note = UnlinkedDeepCuraNote {
            id: "dc-1".to_string(),
            session_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            patient_name: "Dana Ruiz".to_string(),
            patient_drchrono_id: 42,
            provider_name: "Dr. Osei".to_string(),
            soap_subjective: "Follow-up".to_string(),
            icd10_codes: Vec::new(),
            cpt_codes: Vec::new(),
            received_at: Utc::now(),
            status: UnlinkedNoteStatus::PendingReview,
            suggested_clinical_notes: vec![
                suggestion("cn-1", 0.4),
                suggestion("cn-2", 0.9),
                suggestion("cn-3", 0.9),
            ],
            review_notes: None,
        };

        assert_eq!(note.best_suggestion().map(|s| s.id.as_str()), Some("cn-2"));
    }
}
