use tracing::info;

use crate::filter::SyncLogFilters;

/// User intents forwarded out of the dashboard views.
///
/// The views never change a record themselves; whoever implements this trait
/// performs the real work and later supplies a refreshed snapshot. Every
/// method defaults to doing nothing.
pub trait MonitorActions {
    fn view_sync_log(&mut self, _id: &str) {}
    fn search_sync_logs(&mut self, _query: &str) {}
    fn filter_sync_logs(&mut self, _filters: &SyncLogFilters) {}

    fn acknowledge_error(&mut self, _id: &str) {}
    fn retry_error(&mut self, _id: &str) {}
    fn assign_error(&mut self, _id: &str, _assignee: &str) {}
    fn add_error_note(&mut self, _id: &str, _note: &str) {}
    fn resolve_error(&mut self, _id: &str) {}

    fn link_deep_cura_note(&mut self, _deep_cura_note_id: &str, _clinical_note_id: &str) {}
    fn dismiss_deep_cura_note(&mut self, _id: &str, _reason: &str) {}

    fn trigger_sync_action(&mut self, _action_id: &str) {}

    fn view_service(&mut self, _id: &str) {}
    fn view_errors(&mut self) {}
    fn refresh(&mut self) {}
}

/// Preview implementation: records every intent as a log event and nothing else.
#[derive(Debug, Default)]
pub struct LoggingActions;

impl MonitorActions for LoggingActions {
    fn view_sync_log(&mut self, id: &str) {
        info!(sync_log_id = id, "view sync log");
    }

    fn search_sync_logs(&mut self, query: &str) {
        info!(query, "search sync logs");
    }

    fn filter_sync_logs(&mut self, filters: &SyncLogFilters) {
        info!(?filters, "filter sync logs");
    }

    fn acknowledge_error(&mut self, id: &str) {
        info!(error_id = id, "acknowledge error");
    }

    fn retry_error(&mut self, id: &str) {
        info!(error_id = id, "retry error");
    }

    fn assign_error(&mut self, id: &str, assignee: &str) {
        info!(error_id = id, assignee, "assign error");
    }

    fn add_error_note(&mut self, id: &str, note: &str) {
        info!(error_id = id, note, "add error note");
    }

    fn resolve_error(&mut self, id: &str) {
        info!(error_id = id, "resolve error");
    }

    fn link_deep_cura_note(&mut self, deep_cura_note_id: &str, clinical_note_id: &str) {
        info!(deep_cura_note_id, clinical_note_id, "link deep cura note");
    }

    fn dismiss_deep_cura_note(&mut self, id: &str, reason: &str) {
        info!(deep_cura_note_id = id, reason, "dismiss deep cura note");
    }

    fn trigger_sync_action(&mut self, action_id: &str) {
        info!(action_id, "trigger sync action");
    }

    fn view_service(&mut self, id: &str) {
        info!(service_id = id, "view service");
    }

    fn view_errors(&mut self) {
        info!("navigate to errors view");
    }

    fn refresh(&mut self) {
        info!("refresh triggered");
    }
}
