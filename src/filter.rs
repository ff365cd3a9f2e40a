use chrono::NaiveDate;

use crate::models::{SyncLog, SyncSource, SyncStatus};

/// Stable filter: keeps the records matching `predicate` in their original order.
pub fn filter_where<'a, T, P>(records: &'a [T], predicate: P) -> Vec<&'a T>
where
    P: Fn(&T) -> bool,
{
    records.iter().filter(|record| predicate(*record)).collect()
}

/// Keeps records whose `field` equals `value`. `None` disables the filter and
/// returns every record.
pub fn filter_by_field<'a, T, V, F>(records: &'a [T], field: F, value: Option<&V>) -> Vec<&'a T>
where
    V: PartialEq + ?Sized,
    F: Fn(&T) -> &V,
{
    match value {
        Some(wanted) => filter_where(records, |record| field(record) == wanted),
        None => records.iter().collect(),
    }
}

/// Column filters of the sync log table. An unset key matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncLogFilters {
    pub source: Option<SyncSource>,
    pub status: Option<SyncStatus>,
    pub table_name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl SyncLogFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sets the table filter; an empty value clears it.
    pub fn set_table_name(&mut self, value: &str) {
        let value = value.trim();
        self.table_name = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    pub fn matches(&self, log: &SyncLog) -> bool {
        if self.source.is_some_and(|source| source != log.source) {
            return false;
        }
        if self.status.is_some_and(|status| status != log.status) {
            return false;
        }
        if let Some(table) = &self.table_name {
            if table != &log.table_name {
                return false;
            }
        }
        let started = log.started_at.date_naive();
        if self.date_from.is_some_and(|from| started < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| started > to) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, logs: &'a [SyncLog]) -> Vec<&'a SyncLog> {
        filter_where(logs, |log| self.matches(log))
    }
}

/// Case-insensitive match of `query` against the identifiers an operator is
/// likely to paste: log id, table, DrChrono id, clinical note id, error code.
pub fn matches_search(log: &SyncLog, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let drchrono_id = log.drchrono_id.map(|id| id.to_string());
    let fields = [
        Some(log.id.as_str()),
        Some(log.table_name.as_str()),
        drchrono_id.as_deref(),
        log.clinical_note_id.as_deref(),
        log.error_code.as_deref(),
    ];
    let found = fields
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(&needle));
    found
}
