use chrono::NaiveDate;

use crate::actions::MonitorActions;
use crate::filter::{matches_search, SyncLogFilters};
use crate::models::{SyncLog, SyncSource, SyncStatus};
use crate::paginate::{total_pages, Pager, DEFAULT_PAGE_SIZE};

/// One column filter edit from the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Source(Option<SyncSource>),
    Status(Option<SyncStatus>),
    /// An empty name clears the filter.
    TableName(String),
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
}

/// Local state of the sync log browser. Lives as long as the view does.
#[derive(Debug, Clone)]
pub struct SyncLogsView {
    expanded_id: Option<String>,
    search_query: String,
    filters: SyncLogFilters,
    pager: Pager,
}

impl Default for SyncLogsView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct SyncLogPage<'a> {
    pub rows: Vec<&'a SyncLog>,
    pub expanded: Option<&'a SyncLog>,
    pub matching: usize,
    pub page: usize,
    pub total_pages: usize,
    pub showing: Option<(usize, usize)>,
}

impl SyncLogsView {
    pub fn new(page_size: usize) -> Self {
        Self {
            expanded_id: None,
            search_query: String::new(),
            filters: SyncLogFilters::default(),
            pager: Pager::new(page_size),
        }
    }

    #[cfg(test)]
    pub fn filters(&self) -> &SyncLogFilters {
        &self.filters
    }

    #[cfg(test)]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    #[cfg(test)]
    pub fn expanded_id(&self) -> Option<&str> {
        self.expanded_id.as_deref()
    }

    pub fn search(&mut self, query: &str, actions: &mut dyn MonitorActions) {
        self.search_query = query.to_string();
        self.pager.reset();
        actions.search_sync_logs(query);
    }

    pub fn change_filter(&mut self, change: FilterChange, actions: &mut dyn MonitorActions) {
        match change {
            FilterChange::Source(source) => self.filters.source = source,
            FilterChange::Status(status) => self.filters.status = status,
            FilterChange::TableName(name) => self.filters.set_table_name(&name),
            FilterChange::DateFrom(date) => self.filters.date_from = date,
            FilterChange::DateTo(date) => self.filters.date_to = date,
        }
        self.pager.reset();
        actions.filter_sync_logs(&self.filters);
    }

    pub fn clear_filters(&mut self, actions: &mut dyn MonitorActions) {
        self.filters = SyncLogFilters::default();
        self.search_query.clear();
        self.pager.reset();
        actions.filter_sync_logs(&self.filters);
    }

    /// Expands `id`, or collapses it when it is already expanded.
    pub fn toggle(&mut self, id: &str) {
        if self.expanded_id.as_deref() == Some(id) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id.to_string());
        }
    }

    pub fn view_log(&self, id: &str, actions: &mut dyn MonitorActions) {
        actions.view_sync_log(id);
    }

    pub fn next_page(&mut self, logs: &[SyncLog]) {
        let matching = self.matching(logs).len();
        self.pager.next(matching);
    }

    pub fn previous_page(&mut self) {
        self.pager.previous();
    }

    pub fn go_to_page(&mut self, page: usize, logs: &[SyncLog]) {
        let matching = self.matching(logs).len();
        self.pager.go_to(page, matching);
    }

    fn matching<'a>(&self, logs: &'a [SyncLog]) -> Vec<&'a SyncLog> {
        self.filters
            .apply(logs)
            .into_iter()
            .filter(|log| matches_search(log, &self.search_query))
            .collect()
    }

    pub fn project<'a>(&self, logs: &'a [SyncLog]) -> SyncLogPage<'a> {
        let matching = self.matching(logs);
        let rows = self.pager.slice(&matching).to_vec();
        let expanded = self
            .expanded_id
            .as_deref()
            .and_then(|id| rows.iter().copied().find(|log| log.id == id));

        SyncLogPage {
            expanded,
            matching: matching.len(),
            page: self.pager.page(),
            total_pages: total_pages(matching.len(), self.pager.page_size()),
            showing: self.pager.showing(matching.len()),
            rows,
        }
    }
}
