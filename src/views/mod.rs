//! Read-only projections of the snapshot, one per dashboard screen, together
//! with the short-lived state each screen owns (expanded row, page, filters).

pub mod actions;
pub mod errors;
pub mod overview;
pub mod sync_logs;

pub use actions::{ActionsProjection, ActionsView};
pub use errors::{ErrorViewMode, ErrorsProjection, ErrorsView};
pub use overview::{overview, Overview};
pub use sync_logs::{FilterChange, SyncLogPage, SyncLogsView};
