use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::models::{CurrentUser, StaffRoleType};
use crate::paginate::DEFAULT_PAGE_SIZE;

pub const SNAPSHOT_ENV: &str = "SYNC_MONITOR_SNAPSHOT";

/// Settings for one preview run, resolved from flags and the environment.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// `None` renders the bundled fixture.
    pub snapshot_path: Option<PathBuf>,
    /// Clock used for relative times, pinned so output is reproducible.
    pub now: DateTime<Utc>,
    pub role: Option<StaffRoleType>,
    pub page_size: usize,
}

impl PreviewConfig {
    pub fn resolve(
        snapshot: Option<PathBuf>,
        now: Option<DateTime<Utc>>,
        role: Option<StaffRoleType>,
        page_size: Option<usize>,
    ) -> Self {
        let snapshot_path = snapshot.or_else(|| {
            std::env::var(SNAPSHOT_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        });

        Self {
            snapshot_path,
            now: now.unwrap_or_else(Utc::now),
            role,
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        }
    }

    /// The snapshot's user, with the role replaced when one was requested.
    pub fn user(&self, snapshot_user: &CurrentUser) -> CurrentUser {
        let mut user = snapshot_user.clone();
        if let Some(role) = self.role {
            user.role = role;
        }
        user
    }
}

/// Parses a CLI value using the same spelling as the snapshot JSON.
pub fn parse_closed<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognized value `{raw}`"))
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SyncSource, SyncStatus};

    #[test]
    fn parses_cli_values_like_snapshot_json() {
        assert_eq!(parse_closed::<SyncSource>("deepcura"), Ok(SyncSource::Deepcura));
        assert_eq!(parse_closed::<SyncStatus>("partial"), Ok(SyncStatus::Partial));
        assert!(parse_closed::<StaffRoleType>("root").is_err());
    }

    #[test]
    fn explicit_values_win() {
        let now = parse_timestamp("2026-01-15T15:00:00Z").unwrap();
        let config = PreviewConfig::resolve(
            Some(PathBuf::from("snapshot.json")),
            Some(now),
            Some(StaffRoleType::Viewer),
            Some(0),
        );
        assert_eq!(config.snapshot_path, Some(PathBuf::from("snapshot.json")));
        assert_eq!(config.now, now);
        assert_eq!(config.page_size, 1);

        let user = CurrentUser {
            email: "admin@feelaugust.com".to_string(),
            name: "Rae".to_string(),
            role: StaffRoleType::Admin,
        };
        assert_eq!(config.user(&user).role, StaffRoleType::Viewer);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2026-01-15T10:00:00-05:00").is_ok());
    }
}
