//! Outcome reports of migration runs

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Direction;

/// A migration applied or reverted by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub version: String,
    pub duration_ms: i64,
}

/// What an `up` or `down` run did
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub direction: Direction,
    pub completed: Vec<StepOutcome>,
    /// Versions another runner handled while this one waited for the lock
    pub skipped: Vec<String>,
    pub failed: Option<String>,
    pub not_attempted: Vec<String>,
    pub total_duration_ms: i64,
}

impl MigrationReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            completed: Vec::new(),
            skipped: Vec::new(),
            failed: None,
            not_attempted: Vec::new(),
            total_duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    pub fn versions(&self) -> Vec<&str> {
        self.completed.iter().map(|s| s.version.as_str()).collect()
    }
}

/// Status of one known migration
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub version: String,
    pub applied_at: Option<DateTime<Utc>>,
    pub recorded_checksum: Option<String>,
    pub current_checksum: String,
}

impl StatusEntry {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    /// Applied with a checksum that no longer matches the migration
    pub fn is_drifted(&self) -> bool {
        matches!(&self.recorded_checksum, Some(recorded) if *recorded != self.current_checksum)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub migrations: Vec<StatusEntry>,
    /// Applied versions the selected generation does not know
    pub unknown: Vec<String>,
}

impl MigrationStatus {
    pub fn pending(&self) -> Vec<&str> {
        self.migrations
            .iter()
            .filter(|e| !e.is_applied())
            .map(|e| e.version.as_str())
            .collect()
    }

    pub fn applied(&self) -> Vec<&str> {
        self.migrations
            .iter()
            .filter(|e| e.is_applied())
            .map(|e| e.version.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub reverted: MigrationReport,
    pub applied: MigrationReport,
}

/// Differences between the migration set and the history table
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub pending: Vec<String>,
    pub unknown: Vec<String>,
    pub drifted: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.pending.is_empty() && self.unknown.is_empty() && self.drifted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_detection() {
        let entry = StatusEntry {
            version: "m1".to_string(),
            applied_at: Some(Utc::now()),
            recorded_checksum: Some("aa".to_string()),
            current_checksum: "bb".to_string(),
        };
        assert!(entry.is_applied());
        assert!(entry.is_drifted());

        let pending = StatusEntry {
            applied_at: None,
            recorded_checksum: None,
            ..entry
        };
        assert!(!pending.is_drifted());
    }

    #[test]
    fn test_report_serialization() {
        let mut report = MigrationReport::new(Direction::Up);
        report.completed.push(StepOutcome {
            version: "m1".to_string(),
            duration_ms: 4,
        });
        report.failed = Some("m2".to_string());
        report.not_attempted.push("m3".to_string());

        assert!(!report.is_success());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["direction"], "up");
        assert_eq!(json["failed"], "m2");
        assert_eq!(json["not_attempted"][0], "m3");
    }
}
