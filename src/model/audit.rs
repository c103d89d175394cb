use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionType;

/// An append-only record of one executed action. Never mutated after
/// construction; `rule_id` is a value copy, not a live reference, keeping
/// the audit trail free of cycles back into live rule state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub rule_id: String,
    pub action_type: ActionType,
    pub item_count: usize,
    pub items_processed: usize,
    pub total_bytes: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl AuditEntry {
    /// Render one line of the append-only log format: ISO-8601 timestamp
    /// plus fixed fields separated by ` | `.
    pub fn to_line(&self) -> String {
        format!(
            "{} | {:?} | {:?} | item_count={} | items_processed={} | total_bytes={} | success={} | error={}",
            self.timestamp.to_rfc3339(),
            self.rule_id,
            self.action_type,
            self.item_count,
            self.items_processed,
            self.total_bytes,
            self.success,
            self.error.as_deref().unwrap_or("-"),
        )
    }

    /// Parse one line back into an `AuditEntry`. Malformed/partial lines
    /// (a crashed trailing fragment) return `None` so readers can skip
    /// them rather than fail the whole read.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.split(" | ");
        let timestamp = DateTime::parse_from_rfc3339(parts.next()?)
            .ok()?
            .with_timezone(&Utc);
        let rule_id = parts.next()?.trim_matches('"').to_string();
        let action_type_raw = parts.next()?;
        let action_type = parse_action_type(action_type_raw)?;
        let item_count = parse_field(parts.next()?, "item_count=")?;
        let items_processed = parse_field(parts.next()?, "items_processed=")?;
        let total_bytes = parse_field(parts.next()?, "total_bytes=")?;
        let success: bool = parse_field_str(parts.next()?, "success=")?;
        let error_raw = parts.next()?;
        let error = error_raw
            .strip_prefix("error=")
            .filter(|v| *v != "-")
            .map(|v| v.to_string());

        Some(Self {
            timestamp,
            rule_id,
            action_type,
            item_count,
            items_processed,
            total_bytes,
            success,
            error,
        })
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, prefix: &str) -> Option<T> {
    field.strip_prefix(prefix)?.parse().ok()
}

fn parse_field_str<T: std::str::FromStr>(field: &str, prefix: &str) -> Option<T> {
    field.strip_prefix(prefix)?.parse().ok()
}

fn parse_action_type(raw: &str) -> Option<ActionType> {
    Some(match raw {
        "CleanupTrash" => ActionType::CleanupTrash,
        "CleanupDelete" => ActionType::CleanupDelete,
        "OpenFinder" => ActionType::OpenFinder,
        "Rescan" => ActionType::Rescan,
        "EmptyTrash" => ActionType::EmptyTrash,
        "UninstallPlan" => ActionType::UninstallPlan,
        "OptimizeTask" => ActionType::OptimizeTask,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_line_format() {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            rule_id: "old_downloads".to_string(),
            action_type: ActionType::CleanupTrash,
            item_count: 2,
            items_processed: 2,
            total_bytes: 4096,
            success: true,
            error: None,
        };
        let line = entry.to_line();
        let parsed = AuditEntry::from_line(&line).expect("line should parse");
        assert_eq!(parsed.rule_id, entry.rule_id);
        assert_eq!(parsed.item_count, entry.item_count);
        assert_eq!(parsed.total_bytes, entry.total_bytes);
        assert_eq!(parsed.success, entry.success);
    }

    #[test]
    fn truncated_line_is_skipped_not_panicked() {
        assert!(AuditEntry::from_line("2024-01-01T00:00:00Z | \"rule\" | Cle").is_none());
    }
}
