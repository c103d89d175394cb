use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The kind of fact an [`Evidence`] item is carrying. Kept separate from
/// the value's type so a renderer can group/format by kind without
/// inspecting the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Path,
    Metric,
    Metadata,
    Aggregate,
}

/// A tagged union of the shapes evidence values can take. Kept distinct
/// from a plain string so a UI can format bytes/percentages/paths
/// correctly instead of guessing from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceValue {
    Bytes(u64),
    Percentage(f64),
    Count(u64),
    Path(PathBuf),
    Text(String),
}

impl std::fmt::Display for EvidenceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceValue::Bytes(b) => write!(f, "{}", format_bytes(*b)),
            EvidenceValue::Percentage(p) => write!(f, "{:.0}%", p * 100.0),
            EvidenceValue::Count(c) => write!(f, "{c}"),
            EvidenceValue::Path(p) => write!(f, "{}", p.display()),
            EvidenceValue::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Format a byte count the way a recommendation's evidence is rendered
/// (GB/MB/KB, one decimal place) without pulling in a formatting crate.
/// Decimal (SI, powers of 1000) to match the unit labels: `5,000,000,000`
/// renders as `5.0 GB`, not a binary-divisor `4.7 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// A single supporting fact for a [`Recommendation`](super::Recommendation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub label: String,
    pub value: EvidenceValue,
}

impl Evidence {
    pub fn path(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind: EvidenceKind::Path,
            label: label.into(),
            value: EvidenceValue::Path(path.into()),
        }
    }

    pub fn metric_bytes(label: impl Into<String>, bytes: u64) -> Self {
        Self {
            kind: EvidenceKind::Metric,
            label: label.into(),
            value: EvidenceValue::Bytes(bytes),
        }
    }

    pub fn metric_percentage(label: impl Into<String>, fraction: f64) -> Self {
        Self {
            kind: EvidenceKind::Metric,
            label: label.into(),
            value: EvidenceValue::Percentage(fraction),
        }
    }

    pub fn aggregate_count(label: impl Into<String>, count: u64) -> Self {
        Self {
            kind: EvidenceKind::Aggregate,
            label: label.into(),
            value: EvidenceValue::Count(count),
        }
    }

    pub fn metadata(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Metadata,
            label: label.into(),
            value: EvidenceValue::Text(text.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_bytes_in_human_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_000_000_000), "2.0 GB");
    }

    #[test]
    fn formats_the_low_disk_space_scenario_exactly() {
        assert_eq!(format_bytes(5_000_000_000), "5.0 GB");
    }
}
