use serde::{Deserialize, Serialize};

/// The kind of filesystem operation a traced call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IOOperation {
    Read,
    Write,
    Open,
    Close,
    Stat,
    Readdir,
}

/// One observation emitted by the I/O Tracer. `sanitized_path` has already
/// had all but its last two segments replaced by an ellipsis marker before
/// this event is constructed — sanitization happens at emission time, not
/// as a later pass, so a raw path never enters the ring buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IOEvent {
    pub timestamp_nanos: u64,
    pub operation: IOOperation,
    pub sanitized_path: String,
    pub bytes_transferred: u64,
    pub duration_nanos: u64,
    pub pid: Option<u32>,
}

/// Sanitize a path by keeping at most its last two segments and replacing
/// everything ahead of them with an ellipsis marker. Kept as a
/// free function in the model module, separate from the Path Validator:
/// sanitization for display is a distinct concern from validation for
/// eligibility.
pub fn sanitize_path(path: &std::path::Path) -> String {
    let components: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if components.len() <= 2 {
        return components.join("/");
    }
    let tail = &components[components.len() - 2..];
    format!(".../{}", tail.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn keeps_at_most_last_two_segments() {
        assert_eq!(
            sanitize_path(Path::new("/Users/alice/Library/Caches/foo/bar.db")),
            ".../foo/bar.db"
        );
    }

    #[test]
    fn short_paths_are_unchanged() {
        assert_eq!(sanitize_path(Path::new("a/b")), "a/b");
    }
}
