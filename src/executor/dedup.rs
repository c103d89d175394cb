//! Deduplication step of the Action Executor: canonicalize, sort, and
//! drop any path that is a proper descendant of
//! another path already in the set, so a request for both a directory and
//! something under it acts only on the ancestor.

use std::path::{Path, PathBuf};

/// Reduce `paths` to the minimal antichain under the "is-ancestor-of"
/// relation: for any two paths where one is a proper prefix of the other,
/// only the prefix (shallower) path survives. Input order has no effect on
/// the result; the output is sorted.
pub fn normalize_and_dedup(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut canonical: Vec<PathBuf> = paths
        .into_iter()
        .map(|path| path.canonicalize().unwrap_or(path))
        .collect();
    canonical.sort();
    canonical.dedup();

    let mut kept: Vec<PathBuf> = Vec::with_capacity(canonical.len());
    for candidate in canonical {
        if kept.iter().any(|parent| is_proper_ancestor(parent, &candidate)) {
            continue;
        }
        kept.push(candidate);
    }
    kept
}

fn is_proper_ancestor(parent: &Path, candidate: &Path) -> bool {
    candidate != parent && candidate.starts_with(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_descendants_of_an_included_parent() {
        let paths = vec![
            PathBuf::from("/X/a"),
            PathBuf::from("/X"),
            PathBuf::from("/X/b/c"),
        ];
        let result = normalize_and_dedup(paths);
        assert_eq!(result, vec![PathBuf::from("/X")]);
    }

    #[test]
    fn unrelated_paths_are_all_kept() {
        let paths = vec![PathBuf::from("/A"), PathBuf::from("/B"), PathBuf::from("/C")];
        let result = normalize_and_dedup(paths);
        assert_eq!(
            result,
            vec![PathBuf::from("/A"), PathBuf::from("/B"), PathBuf::from("/C")]
        );
    }

    #[test]
    fn duplicate_paths_collapse_to_one() {
        let paths = vec![PathBuf::from("/X"), PathBuf::from("/X")];
        let result = normalize_and_dedup(paths);
        assert_eq!(result, vec![PathBuf::from("/X")]);
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_treated_as_descendant() {
        // "/X2" is not a descendant of "/X" even though it shares a string
        // prefix; `starts_with` is component-wise, not byte-wise.
        let paths = vec![PathBuf::from("/X"), PathBuf::from("/X2")];
        let result = normalize_and_dedup(paths);
        assert_eq!(result, vec![PathBuf::from("/X"), PathBuf::from("/X2")]);
    }
}
