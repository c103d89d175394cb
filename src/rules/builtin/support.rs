//! Small helpers shared across built-in rules: witness selection and
//! evidence formatting. Not part of the public API.

use std::path::PathBuf;

use crate::model::Evidence;

/// The `n` largest `(path, size)` pairs, largest first, ties broken by path
/// for determinism — used to populate "top witness" evidence without
/// dumping every matched path into a recommendation.
pub(crate) fn top_n_by_size(mut items: Vec<(PathBuf, u64)>, n: usize) -> Vec<(PathBuf, u64)> {
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(n);
    items
}

/// Build one [`Evidence::path`] witness per `(path, size)` pair, labeling
/// each with its human-readable size.
pub(crate) fn witness_evidence(label_prefix: &str, witnesses: &[(PathBuf, u64)]) -> Vec<Evidence> {
    witnesses
        .iter()
        .map(|(path, size)| {
            Evidence::path(
                format!("{label_prefix} ({})", crate::model::format_bytes(*size)),
                path.clone(),
            )
        })
        .collect()
}
