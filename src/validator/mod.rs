//! Path Validator: decides whether a candidate path is
//! eligible for deletion under the current authorization model, and
//! resolves it to a canonical, symlink-free form. Has no dependencies on
//! any other subsystem in this crate.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether the caller intends to trash (reversible) or delete (permanent)
/// the resolved path. Delete requires a stricter allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationIntent {
    Trash,
    Delete,
}

/// Whether the resolved path existed on disk at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Existed,
    Missing,
}

/// Why a candidate path was rejected. Surfaced to the caller verbatim so
/// the executor can record the reason in per-item results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    OutsideAllowedRoots,
    SymlinkEscape,
    ForbiddenSystemPrefix,
    NotAuthorized,
    IoError,
}

/// A path that passed validation: its canonical form plus whether it
/// existed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath {
    pub canonical: PathBuf,
    pub outcome: ResolutionOutcome,
}

/// System prefixes that are never eligible for deletion, regardless of
/// authorization. `/Library` itself is not blanket-forbidden: specific
/// subtrees are, via `forbidden_library_subtrees`, so user-level `~/Library`
/// caches remain eligible.
const FORBIDDEN_PREFIXES: &[&str] = &["/System", "/usr", "/bin", "/sbin", "/private/var"];

const FORBIDDEN_LIBRARY_SUBTREES: &[&str] = &[
    "/Library/Extensions",
    "/Library/LaunchDaemons",
    "/Library/LaunchAgents",
    "/Library/Frameworks",
    "/Library/Security",
];

/// Decides path eligibility for deletion and resolves candidates to a
/// canonical form.
#[derive(Debug, Clone)]
pub struct PathValidator {
    /// Roots the user has explicitly authorized (directory bookmarks).
    authorized_roots: Vec<PathBuf>,
    /// A fixed allowlist of per-user locations that are always safe to
    /// trash/delete from without separate authorization.
    always_safe_roots: Vec<PathBuf>,
    /// The subset of roots eligible for raw (unprivileged) `delete`. Paths
    /// outside this set still validate for `trash`, but `delete` on them
    /// requires the privileged helper.
    strict_delete_roots: Vec<PathBuf>,
}

impl PathValidator {
    /// Build a validator for a given home directory, seeding the
    /// always-safe allowlist (caches, trash, downloads, desktop).
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let always_safe_roots = vec![
            home.join("Library/Caches"),
            home.join(".Trash"),
            home.join("Downloads"),
            home.join("Desktop"),
        ];
        let strict_delete_roots = always_safe_roots.clone();
        Self {
            authorized_roots: Vec::new(),
            always_safe_roots,
            strict_delete_roots,
        }
    }

    /// Add a user-authorized root (e.g. from a persisted directory
    /// bookmark). Also eligible for raw `delete`.
    pub fn authorize_root(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        self.strict_delete_roots.push(root.clone());
        self.authorized_roots.push(root);
    }

    fn all_roots(&self) -> impl Iterator<Item = &PathBuf> {
        self.authorized_roots.iter().chain(self.always_safe_roots.iter())
    }

    fn is_forbidden_prefix(path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        if FORBIDDEN_PREFIXES.iter().any(|p| path_str.starts_with(p)) {
            return true;
        }
        FORBIDDEN_LIBRARY_SUBTREES
            .iter()
            .any(|p| path_str.starts_with(p))
    }

    /// Lexically normalize a path (collapse `.`/`..` components) without
    /// touching the filesystem or following symlinks.
    fn lexical_normalize(path: &Path) -> PathBuf {
        let mut out = PathBuf::new();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    out.pop();
                }
                Component::CurDir => {}
                other => out.push(other.as_os_str()),
            }
        }
        out
    }

    /// Resolve `path` by following symlinks to completion. If the path (or
    /// some prefix of it) doesn't exist, canonicalize the longest existing
    /// ancestor and re-append the missing suffix lexically, so a
    /// not-yet-created path still gets a canonical form to validate.
    fn resolve(path: &Path) -> std::io::Result<(PathBuf, ResolutionOutcome)> {
        if let Ok(canonical) = path.canonicalize() {
            return Ok((canonical, ResolutionOutcome::Existed));
        }
        let mut ancestor = path.to_path_buf();
        loop {
            if !ancestor.pop() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no existing ancestor found",
                ));
            }
            if let Ok(canonical_ancestor) = ancestor.canonicalize() {
                let mut resolved = canonical_ancestor;
                for segment in path.strip_prefix(&ancestor).unwrap().components() {
                    resolved.push(segment.as_os_str());
                }
                return Ok((resolved, ResolutionOutcome::Missing));
            }
        }
    }

    /// Validate `candidate` for the given operation intent.
    pub fn validate(
        &self,
        candidate: &Path,
        intent: OperationIntent,
    ) -> Result<ValidatedPath, RejectionReason> {
        let (canonical, outcome) =
            Self::resolve(candidate).map_err(|_| RejectionReason::IoError)?;

        if Self::is_forbidden_prefix(&canonical) {
            return Err(RejectionReason::ForbiddenSystemPrefix);
        }

        let lexical = Self::lexical_normalize(candidate);
        let lexical_in_root = self.all_roots().any(|root| lexical.starts_with(root));
        let canonical_in_root = self.all_roots().any(|root| canonical.starts_with(root));

        if !canonical_in_root {
            if lexical_in_root {
                return Err(RejectionReason::SymlinkEscape);
            }
            return Err(RejectionReason::OutsideAllowedRoots);
        }

        if intent == OperationIntent::Delete {
            let eligible = self
                .strict_delete_roots
                .iter()
                .any(|root| canonical.starts_with(root));
            if !eligible {
                return Err(RejectionReason::NotAuthorized);
            }
        }

        Ok(ValidatedPath { canonical, outcome })
    }

    /// Whether a path the caller already knows is rejected-for-raw-delete
    /// is still eligible through the privileged helper, i.e. it resolves
    /// into an authorized root but not a strict-delete root.
    pub fn is_helper_eligible(&self, canonical: &Path) -> bool {
        self.all_roots().any(|root| canonical.starts_with(root))
    }
}
