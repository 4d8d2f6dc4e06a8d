//! Path pre-validation and hashing.
//!
//! These run the same grammar and hash as the registry, so a path rejected
//! here would be rejected on write and a hash computed here addresses the
//! registry's record directly.

use pathgate::core::any_matches;
use pathgate::{CanonicalPath, CanonicalPrefix, PathHash};

use crate::error::Result;

/// Validate `raw` as a file path.
pub fn canonical_file_path(raw: &str) -> Result<CanonicalPath> {
    Ok(CanonicalPath::parse(raw)?)
}

/// Validate `raw` as a prefix. `/` is accepted.
pub fn canonical_prefix(raw: &str) -> Result<CanonicalPrefix> {
    Ok(CanonicalPrefix::parse(raw)?)
}

/// Record key for `raw`: Keccak-256 of the canonical bytes.
pub fn path_hash(raw: &str) -> Result<PathHash> {
    Ok(PathHash::of(&canonical_file_path(raw)?))
}

/// Whether `path` lies under any of `prefixes`.
///
/// Every input is validated first; one invalid prefix fails the whole call
/// the same way it would fail a prefix replacement.
pub fn is_authorized<I, P>(prefixes: I, path: &str) -> Result<bool>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let path = canonical_file_path(path)?;
    let prefixes = prefixes
        .into_iter()
        .map(|p| canonical_prefix(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(any_matches(path.as_str(), prefixes.iter().map(|p| p.as_str())))
}
