//! Strict-subtree prefix matching.
//!
//! A byte-prefix match is not enough: `/agent1` must not cover
//! `/agent10/x`. The byte following the prefix has to be a segment boundary.
//!
//! Both arguments are expected to be canonical already; callers holding
//! typed values should prefer [`CanonicalPrefix::covers`](crate::CanonicalPrefix::covers).

/// Whether `path` lies inside the subtree rooted at `prefix`.
pub fn matches(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    matches!(
        path.as_bytes().strip_prefix(prefix.as_bytes()),
        Some([]) | Some([b'/', ..])
    )
}

/// Whether `path` lies inside at least one of `prefixes`.
///
/// There is no precedence among prefixes; this is a plain logical OR.
pub fn any_matches<I, P>(path: &str, prefixes: I) -> bool
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    prefixes.into_iter().any(|p| matches(path, p.as_ref()))
}
