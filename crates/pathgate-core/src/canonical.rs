//! Path and prefix grammar.
//!
//! Canonicalization is a validating copy: the output is byte-for-byte the
//! input when the input is legal, and an error otherwise. No case folding,
//! no slash collapsing, no `..` resolution. Anything that would need
//! normalizing is rejected instead.
//!
//! Rules shared by both modes:
//!
//! - must start with `/`
//! - no empty segments (so no `//`) and no trailing `/`
//! - segment characters are `A-Z a-z 0-9 - _`
//!
//! Mode-specific rules:
//!
//! - [`PathMode::Prefix`] accepts the bare root `/` and never accepts `.`
//! - [`PathMode::FilePath`] rejects `/`, and accepts a single `.` in the final
//!   segment as long as it is neither the first nor the last character of
//!   that segment

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Which grammar variant to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathMode {
    /// A subtree root that may be granted to a permission key.
    Prefix,
    /// A concrete file location.
    FilePath,
}

/// Validate `raw` under the grammar for `mode` and return its canonical form.
///
/// The returned string is identical to `raw` on success.
pub fn canonicalize(raw: &str, mode: PathMode) -> Result<String, PathError> {
    if raw.is_empty() {
        return Err(PathError::Empty);
    }
    if !raw.starts_with('/') {
        return Err(PathError::MissingLeadingSlash);
    }
    if raw.len() == 1 {
        return match mode {
            PathMode::Prefix => Ok(raw.to_string()),
            PathMode::FilePath => Err(PathError::RootNotAllowed),
        };
    }

    // Byte offset where the final segment begins. The leading '/' guarantees
    // rfind succeeds.
    let final_start = raw.rfind('/').map_or(1, |i| i + 1);
    let mut prev_slash = true;
    let mut dot_seen = false;

    for (position, ch) in raw.char_indices().skip(1) {
        match ch {
            '/' => {
                if prev_slash {
                    return Err(PathError::EmptySegment { position });
                }
                prev_slash = true;
                continue;
            }
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' => {}
            '.' => {
                if mode == PathMode::Prefix || position < final_start {
                    return Err(PathError::DotNotAllowed { position });
                }
                if dot_seen {
                    return Err(PathError::MultipleDots { position });
                }
                dot_seen = true;
            }
            other => {
                return Err(PathError::IllegalCharacter { ch: other, position });
            }
        }
        prev_slash = false;
    }

    if prev_slash {
        return Err(PathError::TrailingSlash {
            position: raw.len() - 1,
        });
    }

    if dot_seen {
        let last = raw.len() - 1;
        if raw.as_bytes()[final_start] == b'.' {
            return Err(PathError::DotAtSegmentEdge {
                position: final_start,
            });
        }
        if raw.as_bytes()[last] == b'.' {
            return Err(PathError::DotAtSegmentEdge { position: last });
        }
    }

    Ok(raw.to_string())
}

/// A file path that passed [`PathMode::FilePath`] validation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Validate a raw file path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        canonicalize(raw, PathMode::FilePath).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments of the path, without the leading empty one.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split('/')
    }
}

impl TryFrom<String> for CanonicalPath {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.0
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalPath({:?})", self.0)
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A prefix that passed [`PathMode::Prefix`] validation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPrefix(String);

impl CanonicalPrefix {
    /// Validate a raw prefix.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        canonicalize(raw, PathMode::Prefix).map(Self)
    }

    /// The match-everything root prefix.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `path` lies in this prefix's subtree.
    pub fn covers(&self, path: &CanonicalPath) -> bool {
        crate::matcher::matches(path.as_str(), &self.0)
    }
}

impl TryFrom<String> for CanonicalPrefix {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<CanonicalPrefix> for String {
    fn from(prefix: CanonicalPrefix) -> Self {
        prefix.0
    }
}

impl AsRef<str> for CanonicalPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CanonicalPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalPrefix({:?})", self.0)
    }
}

impl fmt::Display for CanonicalPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn file(raw: &str) -> Result<String, PathError> {
        canonicalize(raw, PathMode::FilePath)
    }

    fn prefix(raw: &str) -> Result<String, PathError> {
        canonicalize(raw, PathMode::Prefix)
    }

    #[test]
    fn test_valid_examples() {
        assert_eq!(prefix("/agent1").unwrap(), "/agent1");
        assert_eq!(
            file("/agent1/files/manifest.json").unwrap(),
            "/agent1/files/manifest.json"
        );
        assert_eq!(file("/A-b_9/Z").unwrap(), "/A-b_9/Z");
    }

    #[test]
    fn test_root_handling() {
        assert_eq!(prefix("/").unwrap(), "/");
        assert_eq!(file("/"), Err(PathError::RootNotAllowed));
    }

    #[test]
    fn test_empty_and_relative() {
        assert_eq!(file(""), Err(PathError::Empty));
        assert_eq!(prefix(""), Err(PathError::Empty));
        assert_eq!(file("agent1/x"), Err(PathError::MissingLeadingSlash));
        assert_eq!(prefix(" /agent1"), Err(PathError::MissingLeadingSlash));
    }

    #[test]
    fn test_slash_rules() {
        assert_eq!(file("//a"), Err(PathError::EmptySegment { position: 1 }));
        assert_eq!(prefix("/a//b"), Err(PathError::EmptySegment { position: 3 }));
        assert_eq!(prefix("/a/"), Err(PathError::TrailingSlash { position: 2 }));
        assert_eq!(file("/a/b/"), Err(PathError::TrailingSlash { position: 4 }));
    }

    #[test]
    fn test_dot_rules() {
        assert_eq!(
            file("/agent1/files/manifest..json"),
            Err(PathError::MultipleDots { position: 23 })
        );
        assert_eq!(file("/a/b.c.d"), Err(PathError::MultipleDots { position: 6 }));
        assert_eq!(file("/a.b/c"), Err(PathError::DotNotAllowed { position: 2 }));
        assert_eq!(prefix("/a/b.c"), Err(PathError::DotNotAllowed { position: 4 }));
        assert_eq!(file("/a/.hidden"), Err(PathError::DotAtSegmentEdge { position: 3 }));
        assert_eq!(file("/a/trailing."), Err(PathError::DotAtSegmentEdge { position: 11 }));
        assert_eq!(file("/."), Err(PathError::DotAtSegmentEdge { position: 1 }));
    }

    #[test]
    fn test_traversal_attempts_rejected() {
        assert!(file("/a/../b").is_err());
        assert!(file("/a/..").is_err());
        assert!(file("/a/./b").is_err());
        assert!(prefix("/..").is_err());
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(
            file("/agent1/files/mani@fest.json"),
            Err(PathError::IllegalCharacter { ch: '@', position: 18 })
        );
        assert_eq!(
            prefix("/a b"),
            Err(PathError::IllegalCharacter { ch: ' ', position: 2 })
        );
        assert_eq!(
            file("/caf\u{e9}"),
            Err(PathError::IllegalCharacter { ch: '\u{e9}', position: 4 })
        );
        assert!(file("/a\\b").is_err());
        assert!(file("/a\0").is_err());
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(file("/Agent1/ReadMe.MD").unwrap(), "/Agent1/ReadMe.MD");
    }

    #[test]
    fn test_very_long_path() {
        let raw = format!("/{}", vec!["segment"; 2_000].join("/"));
        assert_eq!(file(&raw).unwrap(), raw);
        assert_eq!(prefix(&raw).unwrap(), raw);
    }

    #[test]
    fn test_typed_wrappers() {
        let path = CanonicalPath::parse("/shared/data/file1").unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), ["shared", "data", "file1"]);
        assert!(CanonicalPrefix::root().covers(&path));
        assert!(CanonicalPrefix::parse("/shared").unwrap().covers(&path));
        assert!(CanonicalPath::parse("/").is_err());
        assert!(CanonicalPrefix::parse("/").unwrap().is_root());
    }

    #[test]
    fn test_serde_revalidates() {
        let ok: CanonicalPrefix = serde_json::from_str("\"/agent1\"").unwrap();
        assert_eq!(ok.as_str(), "/agent1");
        assert!(serde_json::from_str::<CanonicalPrefix>("\"/agent1/\"").is_err());
        assert!(serde_json::from_str::<CanonicalPath>("\"/x/a.b.c\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_no_leading_slash_fails(s in "[^/].*") {
            prop_assert!(file(&s).is_err());
            prop_assert!(prefix(&s).is_err());
        }

        #[test]
        fn prop_double_slash_fails(a in "[a-z/.]{0,8}", b in "[a-z/.]{0,8}") {
            let s = format!("/{a}//{b}");
            prop_assert!(file(&s).is_err());
            prop_assert!(prefix(&s).is_err());
        }

        #[test]
        fn prop_canonical_is_idempotent(s in "/[A-Za-z0-9_./-]{0,24}") {
            for mode in [PathMode::Prefix, PathMode::FilePath] {
                if let Ok(once) = canonicalize(&s, mode) {
                    prop_assert_eq!(&once, &s);
                    prop_assert_eq!(canonicalize(&once, mode).unwrap(), once);
                }
            }
        }

        #[test]
        fn prop_valid_prefix_is_valid_file_path(s in "(/[A-Za-z0-9_-]{1,6}){1,5}") {
            prop_assert_eq!(prefix(&s).unwrap(), s.clone());
            prop_assert_eq!(file(&s).unwrap(), s);
        }
    }
}
