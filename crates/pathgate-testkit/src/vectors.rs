//! Golden test vectors for deterministic verification.
//!
//! One shared vector set for the grammar, the matcher and the path hash.
//! The registry and every client copy are tested against these, never
//! against each other.

use pathgate_core::{canonicalize, matches, CanonicalPath, PathHash, PathMode};

/// A canonicalization case.
#[derive(Debug, Clone)]
pub struct PathVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub input: &'static str,
    pub mode: PathMode,
    /// `Ok(canonical)` or `Err(rule)`, where `rule` is
    /// [`PathError::rule`](pathgate_core::PathError::rule).
    pub expected: Result<&'static str, &'static str>,
}

/// A strict-subtree matching case. Both sides are canonical.
#[derive(Debug, Clone)]
pub struct MatchVector {
    pub path: &'static str,
    pub prefix: &'static str,
    pub expected: bool,
}

/// A path hash case.
#[derive(Debug, Clone)]
pub struct HashVector {
    pub path: &'static str,
    /// Keccak-256 of the UTF-8 bytes, lowercase hex.
    pub expected_hex: &'static str,
}

const fn ok(
    name: &'static str,
    input: &'static str,
    mode: PathMode,
) -> PathVector {
    PathVector {
        name,
        input,
        mode,
        expected: Ok(input),
    }
}

const fn err(
    name: &'static str,
    input: &'static str,
    mode: PathMode,
    rule: &'static str,
) -> PathVector {
    PathVector {
        name,
        input,
        mode,
        expected: Err(rule),
    }
}

/// Get all canonicalization vectors.
pub fn path_vectors() -> Vec<PathVector> {
    use PathMode::{FilePath, Prefix};

    vec![
        ok("simple prefix", "/agent1", Prefix),
        ok("nested prefix", "/shared/data", Prefix),
        ok("root prefix", "/", Prefix),
        ok("file with extension", "/agent1/files/manifest.json", FilePath),
        ok("file without extension", "/shared/data/sub/file1", FilePath),
        ok("case preserved", "/Agent1/Readme.md", FilePath),
        ok("every character class", "/x/y_z-9/v1.tar", FilePath),
        ok("single segment file", "/a", FilePath),
        err("empty file path", "", FilePath, "empty"),
        err("empty prefix", "", Prefix, "empty"),
        err("root as file", "/", FilePath, "root-not-allowed"),
        err("relative path", "agent1/x", FilePath, "missing-leading-slash"),
        err("relative prefix", "agent1", Prefix, "missing-leading-slash"),
        err("double slash", "/a//b", FilePath, "empty-segment"),
        err("leading double slash", "//a", Prefix, "empty-segment"),
        err("trailing slash prefix", "/a/", Prefix, "trailing-slash"),
        err("trailing slash file", "/a/b/", FilePath, "trailing-slash"),
        err("two dots in final segment", "/agent1/files/manifest..json", FilePath, "multiple-dots"),
        err("dot-dot segment", "/a/..", FilePath, "multiple-dots"),
        err("illegal at sign", "/agent1/files/mani@fest.json", FilePath, "illegal-character"),
        err("space", "/a/b c", FilePath, "illegal-character"),
        err("non-ascii letter", "/a/\u{fc}", FilePath, "illegal-character"),
        err("dot in prefix", "/a.b", Prefix, "dot-not-allowed"),
        err("dot in directory", "/a.b/c", FilePath, "dot-not-allowed"),
        err("parent escape", "/a/../b", FilePath, "dot-not-allowed"),
        err("hidden file", "/a/.hidden", FilePath, "dot-at-segment-edge"),
        err("trailing dot", "/a/file.", FilePath, "dot-at-segment-edge"),
    ]
}

/// Get all matching vectors.
pub fn match_vectors() -> Vec<MatchVector> {
    let v = |path, prefix, expected| MatchVector {
        path,
        prefix,
        expected,
    };
    vec![
        v("/shared/data/sub/file1", "/shared/data", true),
        v("/shared/database/file1", "/shared/data", false),
        v("/agent10/x", "/agent1", false),
        v("/agent1", "/agent1", true),
        v("/agent1/files/manifest.json", "/agent1/files", true),
        v("/agent", "/agent1", false),
        v("/Agent1/x", "/agent1", false),
        v("/anything/at/all.txt", "/", true),
        v("/a", "/", true),
    ]
}

/// Get all hash vectors.
pub fn hash_vectors() -> Vec<HashVector> {
    let v = |path, expected_hex| HashVector { path, expected_hex };
    vec![
        v(
            "/agent1/files/manifest.json",
            "c454ab81d045193e0bcc0adc719ac2ba49d290fb549661bc40f73c49368708c3",
        ),
        v(
            "/shared/data/sub/file1",
            "d3ad8cd58eaf6929687b1b6c48597968073ead9a60d3f076865db6f5905aea21",
        ),
        v(
            "/a",
            "13dc46abd8d043a06e274afcbe84541cc241d6f2891f97e3162e19e99377843a",
        ),
        v(
            "/Agent1/Readme.md",
            "e1e353e2ab49aebc309bfbbe41e7138d2602a85badfb9cb6584925ba856105e0",
        ),
        v(
            "/agent1",
            "f8ed5cfacff3697c9427c2e512db96a483fbf79cbfb2c5ce69c42def2734afd6",
        ),
        v(
            "/x/y_z-9/v1.tar",
            "35a34f80ee5032b58f9c24bbbc55389e963500407ca6c6617e7ebfc49a40cb20",
        ),
    ]
}

/// Run every vector against this implementation.
///
/// Returns `(name, passed, detail)` for each case.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mut results = Vec::new();

    for v in path_vectors() {
        let got = canonicalize(v.input, v.mode).map_err(|e| e.rule());
        let passed = match (&got, v.expected) {
            (Ok(s), Ok(expected)) => s == expected,
            (Err(rule), Err(expected)) => *rule == expected,
            _ => false,
        };
        results.push((format!("path: {}", v.name), passed, format!("{got:?}")));
    }

    for v in match_vectors() {
        let got = matches(v.path, v.prefix);
        results.push((
            format!("match: {} under {}", v.path, v.prefix),
            got == v.expected,
            got.to_string(),
        ));
    }

    for v in hash_vectors() {
        let got = CanonicalPath::parse(v.path).map(|p| PathHash::of(&p).to_hex());
        let passed = got.as_deref() == Ok(v.expected_hex);
        results.push((format!("hash: {}", v.path), passed, format!("{got:?}")));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        let failures: Vec<_> = verify_all_vectors()
            .into_iter()
            .filter(|(_, passed, _)| !passed)
            .collect();
        assert!(failures.is_empty(), "failing vectors: {failures:#?}");
    }

    #[test]
    fn test_vector_inputs_are_canonical_where_valid() {
        for v in path_vectors() {
            if let Ok(expected) = v.expected {
                assert_eq!(v.input, expected, "{}", v.name);
            }
        }
    }
}
