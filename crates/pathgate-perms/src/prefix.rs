//! Prefix sets.

use serde::{Deserialize, Serialize};

use pathgate_core::{CanonicalPath, CanonicalPrefix, PathError};

/// The canonical prefixes granted to one permission key.
///
/// Insertion order is kept for display and storage but has no bearing on
/// matching. Entries are unique by canonical value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSet {
    prefixes: Vec<CanonicalPrefix>,
}

impl PrefixSet {
    /// An empty set; authorizes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize every raw prefix and deduplicate.
    ///
    /// The first invalid entry aborts the whole build, so a caller never ends
    /// up holding a partially applied list.
    pub fn from_raw<I, S>(raw: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for entry in raw {
            set.insert(CanonicalPrefix::parse(entry.as_ref())?);
        }
        Ok(set)
    }

    /// Add a prefix unless an equal one is already present.
    ///
    /// Returns whether the set changed.
    pub fn insert(&mut self, prefix: CanonicalPrefix) -> bool {
        if self.prefixes.contains(&prefix) {
            return false;
        }
        self.prefixes.push(prefix);
        true
    }

    /// Whether `path` lies under at least one prefix.
    pub fn authorizes(&self, path: &CanonicalPath) -> bool {
        self.prefixes.iter().any(|p| p.covers(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPrefix> {
        self.prefixes.iter()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn as_slice(&self) -> &[CanonicalPrefix] {
        &self.prefixes
    }

    pub fn into_vec(self) -> Vec<CanonicalPrefix> {
        self.prefixes
    }
}

impl FromIterator<CanonicalPrefix> for PrefixSet {
    fn from_iter<T: IntoIterator<Item = CanonicalPrefix>>(iter: T) -> Self {
        let mut set = Self::new();
        for prefix in iter {
            set.insert(prefix);
        }
        set
    }
}
