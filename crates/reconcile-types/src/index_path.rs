use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an item within a sectioned snapshot.
///
/// Ordering is section-major: every item of section `n` sorts before every
/// item of section `n + 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    /// Index of the owning section.
    pub section: usize,
    /// Index of the item within its section.
    pub item: usize,
}

impl IndexPath {
    /// Create an index path.
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_section_major() {
        let a = IndexPath::new(0, 9);
        let b = IndexPath::new(1, 0);
        let c = IndexPath::new(1, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_format() {
        assert_eq!(IndexPath::new(2, 5).to_string(), "[2, 5]");
    }

    #[test]
    fn serde_roundtrip() {
        let path = IndexPath::new(3, 7);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"{"section":3,"item":7}"#);
        let parsed: IndexPath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }
}
