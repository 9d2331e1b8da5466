//! Dotted store paths and the resolver that walks them.
//!
//! Example: `persons.alice`  =>  Path(vec!["persons", "alice"])
//!
//! There is no escaping: a key can never contain a literal `.`.

use crate::store::error::StoreError;
use crate::store::object::{Mapping, Node};
use crate::store::slot::Slot;
use std::fmt;
use std::str::FromStr;

/// A parsed, non-empty sequence of non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Split a dotted string into segments.
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StoreError::invalid_path(input, "empty path"));
        }

        let mut segments = Vec::new();
        for part in input.split('.') {
            if part.is_empty() {
                return Err(StoreError::invalid_path(input, "empty segment"));
            }
            segments.push(part.to_string());
        }

        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The final segment (the slot key inside the parent mapping).
    pub fn last(&self) -> &str {
        // parse() guarantees at least one segment
        &self.0[self.0.len() - 1]
    }

    /// All segments except the last one.
    pub fn parents(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }

    /// Dotted form of the first `depth` segments.
    pub fn prefix(&self, depth: usize) -> String {
        self.0[..depth.min(self.0.len())].join(".")
    }

    /// The first `depth` segments as a path of their own.
    pub fn ancestor(&self, depth: usize) -> Path {
        Path(self.0[..depth.clamp(1, self.0.len())].to_vec())
    }

    /// Segments after the first `depth`.
    pub fn below(&self, depth: usize) -> &[String] {
        &self.0[depth.min(self.0.len())..]
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for Path {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Outcome of walking a path without creating anything.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The terminal entry exists.
    Found(&'a Node),
    /// Some segment is missing.
    NotFound,
    /// The first `depth` segments lead to a slot; the rest of the path
    /// addresses the value that slot holds.
    Within { slot: &'a Slot, depth: usize },
}

/// Walk `path` from `root`. No partial match is ever reported as found.
pub fn resolve<'a>(root: &'a Mapping, path: &Path) -> Resolution<'a> {
    let mut current = root;
    for (depth, segment) in path.parents().iter().enumerate() {
        match current.get(segment) {
            Some(Node::Map(map)) => current = map,
            Some(Node::Slot(slot)) => {
                return Resolution::Within {
                    slot,
                    depth: depth + 1,
                };
            }
            None => return Resolution::NotFound,
        }
    }

    match current.get(path.last()) {
        Some(node) => Resolution::Found(node),
        None => Resolution::NotFound,
    }
}

/// Walk to the parent mapping of `path`'s final segment, creating empty
/// mappings for missing intermediates. The final slot is left to the caller.
///
/// An intermediate occupied by a slot is a `PathConflict`; it is never
/// replaced by a mapping.
pub fn ensure<'a>(root: &'a mut Mapping, path: &Path) -> Result<&'a mut Mapping, StoreError> {
    let mut current = root;
    for (depth, segment) in path.parents().iter().enumerate() {
        let node = current
            .entry(segment.clone())
            .or_insert_with(|| Node::Map(Mapping::new()));
        current = match node {
            Node::Map(map) => map,
            Node::Slot(_) => {
                return Err(StoreError::path_conflict(path, path.prefix(depth + 1)));
            }
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(v: serde_json::Value) -> Node {
        Node::Slot(Slot::Plain(v))
    }

    #[test]
    fn parse_splits_on_dots() {
        let p = Path::parse("persons.john").unwrap();
        assert_eq!(p.segments(), &["persons".to_string(), "john".to_string()]);
        assert_eq!(p.last(), "john");
        assert_eq!(p.parents(), &["persons".to_string()]);
        assert_eq!(p.to_string(), "persons.john");
    }

    #[test]
    fn parse_rejects_empty_input_and_segments() {
        assert!(matches!(Path::parse(""), Err(StoreError::InvalidPath { .. })));
        assert!(matches!(Path::parse("   "), Err(StoreError::InvalidPath { .. })));
        assert!(matches!(Path::parse("a..b"), Err(StoreError::InvalidPath { .. })));
        assert!(matches!(Path::parse(".a"), Err(StoreError::InvalidPath { .. })));
    }

    #[test]
    fn single_segment_path_has_no_parents() {
        let p = Path::parse("root").unwrap();
        assert!(p.parents().is_empty());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn resolve_reports_not_found_for_missing_segments() {
        let root = Mapping::new();
        let p = Path::parse("a.b.c").unwrap();
        assert!(matches!(resolve(&root, &p), Resolution::NotFound));
    }

    #[test]
    fn resolve_stops_at_slot_in_the_middle() {
        let mut root = Mapping::new();
        root.insert("a".into(), plain(json!({"b": 1})));
        let p = Path::parse("a.b").unwrap();
        match resolve(&root, &p) {
            Resolution::Within { slot, depth } => {
                assert_eq!(depth, 1);
                assert_eq!(p.prefix(depth), "a");
                assert_eq!(p.below(depth), &["b".to_string()]);
                assert_eq!(slot.read(), json!({"b": 1}));
            }
            other => panic!("expected Within, got {:?}", other),
        }
    }

    #[test]
    fn ancestor_and_below_split_the_path() {
        let p = Path::parse("persons.alice.age").unwrap();
        assert_eq!(p.ancestor(1).to_string(), "persons");
        assert_eq!(p.ancestor(2).to_string(), "persons.alice");
        assert!(p.below(3).is_empty());
    }

    #[test]
    fn ensure_creates_one_chain_no_matter_how_often_called() {
        let mut root = Mapping::new();
        let p = Path::parse("a.b.c").unwrap();

        ensure(&mut root, &p).unwrap();
        ensure(&mut root, &p).unwrap();

        assert_eq!(root.len(), 1);
        let Some(Node::Map(a)) = root.get("a") else {
            panic!("a should be a mapping");
        };
        assert_eq!(a.len(), 1);
        let Some(Node::Map(b)) = a.get("b") else {
            panic!("b should be a mapping");
        };
        // the final segment is not created
        assert!(b.is_empty());
    }

    #[test]
    fn ensure_refuses_to_overwrite_a_slot() {
        let mut root = Mapping::new();
        root.insert("a".into(), plain(json!(5)));
        let p = Path::parse("a.b").unwrap();

        let err = ensure(&mut root, &p).unwrap_err();
        assert!(matches!(err, StoreError::PathConflict { ref at, .. } if at == "a"));
        assert!(matches!(root.get("a"), Some(Node::Slot(Slot::Plain(v))) if *v == json!(5)));
    }
}
