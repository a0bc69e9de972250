#![forbid(unsafe_code)]

use crate::keys::{KeyRange, ROOT_LEFT_KEY};
use crate::paths::{PathEntry, derive_paths};
use std::fmt;

#[derive(Clone, Copy, Debug)]
pub struct ForestNodeView<'a> {
    pub range: KeyRange,
    pub name: &'a str,
    pub level: i64,
    pub path: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForestViolation {
    InvalidInterval { left: i64, right: i64 },
    Unsorted { left: i64 },
    KeysNotContiguous { expected: i64, found: i64 },
    MissingRoot { left: i64 },
    MultipleRoots { left: i64 },
    PartialOverlap { outer: KeyRange, inner: KeyRange },
    LabelMismatch { left: i64, expected_path: String, expected_level: i64 },
    SubtreeCountMismatch { left: i64, expected: i64, found: i64 },
    MisplacedSubtree { expected: KeyRange, left: i64, right: i64 },
}

impl fmt::Display for ForestViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterval { left, right } => {
                write!(f, "invalid interval (left={left}, right={right})")
            }
            Self::Unsorted { left } => write!(f, "nodes not ordered by left key (left={left})"),
            Self::KeysNotContiguous { expected, found } => {
                write!(f, "key space has a hole (expected={expected}, found={found})")
            }
            Self::MissingRoot { left } => write!(f, "first node is not a root (left={left})"),
            Self::MultipleRoots { left } => write!(f, "second top-level node (left={left})"),
            Self::PartialOverlap { outer, inner } => {
                write!(f, "intervals overlap without nesting (outer={outer}, inner={inner})")
            }
            Self::LabelMismatch {
                left,
                expected_path,
                expected_level,
            } => write!(
                f,
                "stale path/level (left={left}, expected_path={expected_path}, expected_level={expected_level})"
            ),
            Self::SubtreeCountMismatch {
                left,
                expected,
                found,
            } => write!(
                f,
                "subtree row count differs from its width (left={left}, expected={expected}, found={found})"
            ),
            Self::MisplacedSubtree {
                expected,
                left,
                right,
            } => write!(
                f,
                "moved subtree landed at [{left}, {right}] instead of {expected}"
            ),
        }
    }
}

impl std::error::Error for ForestViolation {}

/// Checks every structural invariant of one owner's live forest.
///
/// `nodes` must be given in left key order. The forest must be a single tree whose keys are
/// exactly `1..=2n`, every pair of intervals is disjoint or nested, and stored labels match the
/// ancestry derived from the intervals.
pub fn check_forest(nodes: &[ForestNodeView<'_>]) -> Result<(), ForestViolation> {
    let Some(first) = nodes.first() else {
        return Ok(());
    };
    if first.range.left() != ROOT_LEFT_KEY {
        return Err(ForestViolation::MissingRoot {
            left: first.range.left(),
        });
    }

    for pair in nodes.windows(2) {
        if pair[1].range.left() <= pair[0].range.left() {
            return Err(ForestViolation::Unsorted {
                left: pair[1].range.left(),
            });
        }
    }

    let mut keys = nodes
        .iter()
        .flat_map(|node| [node.range.left(), node.range.right()])
        .collect::<Vec<_>>();
    keys.sort_unstable();
    for (index, found) in keys.iter().enumerate() {
        let expected = index as i64 + 1;
        if *found != expected {
            return Err(ForestViolation::KeysNotContiguous {
                expected,
                found: *found,
            });
        }
    }

    let mut open: Vec<KeyRange> = Vec::new();
    for node in nodes {
        while open.last().is_some_and(|outer| outer.right() < node.range.left()) {
            open.pop();
        }
        match open.last() {
            Some(outer) if !outer.contains(&node.range) => {
                return Err(ForestViolation::PartialOverlap {
                    outer: *outer,
                    inner: node.range,
                });
            }
            None if node.range.left() != ROOT_LEFT_KEY => {
                return Err(ForestViolation::MultipleRoots {
                    left: node.range.left(),
                });
            }
            _ => {}
        }
        open.push(node.range);
    }

    let entries = nodes
        .iter()
        .map(|node| PathEntry {
            range: node.range,
            name: node.name,
        })
        .collect::<Vec<_>>();
    for (node, derived) in nodes.iter().zip(derive_paths(&entries)) {
        if node.path != derived.path || node.level != derived.level {
            return Err(ForestViolation::LabelMismatch {
                left: node.range.left(),
                expected_path: derived.path,
                expected_level: derived.level,
            });
        }
    }

    Ok(())
}
