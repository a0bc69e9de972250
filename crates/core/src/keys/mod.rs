#![forbid(unsafe_code)]

//! Nested-set key arithmetic.
//!
//! Every function here is pure: it looks at key values already read from the store and
//! returns the shifts a caller must apply, in order, to keep the owner's forest consistent.

use std::fmt;

/// Base offset used to park a moving subtree outside the active key range.
pub const SWAP_OFFSET: i64 = 100_000;

/// Left key of an owner's root.
pub const ROOT_LEFT_KEY: i64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyRange {
    left: i64,
    right: i64,
}

impl KeyRange {
    pub fn try_new(left: i64, right: i64) -> Result<Self, KeyRangeError> {
        if left < ROOT_LEFT_KEY {
            return Err(KeyRangeError::NonPositive { left });
        }
        if left >= right {
            return Err(KeyRangeError::Inverted { left, right });
        }
        Ok(Self { left, right })
    }

    pub fn root() -> Self {
        Self {
            left: ROOT_LEFT_KEY,
            right: ROOT_LEFT_KEY + 1,
        }
    }

    pub fn left(&self) -> i64 {
        self.left
    }

    pub fn right(&self) -> i64 {
        self.right
    }

    pub fn width(&self) -> i64 {
        subtree_width(*self)
    }

    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    pub fn is_root(&self) -> bool {
        self.left == ROOT_LEFT_KEY
    }

    /// Inclusive containment: a range contains itself.
    pub fn contains(&self, other: &KeyRange) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    /// Number of nodes stored in this interval, the node itself included.
    pub fn node_count(&self) -> i64 {
        self.width() / 2
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyRangeError {
    NonPositive { left: i64 },
    Inverted { left: i64, right: i64 },
}

impl KeyRangeError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NonPositive { .. } => "left key must be positive",
            Self::Inverted { .. } => "left key must be below right key",
        }
    }
}

/// Interval units occupied by a node and all of its descendants.
pub fn subtree_width(range: KeyRange) -> i64 {
    1 + range.right - range.left
}

/// Interval taken by a new leaf appended as the last child of `parent`.
pub fn leaf_slot(parent: KeyRange) -> KeyRange {
    KeyRange {
        left: parent.right,
        right: parent.right + 1,
    }
}

/// A `+delta` applied to both key columns for keys in `[from, until)`.
///
/// `until == None` means unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeShift {
    pub from: i64,
    pub until: Option<i64>,
    pub delta: i64,
}

impl RangeShift {
    pub fn unbounded(from: i64, delta: i64) -> Self {
        Self {
            from,
            until: None,
            delta,
        }
    }

    pub fn bounded(from: i64, until: i64, delta: i64) -> Self {
        Self {
            from,
            until: Some(until),
            delta,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.delta == 0 || self.until.is_some_and(|until| until <= self.from)
    }

    pub fn apply(&self, key: i64) -> i64 {
        let below_until = self.until.is_none_or(|until| key < until);
        if key >= self.from && below_until {
            key + self.delta
        } else {
            key
        }
    }
}

/// Shift that makes room for `width` units starting at key `at`.
pub fn open_gap(at: i64, width: i64) -> RangeShift {
    RangeShift::unbounded(at, width)
}

/// Shift that closes the hole left by a removed interval.
pub fn close_gap(removed: KeyRange) -> RangeShift {
    RangeShift::unbounded(removed.left, removed.left - removed.right - 1)
}

/// Offset large enough to park any subtree above every live key of the forest.
pub fn lift_offset(max_key: i64) -> i64 {
    if max_key < SWAP_OFFSET {
        SWAP_OFFSET
    } else {
        max_key + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveMode {
    LastChildOf,
    LeftOf,
}

impl MoveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastChildOf => "last_child_of",
            Self::LeftOf => "left_of",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MovePlanError {
    IntoOwnSubtree,
    RootImmovable,
    BesideRoot,
}

impl MovePlanError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::IntoOwnSubtree => "cannot move a project into its own subtree",
            Self::RootImmovable => "the root project cannot be moved",
            Self::BesideRoot => "cannot place a project beside the root",
        }
    }
}

/// Ordered phases that relocate a subtree.
///
/// 1. `lift`: park the subtree at `+offset`.
/// 2. `compact`: slide the keys between origin and destination over the vacated span.
/// 3. `reinsert`: bring the parked subtree down onto `destination`.
///
/// Paths are rebuilt by the caller afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub lift: RangeShift,
    pub compact: Option<RangeShift>,
    pub reinsert: RangeShift,
    pub destination: KeyRange,
}

impl MovePlan {
    pub fn new(
        node: KeyRange,
        target: KeyRange,
        mode: MoveMode,
        offset: i64,
    ) -> Result<Self, MovePlanError> {
        if node.is_root() {
            return Err(MovePlanError::RootImmovable);
        }
        if node.contains(&target) {
            return Err(MovePlanError::IntoOwnSubtree);
        }
        if mode == MoveMode::LeftOf && target.is_root() {
            return Err(MovePlanError::BesideRoot);
        }

        let width = node.width();
        let dest = match mode {
            MoveMode::LastChildOf => target.right,
            MoveMode::LeftOf => target.left,
        };

        let (compact, new_left) = if dest > node.right {
            (RangeShift::bounded(node.right + 1, dest, -width), dest - width)
        } else {
            (RangeShift::bounded(dest, node.left, width), dest)
        };

        let parked = node.left + offset;
        Ok(Self {
            lift: RangeShift::bounded(node.left, node.right + 1, offset),
            compact: (!compact.is_noop()).then_some(compact),
            reinsert: RangeShift::unbounded(parked, new_left - parked),
            destination: KeyRange {
                left: new_left,
                right: new_left + width - 1,
            },
        })
    }

    /// Applies the plan to a single key, in phase order.
    pub fn relocate(&self, key: i64) -> i64 {
        let key = self.lift.apply(key);
        let key = match self.compact {
            Some(shift) => shift.apply(key),
            None => key,
        };
        self.reinsert.apply(key)
    }
}
