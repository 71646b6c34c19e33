//! Blocks and block kinds
//!
//! A block is one visual instruction node. Blocks live in a flat array owned
//! by the [`Workspace`](crate::Workspace); links between them are indices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Index of a block inside its workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockIndex(pub usize);

impl Display for BlockIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Block kinds the editor palette offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Climb to hover altitude
    TakeOff,
    /// Descend and touch down
    Land,
    /// Fly forward for one second
    Forward,
    /// Fly backward for one second
    Back,
    /// Fly left for one second
    Left,
    /// Fly right for one second
    Right,
    /// Flip in place
    Rotate,
}

impl BlockKind {
    /// All kinds in palette order
    pub const ALL: [BlockKind; 7] = [
        BlockKind::TakeOff,
        BlockKind::Land,
        BlockKind::Forward,
        BlockKind::Right,
        BlockKind::Left,
        BlockKind::Back,
        BlockKind::Rotate,
    ];

    /// Editor token for this kind
    #[inline]
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            BlockKind::TakeOff => "take_off",
            BlockKind::Land => "land",
            BlockKind::Forward => "forward_1s",
            BlockKind::Back => "back_1s",
            BlockKind::Left => "left_1s",
            BlockKind::Right => "right_1s",
            BlockKind::Rotate => "rotate",
        }
    }

    /// Parse an editor token, `None` for kinds this build does not know
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown block kind: {s}"))
    }
}

/// Bounded numeric parameter attached to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericField {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl NumericField {
    /// Create a field, without checking bounds
    #[inline]
    #[must_use]
    pub const fn new(value: i64, min: i64, max: i64) -> Self {
        Self { value, min, max }
    }

    /// Whether the value lies inside `[min, max]`
    #[inline]
    #[must_use]
    pub const fn in_range(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}

/// One instruction node
///
/// `kind` stays a raw token so that blocks from newer editor palettes survive
/// loading; the compiler decides what to do with kinds it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<BlockIndex>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, NumericField>,
}

impl Block {
    /// Create an unlinked block
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            next: None,
            fields: BTreeMap::new(),
        }
    }

    /// Link to a successor
    #[inline]
    #[must_use]
    pub fn with_next(mut self, next: BlockIndex) -> Self {
        self.next = Some(next);
        self
    }

    /// Attach a numeric field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: NumericField) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Known kind, if any
    #[inline]
    #[must_use]
    pub fn known_kind(&self) -> Option<BlockKind> {
        BlockKind::from_token(&self.kind)
    }
}
