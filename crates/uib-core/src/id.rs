use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for node IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Id of the canvas root node of every screen tree.
pub const ROOT_ID: &str = "root";

/// Id of the synthetic wrapper View used when a screen exports more than one
/// top-level node.
pub const SCREEN_WRAPPER_ID: &str = "screen";

/// A lightweight, interned identifier for nodes in a UI tree.
/// Internally a 4-byte `Spur` index, so copies and comparisons are O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The canvas root id (`"root"`).
    pub fn root() -> Self {
        Self::intern(ROOT_ID)
    }

    pub fn is_root(&self) -> bool {
        self.as_str() == ROOT_ID
    }

    /// Generate a fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }

    /// Read an id from loosely-typed JSON. Strings are taken as-is and
    /// numbers are coerced to their decimal form, so a node stored with id
    /// `5` is addressable as `"5"`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::intern(s)),
            Value::Number(n) => Some(Self::intern(&n.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        NodeId::from_json(&value).ok_or_else(|| serde::de::Error::custom("node id must be a string or number"))
    }
}
