use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

mod gamedata;
pub use gamedata::{ItemCatalog, ItemInfo, ItemInfoQuery};

/// Stable type identifier of an item archetype.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty identifier never names a real archetype.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The read-only part of an item that storage cares about.
///
/// Storage only ever asks which archetype an item belongs to, how many of
/// them fit into a single slot and whether they may be thrown away. It never
/// mutates archetype data.
pub trait Archetype {
    fn type_id(&self) -> &ItemId;
    fn max_stack(&self) -> u32;

    /// Whether stacks of this archetype may be discarded.
    fn droppable(&self) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemFlags(u8);

bitflags! {
    impl ItemFlags : u8 {
        const NONE = 0x00;
        const STACKABLE = 0x01;
        const DROPPABLE = 0x02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_empty() {
        assert!(ItemId::default().is_empty());
        assert!(ItemId::new("  ").is_empty());
        assert!(!ItemId::new("potion").is_empty());
        assert_eq!(ItemId::from("potion").to_string(), "potion");
    }
}
