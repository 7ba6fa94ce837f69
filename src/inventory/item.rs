use serde::{Deserialize, Serialize};

use crate::common::{Archetype, ItemId};

use super::InventoryError;

/// Represents a stack of items of a single archetype.
///
/// A stored item always has a non-zero quantity, slots that run out are emptied instead.
#[derive(Default, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub quantity: u32,
    #[serde(skip)]
    pub stack_size: u32,
}

impl Item {
    pub fn new(info: &(impl Archetype + ?Sized), quantity: u32) -> Self {
        Self {
            id: info.type_id().clone(),
            quantity,
            stack_size: info.max_stack(),
        }
    }

    /// Checks that this names a real archetype and a positive quantity.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.id.is_empty() {
            return Err(InventoryError::InvalidInput("item has no type identifier"));
        }
        if self.quantity == 0 {
            return Err(InventoryError::InvalidInput("item quantity must be positive"));
        }

        Ok(())
    }

    /// Like [`Item::validate`], but also requires a usable stack size.
    pub fn validate_for_storage(&self) -> Result<(), InventoryError> {
        self.validate()?;
        if self.stack_size == 0 {
            return Err(InventoryError::InvalidInput("item stack size must be positive"));
        }

        Ok(())
    }

    /// Whether `other` belongs to the same archetype.
    pub fn is_same_kind(&self, other: &Item) -> bool {
        self.id == other.id
    }

    pub fn is_full(&self) -> bool {
        self.quantity >= self.stack_size
    }

    /// How many more fit into this stack.
    pub fn free_space(&self) -> u32 {
        self.stack_size.saturating_sub(self.quantity)
    }

    /// Tops this stack up by at most `quantity`, returns how many were actually added.
    pub fn try_add(&mut self, quantity: u32) -> u32 {
        let added = quantity.min(self.free_space());
        self.quantity += added;
        added
    }

    /// Takes at most `quantity` from this stack, returns how many were actually removed.
    pub fn try_remove(&mut self, quantity: u32) -> u32 {
        let removed = quantity.min(self.quantity);
        self.quantity -= removed;
        removed
    }

    /// Returns a copy of this item with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(quantity: u32) -> Item {
        Item {
            id: ItemId::new("arrow"),
            quantity,
            stack_size: 10,
        }
    }

    #[test]
    fn add_clamps_to_stack_size() {
        let mut item = stack(8);
        assert_eq!(item.try_add(5), 2);
        assert_eq!(item.quantity, 10);
        assert!(item.is_full());
        assert_eq!(item.try_add(1), 0);
    }

    #[test]
    fn remove_clamps_to_quantity() {
        let mut item = stack(3);
        assert_eq!(item.try_remove(2), 2);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.try_remove(5), 1);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn validation() {
        assert!(stack(1).validate().is_ok());
        assert!(stack(0).validate().is_err());
        assert!(Item::default().validate().is_err());

        let mut unbounded = stack(1);
        unbounded.stack_size = 0;
        assert!(unbounded.validate().is_ok());
        assert!(unbounded.validate_for_storage().is_err());
    }
}
