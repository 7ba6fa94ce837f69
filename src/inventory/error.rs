use crate::common::ItemId;

use super::InventoryPlace;

/// Why an inventory operation was rejected. Nothing is ever partially applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("slot {0} already holds an item")]
    SlotOccupied(u32),
    #[error("slot {0} does not exist")]
    SlotNotFound(u32),
    #[error("cannot remove {requested} of {id}, only {available} stored")]
    InsufficientQuantity {
        id: ItemId,
        requested: u32,
        available: u32,
    },
    #[error("slot {index} does not hold {expected}")]
    IdentityMismatch { index: u32, expected: ItemId },
    #[error("{0} cannot be discarded")]
    NotDroppable(ItemId),
    #[error("refusing to clear the {0:?} inventory")]
    GuardedOperationRejected(InventoryPlace),
}
