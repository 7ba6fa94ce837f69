use super::Item;

/// Represents a generic, read-only view of item storage.
pub trait Storage {
    /// Number of slots, including empty ones.
    fn slot_count(&self) -> u32;
    /// Number of slots holding an item.
    fn num_items(&self) -> u32;
    /// The item in this slot, or `None` if it's empty or doesn't exist.
    fn get_slot(&self, index: u32) -> Option<&Item>;
}

/// Finds the first empty slot in this storage.
pub fn get_next_free_slot(storage: &dyn Storage) -> Option<u32> {
    (0..storage.slot_count()).find(|&i| storage.get_slot(i).is_none())
}
