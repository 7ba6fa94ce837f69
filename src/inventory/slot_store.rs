use std::collections::{BTreeSet, HashMap};

use crate::common::ItemId;

use super::{InventoryError, Item, Storage};

/// Sparse map from slot index to item-or-empty.
///
/// The slots present always form the contiguous range `0..=max_index`. Emptying a
/// slot keeps it around, the range never shrinks for the lifetime of the store.
/// Empty slots are tracked in an ordered free set so the lowest one is reused
/// first, and every occupied slot is indexed by the type of item it holds.
/// This knows nothing about stacking, see [`super::Inventory`] for that.
#[derive(Debug, Default, Clone)]
pub struct SlotStore {
    slots: Vec<Option<Item>>,
    free: BTreeSet<u32>,
    by_type: HashMap<ItemId, BTreeSet<u32>>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item in this slot, `None` for an empty or nonexistent slot.
    pub fn get(&self, index: u32) -> Option<&Item> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Mutable access for in-place quantity changes. The item's id must not be changed through this.
    pub(super) fn get_mut(&mut self, index: u32) -> Option<&mut Item> {
        self.slots.get_mut(index as usize)?.as_mut()
    }

    /// Stores `item` in the lowest empty slot, or a new slot at the end if there is none.
    pub fn allocate(&mut self, item: Item) -> Result<u32, InventoryError> {
        if item.id.is_empty() {
            return Err(InventoryError::InvalidInput("item has no type identifier"));
        }

        let index = match self.free.first() {
            Some(&index) => index,
            None => {
                let index = self.next_index()?;
                self.slots.push(None);
                index
            }
        };

        self.write(index, item);

        Ok(index)
    }

    /// Stores `item` at exactly `index`. If `index` is past the end, every slot in
    /// between is created empty.
    pub fn insert_at(&mut self, index: u32, item: Item) -> Result<(), InventoryError> {
        if item.id.is_empty() {
            return Err(InventoryError::InvalidInput("item has no type identifier"));
        }
        if self.is_occupied(index) {
            return Err(InventoryError::SlotOccupied(index));
        }

        self.grow_to(index)?;
        self.write(index, item);

        Ok(())
    }

    /// Empties a slot, keeping the slot itself. Returns what it held.
    pub fn delete(&mut self, index: u32) -> Result<Option<Item>, InventoryError> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(InventoryError::SlotNotFound(index))?;

        let old = slot.take();
        self.free.insert(index);
        if let Some(item) = &old {
            self.unindex(&item.id, index);
        }

        Ok(old)
    }

    /// Overwrites whatever is in an existing slot.
    pub fn update(&mut self, index: u32, item: Item) -> Result<(), InventoryError> {
        if item.id.is_empty() {
            return Err(InventoryError::InvalidInput("item has no type identifier"));
        }

        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(InventoryError::SlotNotFound(index))?;

        if let Some(old) = slot.take() {
            self.unindex(&old.id, index);
        }
        self.write(index, item);

        Ok(())
    }

    /// Empties every slot holding this type, returning what was removed in ascending slot order.
    pub fn delete_all_for_type(&mut self, id: &ItemId) -> Vec<(u32, Item)> {
        let Some(indices) = self.by_type.remove(id) else {
            return Vec::new();
        };

        indices
            .into_iter()
            .filter_map(|index| {
                let item = self.slots[index as usize].take()?;
                self.free.insert(index);
                Some((index, item))
            })
            .collect()
    }

    /// Occupied slots holding this type, in ascending order.
    pub fn indices_for_type(&self, id: &ItemId) -> Vec<u32> {
        self.by_type
            .get(id)
            .map(|indices| indices.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Items of this type, in ascending slot order.
    pub fn items_for_type(&self, id: &ItemId) -> Vec<&Item> {
        self.by_type
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.get(index))
            .collect()
    }

    /// Total quantity stored across every slot of this type.
    pub fn count_for_type(&self, id: &ItemId) -> u32 {
        self.items_for_type(id)
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    pub fn is_occupied(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    /// The highest slot index, or `None` if there are no slots yet.
    pub fn max_index(&self) -> Option<u32> {
        self.slot_count().checked_sub(1)
    }

    pub fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of slots holding an item.
    pub fn valid_item_count(&self) -> u32 {
        (self.slots.len() - self.free.len()) as u32
    }

    /// Empty slots, lowest first.
    pub fn free_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.free.iter().copied()
    }

    /// Every slot in order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&Item>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index as u32, slot.as_ref()))
    }

    /// Creates empty slots up to and including `index`. The slot count has to
    /// fit in a `u32`, so `u32::MAX` itself is never a valid index.
    pub(super) fn grow_to(&mut self, index: u32) -> Result<(), InventoryError> {
        if index == u32::MAX {
            return Err(InventoryError::InvalidInput("no slot indices left"));
        }

        for i in self.slot_count()..=index {
            self.slots.push(None);
            self.free.insert(i);
        }

        Ok(())
    }

    fn next_index(&self) -> Result<u32, InventoryError> {
        match u32::try_from(self.slots.len()) {
            Ok(index) if index < u32::MAX => Ok(index),
            _ => Err(InventoryError::InvalidInput("no slot indices left")),
        }
    }

    /// The slot must already exist and be empty.
    fn write(&mut self, index: u32, item: Item) {
        self.free.remove(&index);
        self.by_type.entry(item.id.clone()).or_default().insert(index);
        self.slots[index as usize] = Some(item);
    }

    fn unindex(&mut self, id: &ItemId, index: u32) {
        if let Some(indices) = self.by_type.get_mut(id) {
            indices.remove(&index);
            if indices.is_empty() {
                self.by_type.remove(id);
            }
        }
    }

    /// Panics if the free set or type index disagree with the slots.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (index, slot) in self.iter() {
            match slot {
                Some(item) => {
                    assert!(!self.free.contains(&index), "occupied slot {index} is free");
                    assert!(item.quantity > 0, "slot {index} holds an empty stack");
                    assert!(
                        self.by_type
                            .get(&item.id)
                            .is_some_and(|indices| indices.contains(&index)),
                        "slot {index} missing from the type index"
                    );
                }
                None => assert!(self.free.contains(&index), "empty slot {index} not free"),
            }
        }

        assert!(self.free.iter().all(|&index| index < self.slot_count()));

        for (id, indices) in &self.by_type {
            assert!(!indices.is_empty(), "stale type index entry for {id}");
            for &index in indices {
                assert_eq!(self.get(index).map(|item| &item.id), Some(id));
            }
        }
    }
}

impl Storage for SlotStore {
    fn slot_count(&self) -> u32 {
        SlotStore::slot_count(self)
    }

    fn num_items(&self) -> u32 {
        self.valid_item_count()
    }

    fn get_slot(&self, index: u32) -> Option<&Item> {
        self.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::get_next_free_slot;

    fn item(id: &str, quantity: u32) -> Item {
        Item {
            id: ItemId::new(id),
            quantity,
            stack_size: 10,
        }
    }

    #[test]
    fn empty_store() {
        let store = SlotStore::new();
        assert_eq!(store.max_index(), None);
        assert_eq!(store.slot_count(), 0);
        assert_eq!(store.valid_item_count(), 0);
        assert_eq!(store.get(0), None);
        assert!(!store.is_occupied(0));
    }

    #[test]
    fn allocate_appends_then_reuses_lowest() {
        let mut store = SlotStore::new();
        assert_eq!(store.allocate(item("a", 1)), Ok(0));
        assert_eq!(store.allocate(item("b", 1)), Ok(1));
        assert_eq!(store.allocate(item("c", 1)), Ok(2));

        store.delete(2).unwrap();
        store.delete(0).unwrap();
        assert_eq!(store.free_indices().collect::<Vec<_>>(), vec![0, 2]);

        assert_eq!(store.allocate(item("d", 1)), Ok(0));
        assert_eq!(store.allocate(item("e", 1)), Ok(2));
        assert_eq!(store.allocate(item("f", 1)), Ok(3));
        assert_eq!(store.max_index(), Some(3));
        store.assert_consistent();
    }

    #[test]
    fn allocate_rejects_missing_id() {
        let mut store = SlotStore::new();
        assert!(matches!(
            store.allocate(item("", 1)),
            Err(InventoryError::InvalidInput(_))
        ));
        assert_eq!(store.slot_count(), 0);
    }

    #[test]
    fn insert_at_fills_gap() {
        let mut store = SlotStore::new();
        store.insert_at(3, item("x", 1)).unwrap();

        assert_eq!(store.max_index(), Some(3));
        assert_eq!(store.free_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(store.get(3), Some(&item("x", 1)));
        assert_eq!(get_next_free_slot(&store), Some(0));
        store.assert_consistent();

        // filling one of the gaps doesn't grow the range
        store.insert_at(1, item("y", 1)).unwrap();
        assert_eq!(store.max_index(), Some(3));
        assert_eq!(store.free_indices().collect::<Vec<_>>(), vec![0, 2]);
        store.assert_consistent();
    }

    #[test]
    fn insert_at_occupied() {
        let mut store = SlotStore::new();
        store.insert_at(0, item("x", 1)).unwrap();
        assert_eq!(
            store.insert_at(0, item("y", 1)),
            Err(InventoryError::SlotOccupied(0))
        );
        assert_eq!(store.get(0), Some(&item("x", 1)));
    }

    #[test]
    fn insert_at_last_index_is_rejected() {
        let mut store = SlotStore::new();
        store.allocate(item("a", 1)).unwrap();

        assert_eq!(
            store.insert_at(u32::MAX, item("x", 1)),
            Err(InventoryError::InvalidInput("no slot indices left"))
        );
        assert_eq!(store.slot_count(), 1);
        assert_eq!(store.free_indices().count(), 0);
        store.assert_consistent();
    }

    #[test]
    fn delete_keeps_slot() {
        let mut store = SlotStore::new();
        store.allocate(item("a", 4)).unwrap();

        assert_eq!(store.delete(0), Ok(Some(item("a", 4))));
        assert_eq!(store.slot_count(), 1);
        assert!(store.indices_for_type(&ItemId::new("a")).is_empty());

        // deleting an already empty slot is fine
        assert_eq!(store.delete(0), Ok(None));
        assert_eq!(store.delete(1), Err(InventoryError::SlotNotFound(1)));
        store.assert_consistent();
    }

    #[test]
    fn update_moves_type_index() {
        let mut store = SlotStore::new();
        store.allocate(item("a", 1)).unwrap();
        store.insert_at(2, item("a", 2)).unwrap();

        store.update(0, item("b", 5)).unwrap();
        assert_eq!(store.indices_for_type(&ItemId::new("a")), vec![2]);
        assert_eq!(store.indices_for_type(&ItemId::new("b")), vec![0]);

        // empty to occupied
        store.update(1, item("b", 1)).unwrap();
        assert_eq!(store.indices_for_type(&ItemId::new("b")), vec![0, 1]);
        assert_eq!(store.free_indices().count(), 0);

        assert_eq!(
            store.update(3, item("b", 1)),
            Err(InventoryError::SlotNotFound(3))
        );
        store.assert_consistent();
    }

    #[test]
    fn counts_by_type() {
        let mut store = SlotStore::new();
        store.allocate(item("a", 4)).unwrap();
        store.allocate(item("b", 1)).unwrap();
        store.allocate(item("a", 7)).unwrap();

        let a = ItemId::new("a");
        assert_eq!(store.count_for_type(&a), 11);
        assert_eq!(store.items_for_type(&a).len(), 2);
        assert_eq!(store.count_for_type(&ItemId::new("missing")), 0);
        assert_eq!(store.valid_item_count(), 3);
    }

    #[test]
    fn delete_all_for_type() {
        let mut store = SlotStore::new();
        store.allocate(item("a", 4)).unwrap();
        store.allocate(item("b", 1)).unwrap();
        store.allocate(item("a", 7)).unwrap();

        let removed = store.delete_all_for_type(&ItemId::new("a"));
        assert_eq!(removed, vec![(0, item("a", 4)), (2, item("a", 7))]);
        assert_eq!(store.free_indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(store.slot_count(), 3);
        assert!(store.delete_all_for_type(&ItemId::new("a")).is_empty());
        store.assert_consistent();
    }

    #[test]
    fn stays_consistent_under_mixed_operations() {
        let mut store = SlotStore::new();
        let ids = ["a", "b", "c"];

        for step in 0u32..200 {
            let id = ids[(step % 3) as usize];
            match step % 7 {
                0 | 1 | 2 => {
                    store.allocate(item(id, step % 9 + 1)).unwrap();
                }
                3 => {
                    let _ = store.insert_at(step % 40, item(id, 1));
                }
                4 => {
                    let _ = store.delete(step % 25);
                }
                5 => {
                    let _ = store.update(step % 30, item(id, 2));
                }
                _ => {
                    store.delete_all_for_type(&ItemId::new(id));
                }
            }

            store.assert_consistent();
            assert_eq!(store.max_index(), store.slot_count().checked_sub(1));
        }
    }
}
