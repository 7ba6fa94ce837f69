use crate::common::{Archetype, ItemId};
use crate::config::PlaceConfig;

use super::{InventoryError, InventoryPlace, Item, Observers, SlotStore, SubscriptionId};

/// Item-quantity aware storage for a single place, e.g. the player's bag.
///
/// Every mutating method is a complete transaction: it is validated up front,
/// so a rejected call changes nothing, and a successful call that touched at
/// least one slot ends with exactly one notification listing every touched
/// slot in the order it was touched.
#[derive(Debug)]
pub struct Inventory {
    place: InventoryPlace,
    settings: PlaceConfig,
    store: SlotStore,
    observers: Observers,
    pending: Vec<u32>,
}

impl Inventory {
    pub fn new(place: InventoryPlace) -> Self {
        Self::with_settings(place, PlaceConfig::default())
    }

    pub fn with_settings(place: InventoryPlace, settings: PlaceConfig) -> Self {
        Self {
            place,
            settings,
            store: SlotStore::new(),
            observers: Observers::default(),
            pending: Vec::new(),
        }
    }

    /// Adds an item anywhere, topping up existing stacks of the same type before
    /// opening new slots for whatever is left.
    pub fn add_item(&mut self, item: Item) -> Result<(), InventoryError> {
        let result = self.stack_item(item);
        self.finish("add", result)
    }

    /// Places an item at a specific slot, creating empty slots up to it if needed. Never stacks.
    pub fn insert_at(&mut self, item: Item, index: u32) -> Result<(), InventoryError> {
        let result = item.validate().and_then(|()| {
            self.store.insert_at(index, item)?;
            self.pending.push(index);
            Ok(())
        });
        self.finish("insert", result)
    }

    /// Removes `item.quantity` of this type from wherever it is stored, highest slots first.
    /// Either the full quantity is removed or nothing is.
    pub fn remove_item(&mut self, item: &Item) -> Result<(), InventoryError> {
        let result = self.take_item(item);
        self.finish("remove", result)
    }

    /// Empties the slot at `index`, which must hold an item of the same type as `item`.
    pub fn extract_at(&mut self, item: &Item, index: u32) -> Result<Item, InventoryError> {
        let result = self.extract(item, index);
        self.finish("extract", result)
    }

    /// Overwrites an existing slot.
    pub fn update_at(&mut self, index: u32, item: Item) -> Result<(), InventoryError> {
        let result = item.validate().and_then(|()| {
            match self.store.max_index() {
                Some(max_index) if index <= max_index => {}
                _ => return Err(InventoryError::SlotNotFound(index)),
            }
            self.store.update(index, item)?;
            self.pending.push(index);
            Ok(())
        });
        self.finish("update", result)
    }

    /// Empties every slot. The slots themselves are kept.
    ///
    /// Refused for the primary place, where this would throw away everything the player owns.
    pub fn clear(&mut self) -> Result<(), InventoryError> {
        if self.place.is_primary() {
            tracing::error!(
                "Something tried to clear the {:?} inventory! This would delete everything in it, so it was blocked.",
                self.place
            );
            return Err(InventoryError::GuardedOperationRejected(self.place));
        }

        tracing::warn!("Clearing the {:?} inventory", self.place);
        for index in 0..self.store.slot_count() {
            if self.store.delete(index)?.is_some() {
                self.pending.push(index);
            }
        }
        self.flush();

        Ok(())
    }

    /// Moves the item at `src` to `dst`, swapping with whatever was there.
    pub fn move_item(&mut self, src: u32, dst: u32) -> Result<(), InventoryError> {
        let result = self.exchange(src, dst);
        self.finish("move", result)
    }

    /// Splits `quantity` off the stack at `src` into the empty slot `dst`.
    pub fn split_stack(&mut self, src: u32, dst: u32, quantity: u32) -> Result<(), InventoryError> {
        let result = self.split(src, dst, quantity);
        self.finish("split", result)
    }

    /// Merges the stack at `src` into the stack at `dst`, as far as it fits.
    /// Returns how many were moved.
    pub fn combine_stack(&mut self, src: u32, dst: u32) -> Result<u32, InventoryError> {
        let result = self.combine(src, dst);
        self.finish("combine", result)
    }

    /// Throws away every stack of this archetype. Returns the total quantity discarded.
    pub fn discard_all(
        &mut self,
        archetype: &(impl Archetype + ?Sized),
    ) -> Result<u32, InventoryError> {
        let result = self.discard(archetype);
        self.finish("discard", result)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&[u32]) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn place(&self) -> InventoryPlace {
        self.place
    }

    pub fn settings(&self) -> &PlaceConfig {
        &self.settings
    }

    /// Total number of slots, including empty ones.
    pub fn slot_count(&self) -> u32 {
        self.store.slot_count()
    }

    /// Number of slots holding an item.
    pub fn valid_item_count(&self) -> u32 {
        self.store.valid_item_count()
    }

    pub fn max_index(&self) -> Option<u32> {
        self.store.max_index()
    }

    pub fn get_item(&self, index: u32) -> Option<&Item> {
        self.store.get(index)
    }

    pub fn get_items_for_type(&self, id: &ItemId) -> Vec<&Item> {
        self.store.items_for_type(id)
    }

    pub fn count_for_type(&self, id: &ItemId) -> u32 {
        self.store.count_for_type(id)
    }

    pub fn is_occupied(&self, index: u32) -> bool {
        self.store.is_occupied(index)
    }

    pub fn storage(&self) -> &SlotStore {
        &self.store
    }

    fn stack_item(&mut self, item: Item) -> Result<(), InventoryError> {
        item.validate_for_storage()?;

        let indices = self.store.indices_for_type(&item.id);

        // every stack of a type shares the ceiling of the first one stored
        let stack_size = indices
            .first()
            .and_then(|&index| self.store.get(index))
            .map(|stored| stored.stack_size)
            .filter(|&stack_size| stack_size > 0)
            .unwrap_or(item.stack_size);

        let mut remaining = item.quantity;
        for index in indices {
            if remaining == 0 {
                break;
            }

            let Some(slot) = self.store.get_mut(index) else {
                continue;
            };

            let added = slot.try_add(remaining);
            if added > 0 {
                remaining -= added;
                self.pending.push(index);
            }
        }

        while remaining > 0 {
            let quantity = remaining.min(stack_size);
            let index = self.store.allocate(Item {
                stack_size,
                ..item.with_quantity(quantity)
            })?;
            self.pending.push(index);
            remaining -= quantity;
        }

        Ok(())
    }

    fn take_item(&mut self, item: &Item) -> Result<(), InventoryError> {
        item.validate()?;

        let available = self.store.count_for_type(&item.id);
        if available < item.quantity {
            return Err(InventoryError::InsufficientQuantity {
                id: item.id.clone(),
                requested: item.quantity,
                available,
            });
        }

        let mut remaining = item.quantity;
        for index in self.store.indices_for_type(&item.id).into_iter().rev() {
            if remaining == 0 {
                break;
            }

            let Some(slot) = self.store.get_mut(index) else {
                continue;
            };

            remaining -= slot.try_remove(remaining);
            self.pending.push(index);
            if slot.quantity == 0 {
                self.store.delete(index)?;
            }
        }

        Ok(())
    }

    fn extract(&mut self, item: &Item, index: u32) -> Result<Item, InventoryError> {
        item.validate()?;

        if index >= self.store.slot_count() {
            return Err(InventoryError::SlotNotFound(index));
        }

        let mismatch = || InventoryError::IdentityMismatch {
            index,
            expected: item.id.clone(),
        };
        if !self
            .store
            .get(index)
            .is_some_and(|stored| stored.is_same_kind(item))
        {
            return Err(mismatch());
        }

        let extracted = self.store.delete(index)?.ok_or_else(mismatch)?;
        self.pending.push(index);

        Ok(extracted)
    }

    fn exchange(&mut self, src: u32, dst: u32) -> Result<(), InventoryError> {
        let moving = self.occupied(src)?.clone();
        if src == dst {
            return Ok(());
        }

        self.store.grow_to(dst)?;
        let displaced = self.store.delete(dst)?;
        self.store.delete(src)?;
        self.store.insert_at(dst, moving)?;
        if let Some(displaced) = displaced {
            self.store.insert_at(src, displaced)?;
        }

        self.pending.push(src);
        self.pending.push(dst);

        Ok(())
    }

    fn split(&mut self, src: u32, dst: u32, quantity: u32) -> Result<(), InventoryError> {
        let source = self.occupied(src)?;
        if quantity == 0 || quantity >= source.quantity {
            return Err(InventoryError::InvalidInput(
                "split quantity must be positive and less than the stack",
            ));
        }
        if self.store.is_occupied(dst) {
            return Err(InventoryError::SlotOccupied(dst));
        }

        let split_off = source.with_quantity(quantity);
        self.store.grow_to(dst)?;
        if let Some(slot) = self.store.get_mut(src) {
            slot.try_remove(quantity);
        }
        self.store.insert_at(dst, split_off)?;

        self.pending.push(src);
        self.pending.push(dst);

        Ok(())
    }

    fn combine(&mut self, src: u32, dst: u32) -> Result<u32, InventoryError> {
        if src == dst {
            return Err(InventoryError::InvalidInput("cannot combine a stack with itself"));
        }

        let source = self.occupied(src)?.clone();
        let target = self.occupied(dst)?;
        if !target.is_same_kind(&source) {
            return Err(InventoryError::IdentityMismatch {
                index: dst,
                expected: source.id,
            });
        }

        let moved = match self.store.get_mut(dst) {
            Some(slot) => slot.try_add(source.quantity),
            None => 0,
        };
        if moved == 0 {
            return Ok(0);
        }

        if let Some(slot) = self.store.get_mut(src) {
            slot.try_remove(moved);
            if slot.quantity == 0 {
                self.store.delete(src)?;
            }
        }

        self.pending.push(src);
        self.pending.push(dst);

        Ok(moved)
    }

    fn discard(&mut self, archetype: &(impl Archetype + ?Sized)) -> Result<u32, InventoryError> {
        let id = archetype.type_id();
        if id.is_empty() {
            return Err(InventoryError::InvalidInput("item has no type identifier"));
        }
        if !archetype.droppable() {
            return Err(InventoryError::NotDroppable(id.clone()));
        }

        let mut total = 0u32;
        for (index, item) in self.store.delete_all_for_type(id) {
            total = total.saturating_add(item.quantity);
            self.pending.push(index);
        }

        Ok(total)
    }

    /// The item at `index`, or why there isn't one.
    fn occupied(&self, index: u32) -> Result<&Item, InventoryError> {
        if index >= self.store.slot_count() {
            return Err(InventoryError::SlotNotFound(index));
        }

        self.store
            .get(index)
            .ok_or(InventoryError::InvalidInput("slot is empty"))
    }

    fn finish<T>(
        &mut self,
        operation: &str,
        result: Result<T, InventoryError>,
    ) -> Result<T, InventoryError> {
        if let Err(err) = &result {
            tracing::warn!(
                "Rejected {operation} in the {:?} inventory: {err}",
                self.place
            );
        }

        self.flush();
        result
    }

    /// Sends every pending slot index to the subscribers in one batch.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let changed = std::mem::take(&mut self.pending);
        tracing::debug!("{:?} inventory changed slots {changed:?}", self.place);
        self.observers.notify(&changed);
    }
}
