use serde::{Deserialize, Serialize};

use crate::config::PlacesConfig;

mod container;
pub use container::Inventory;

mod error;
pub use error::InventoryError;

mod item;
pub use item::Item;

mod iterators;
pub use iterators::InventoriesIterator;

mod observer;
pub use observer::{Observers, SubscriptionId};

mod slot_store;
pub use slot_store::SlotStore;

mod storage;
pub use storage::{Storage, get_next_free_slot};

/// The places items can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryPlace {
    /// What the player carries around.
    PlayerBag,
    /// The shared storehouse. This is the primary place, losing it means losing everything.
    Storehouse,
}

impl InventoryPlace {
    pub const ALL: [InventoryPlace; 2] = [InventoryPlace::PlayerBag, InventoryPlace::Storehouse];

    /// Whether bulk-destructive operations are refused for this place.
    pub fn is_primary(&self) -> bool {
        matches!(self, InventoryPlace::Storehouse)
    }
}

/// Converts a signed slot index coming from outside (scripts, UI) into a slot index.
pub fn slot_index(index: i64) -> Result<u32, InventoryError> {
    u32::try_from(index).map_err(|_| InventoryError::InvalidInput("slot index out of range"))
}

/// Owns one [`Inventory`] per [`InventoryPlace`].
#[derive(Debug)]
pub struct Inventories {
    player_bag: Inventory,
    storehouse: Inventory,
}

impl Default for Inventories {
    fn default() -> Self {
        Self::new(&PlacesConfig::default())
    }
}

impl Inventories {
    pub fn new(places: &PlacesConfig) -> Self {
        Self {
            player_bag: Inventory::with_settings(InventoryPlace::PlayerBag, places.player_bag),
            storehouse: Inventory::with_settings(InventoryPlace::Storehouse, places.storehouse),
        }
    }

    pub fn get(&self, place: InventoryPlace) -> &Inventory {
        match place {
            InventoryPlace::PlayerBag => &self.player_bag,
            InventoryPlace::Storehouse => &self.storehouse,
        }
    }

    pub fn get_mut(&mut self, place: InventoryPlace) -> &mut Inventory {
        match place {
            InventoryPlace::PlayerBag => &mut self.player_bag,
            InventoryPlace::Storehouse => &mut self.storehouse,
        }
    }

    /// Moves `item.quantity` of an item from one place to another. If the source
    /// doesn't have enough, neither place is touched.
    pub fn transfer(
        &mut self,
        from: InventoryPlace,
        to: InventoryPlace,
        item: &Item,
    ) -> Result<(), InventoryError> {
        if from == to {
            return Err(InventoryError::InvalidInput(
                "cannot transfer into the same place",
            ));
        }
        item.validate_for_storage()?;

        self.get_mut(from).remove_item(item)?;
        self.get_mut(to).add_item(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ItemId;

    fn item(quantity: u32) -> Item {
        Item {
            id: ItemId::new("ore"),
            quantity,
            stack_size: 20,
        }
    }

    #[test]
    fn only_the_storehouse_is_primary() {
        assert!(InventoryPlace::Storehouse.is_primary());
        assert!(!InventoryPlace::PlayerBag.is_primary());
    }

    #[test]
    fn negative_indices_are_rejected() {
        assert_eq!(slot_index(3), Ok(3));
        assert!(matches!(
            slot_index(-1),
            Err(InventoryError::InvalidInput(_))
        ));
        assert!(slot_index(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn settings_follow_config() {
        let inventories = Inventories::default();
        let places = PlacesConfig::default();
        assert_eq!(
            inventories.get(InventoryPlace::Storehouse).settings(),
            &places.storehouse
        );
        assert_eq!(
            inventories.get(InventoryPlace::PlayerBag).place(),
            InventoryPlace::PlayerBag
        );
    }

    #[test]
    fn transfer_between_places() {
        let mut inventories = Inventories::default();
        inventories
            .get_mut(InventoryPlace::PlayerBag)
            .add_item(item(30))
            .unwrap();

        inventories
            .transfer(InventoryPlace::PlayerBag, InventoryPlace::Storehouse, &item(25))
            .unwrap();

        let id = ItemId::new("ore");
        assert_eq!(inventories.get(InventoryPlace::PlayerBag).count_for_type(&id), 5);
        assert_eq!(inventories.get(InventoryPlace::Storehouse).count_for_type(&id), 25);

        // not enough left, nothing moves
        assert!(
            inventories
                .transfer(InventoryPlace::PlayerBag, InventoryPlace::Storehouse, &item(6))
                .is_err()
        );
        assert_eq!(inventories.get(InventoryPlace::PlayerBag).count_for_type(&id), 5);
        assert_eq!(inventories.get(InventoryPlace::Storehouse).count_for_type(&id), 25);

        assert!(
            inventories
                .transfer(InventoryPlace::PlayerBag, InventoryPlace::PlayerBag, &item(1))
                .is_err()
        );
    }

    #[test]
    fn iterates_every_place() {
        let inventories = Inventories::default();
        let places: Vec<_> = inventories.iter().map(|(place, _)| place).collect();
        assert_eq!(places, InventoryPlace::ALL.to_vec());
    }
}
