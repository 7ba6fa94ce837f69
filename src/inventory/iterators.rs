use super::{Inventories, Inventory, InventoryPlace};

pub struct InventoriesIterator<'a> {
    inventories: &'a Inventories,
    curr: usize,
}

impl<'a> IntoIterator for &'a Inventories {
    type Item = (InventoryPlace, &'a Inventory);
    type IntoIter = InventoriesIterator<'a>;
    fn into_iter(self) -> InventoriesIterator<'a> {
        InventoriesIterator {
            inventories: self,
            curr: 0,
        }
    }
}

impl Inventories {
    /// Every place with its inventory.
    pub fn iter(&self) -> InventoriesIterator<'_> {
        self.into_iter()
    }
}

impl<'a> Iterator for InventoriesIterator<'a> {
    type Item = (InventoryPlace, &'a Inventory);

    fn next(&mut self) -> Option<Self::Item> {
        let place = *InventoryPlace::ALL.get(self.curr)?;
        self.curr += 1;

        Some((place, self.inventories.get(place)))
    }
}
