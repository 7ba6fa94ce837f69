use std::collections::HashMap;

use crate::config::{ConfigError, ItemConfig};

use super::{Archetype, ItemFlags, ItemId};

/// Struct detailing various information about an item, pulled from the item catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// The item's unique type identifier.
    pub id: ItemId,
    /// The item's textual name.
    pub name: String,
    /// The item's behaviour flags.
    pub flags: ItemFlags,
    /// The item's max stack size.
    pub stack_size: u32,
}

impl Archetype for ItemInfo {
    fn type_id(&self) -> &ItemId {
        &self.id
    }

    fn max_stack(&self) -> u32 {
        if self.flags.contains(ItemFlags::STACKABLE) {
            self.stack_size
        } else {
            1
        }
    }

    fn droppable(&self) -> bool {
        self.flags.contains(ItemFlags::DROPPABLE)
    }
}

impl TryFrom<&ItemConfig> for ItemInfo {
    type Error = ConfigError;

    fn try_from(config: &ItemConfig) -> Result<Self, Self::Error> {
        if config.id.is_empty() {
            return Err(ConfigError::InvalidItem {
                id: config.name.clone(),
                reason: "missing id",
            });
        }

        if config.stack_size == 0 {
            return Err(ConfigError::InvalidItem {
                id: config.id.clone(),
                reason: "stack size must be at least 1",
            });
        }

        let mut flags = ItemFlags::NONE;
        flags.set(ItemFlags::STACKABLE, config.stack_size > 1);
        flags.set(ItemFlags::DROPPABLE, config.droppable);

        Ok(Self {
            id: ItemId::new(config.id.as_str()),
            name: config.name.clone(),
            flags,
            stack_size: config.stack_size,
        })
    }
}

#[derive(Debug)]
pub enum ItemInfoQuery {
    ById(ItemId),
    ByName(String),
}

/// Read-only lookup of every item archetype known to the process.
#[derive(Debug, Default, Clone)]
pub struct ItemCatalog {
    items: Vec<ItemInfo>,
    by_id: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    /// Builds the catalog from the `items` section of the config, rejecting duplicate ids.
    pub fn from_config(items: &[ItemConfig]) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        for config in items {
            catalog.insert(ItemInfo::try_from(config)?)?;
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, info: ItemInfo) -> Result<(), ConfigError> {
        if self.by_id.contains_key(&info.id) {
            return Err(ConfigError::DuplicateItem(info.id.to_string()));
        }

        self.by_id.insert(info.id.clone(), self.items.len());
        self.items.push(info);

        Ok(())
    }

    /// Gets various information about an item. Name lookups are case-insensitive substring matches.
    pub fn get_item_info(&self, query: ItemInfoQuery) -> Option<&ItemInfo> {
        match query {
            ItemInfoQuery::ById(id) => self.by_id.get(&id).map(|&index| &self.items[index]),
            ItemInfoQuery::ByName(name) => {
                let name = name.to_lowercase();
                self.items
                    .iter()
                    .find(|info| info.name.to_lowercase().contains(&name))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
