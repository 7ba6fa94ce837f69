use kura::common::{ItemCatalog, ItemId, ItemInfo, ItemInfoQuery};
use kura::config::{get_config, load_config};
use kura::inventory::{
    Inventories, InventoryError, InventoryPlace, Item, Storage, get_next_free_slot, slot_index,
};
use serde::{Deserialize, Serialize};

/// A list of inventory operations to run, in order.
#[derive(Deserialize)]
struct Script {
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Add {
        place: InventoryPlace,
        item: String,
        quantity: u32,
    },
    Insert {
        place: InventoryPlace,
        item: String,
        quantity: u32,
        index: i64,
    },
    Remove {
        place: InventoryPlace,
        item: String,
        quantity: u32,
    },
    Extract {
        place: InventoryPlace,
        item: String,
        index: i64,
    },
    Update {
        place: InventoryPlace,
        item: String,
        quantity: u32,
        index: i64,
    },
    Move {
        place: InventoryPlace,
        from: i64,
        to: i64,
    },
    Split {
        place: InventoryPlace,
        from: i64,
        /// Defaults to the first empty slot.
        to: Option<i64>,
        quantity: u32,
    },
    Combine {
        place: InventoryPlace,
        from: i64,
        to: i64,
    },
    Discard {
        place: InventoryPlace,
        item: String,
    },
    Transfer {
        from: InventoryPlace,
        to: InventoryPlace,
        item: String,
        quantity: u32,
    },
    Clear {
        place: InventoryPlace,
    },
}

#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error("unknown item {0}")]
    UnknownItem(String),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

#[derive(Serialize)]
struct PlaceLayout<'a> {
    place: InventoryPlace,
    sellable: bool,
    rows: Vec<Vec<Option<&'a Item>>>,
}

fn lookup<'a>(catalog: &'a ItemCatalog, id: &str) -> Result<&'a ItemInfo, StepError> {
    catalog
        .get_item_info(ItemInfoQuery::ById(ItemId::new(id)))
        .ok_or_else(|| StepError::UnknownItem(id.to_string()))
}

fn run_step(
    inventories: &mut Inventories,
    catalog: &ItemCatalog,
    step: &Step,
) -> Result<(), StepError> {
    match step {
        Step::Add {
            place,
            item,
            quantity,
        } => {
            let info = lookup(catalog, item)?;
            inventories
                .get_mut(*place)
                .add_item(Item::new(info, *quantity))?;
        }
        Step::Insert {
            place,
            item,
            quantity,
            index,
        } => {
            let info = lookup(catalog, item)?;
            inventories
                .get_mut(*place)
                .insert_at(Item::new(info, *quantity), slot_index(*index)?)?;
        }
        Step::Remove {
            place,
            item,
            quantity,
        } => {
            let info = lookup(catalog, item)?;
            inventories
                .get_mut(*place)
                .remove_item(&Item::new(info, *quantity))?;
        }
        Step::Extract { place, item, index } => {
            let info = lookup(catalog, item)?;
            let extracted = inventories
                .get_mut(*place)
                .extract_at(&Item::new(info, 1), slot_index(*index)?)?;
            tracing::info!("Extracted {} x{}", info.name, extracted.quantity);
        }
        Step::Update {
            place,
            item,
            quantity,
            index,
        } => {
            let info = lookup(catalog, item)?;
            inventories
                .get_mut(*place)
                .update_at(slot_index(*index)?, Item::new(info, *quantity))?;
        }
        Step::Move { place, from, to } => {
            inventories
                .get_mut(*place)
                .move_item(slot_index(*from)?, slot_index(*to)?)?;
        }
        Step::Split {
            place,
            from,
            to,
            quantity,
        } => {
            let inventory = inventories.get_mut(*place);
            let to = match to {
                Some(to) => slot_index(*to)?,
                None => get_next_free_slot(inventory.storage())
                    .unwrap_or_else(|| inventory.slot_count()),
            };
            inventory.split_stack(slot_index(*from)?, to, *quantity)?;
        }
        Step::Combine { place, from, to } => {
            let moved = inventories
                .get_mut(*place)
                .combine_stack(slot_index(*from)?, slot_index(*to)?)?;
            tracing::info!("Combined {moved} items");
        }
        Step::Discard { place, item } => {
            let info = lookup(catalog, item)?;
            let discarded = inventories.get_mut(*place).discard_all(info)?;
            tracing::info!("Discarded {} x{discarded}", info.name);
        }
        Step::Transfer {
            from,
            to,
            item,
            quantity,
        } => {
            let info = lookup(catalog, item)?;
            inventories.transfer(*from, *to, &Item::new(info, *quantity))?;
        }
        Step::Clear { place } => {
            inventories.get_mut(*place).clear()?;
        }
    }

    Ok(())
}

/// Lays the slots out in rows, the way a grid would show them.
fn layout(storage: &dyn Storage, columns: u32) -> Vec<Vec<Option<&Item>>> {
    let slots: Vec<Option<&Item>> = (0..storage.slot_count())
        .map(|index| storage.get_slot(index))
        .collect();

    slots
        .chunks(columns.max(1) as usize)
        .map(|row| row.to_vec())
        .collect()
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(script_path) = args.get(1) else {
        tracing::error!("Usage: kura-replay <script.yaml> [config.yaml]");
        return;
    };

    let config = match args.get(2) {
        Some(path) => load_config(path),
        None => get_config(),
    }
    .expect("Failed to load config!");
    let catalog = ItemCatalog::from_config(&config.items).expect("Invalid item catalog!");
    tracing::info!("Loaded {} item definitions", catalog.len());

    let script = std::fs::read_to_string(script_path).expect("Failed to read script!");
    let script: Script = serde_yaml_ng::from_str(&script).expect("Failed to parse script!");

    let mut inventories = Inventories::new(&config.places);
    for place in InventoryPlace::ALL {
        inventories
            .get_mut(place)
            .subscribe(move |changed| tracing::info!("{place:?} slots changed: {changed:?}"));
    }

    for (n, step) in script.steps.iter().enumerate() {
        if let Err(err) = run_step(&mut inventories, &catalog, step) {
            tracing::warn!("Step {n} ({step:?}) failed: {err}");
        }
    }

    let layouts: Vec<PlaceLayout> = inventories
        .iter()
        .map(|(place, inventory)| PlaceLayout {
            place,
            sellable: inventory.settings().sellable,
            rows: layout(inventory.storage(), inventory.settings().columns),
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&layouts).expect("Failed to serialize layout!")
    );
}
