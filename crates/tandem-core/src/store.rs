use std::collections::BTreeMap;

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::item::{Context, Item, ItemId};
use crate::storage::Storage;

pub const ITEMS_KEY: &str = "toDos";
pub const CONTEXT_KEY: &str = "working";

const ITEMS_VERSION: u32 = 1;

/// The whole application state: the item map plus the current context,
/// mirrored to storage as a full snapshot on every mutation.
#[derive(Debug)]
pub struct ToDoStore {
    storage: Storage,
    items: BTreeMap<ItemId, Item>,
    context: Context,
}

impl ToDoStore {
    /// Missing or unreadable data falls back to an empty map and the default
    /// context. Never fails; load problems are logged only.
    #[tracing::instrument(skip(storage))]
    pub fn load(storage: Storage) -> Self {
        let items = match read_items(&storage) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "could not load items; starting empty");
                BTreeMap::new()
            }
        };

        let context = match read_context(&storage) {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "could not load context; using default");
                Context::default()
            }
        };

        info!(count = items.len(), %context, "loaded store");
        Self {
            storage,
            items,
            context,
        }
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn items_in(&self, context: Context) -> impl Iterator<Item = (ItemId, &Item)> + '_ {
        self.items
            .iter()
            .filter(move |(_, item)| item.context == context)
            .map(|(id, item)| (*id, item))
    }

    #[tracing::instrument(skip(self))]
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
        self.persist_context();
    }

    /// Empty text is rejected and nothing is written. The id is the creation
    /// timestamp in milliseconds, bumped past any colliding key.
    #[tracing::instrument(skip(self, text, now))]
    pub fn add_item(&mut self, text: &str, context: Context, now: DateTime<Utc>) -> Option<ItemId> {
        if text.is_empty() {
            debug!("empty text; nothing added");
            return None;
        }

        let mut id = ItemId::from_timestamp(now);
        while self.items.contains_key(&id) {
            id = id.bumped();
        }

        self.items.insert(id, Item::new(text.to_string(), context));
        self.persist_items();

        debug!(%id, count = self.items.len(), "item added");
        Some(id)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_done(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            debug!(%id, "no such item; toggle ignored");
            return false;
        };

        item.done = !item.done;
        self.persist_items();
        true
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        if self.items.remove(&id).is_none() {
            debug!(%id, "no such item; delete ignored");
            return false;
        }

        self.persist_items();
        true
    }

    /// Replaces the text in place; `done` and `context` survive the edit.
    #[tracing::instrument(skip(self, new_text))]
    pub fn edit_item(&mut self, id: ItemId, new_text: &str) -> bool {
        if new_text.is_empty() {
            debug!("empty replacement text; edit ignored");
            return false;
        }

        let Some(item) = self.items.get_mut(&id) else {
            debug!(%id, "no such item; edit ignored");
            return false;
        };

        item.text = new_text.to_string();
        self.persist_items();
        true
    }

    // Write failures never surface and never roll back: the in-memory state
    // stays the source of truth until the next successful write.
    fn persist_items(&self) {
        if let Err(err) = write_items(&self.storage, &self.items) {
            warn!(error = %format!("{err:#}"), "failed to persist items");
        }
    }

    fn persist_context(&self) {
        if let Err(err) = write_context(&self.storage, self.context) {
            warn!(error = %format!("{err:#}"), "failed to persist context");
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    // Older blobs carry edited text under "editText"; accept it on read so
    // those records come back with their text intact.
    #[serde(alias = "editText")]
    text: String,
    working: bool,
    done: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemsFile {
    version: u32,
    items: BTreeMap<ItemId, StoredItem>,
}

impl From<&Item> for StoredItem {
    fn from(item: &Item) -> Self {
        Self {
            text: item.text.clone(),
            working: item.context.into(),
            done: item.done,
        }
    }
}

impl From<StoredItem> for Item {
    fn from(stored: StoredItem) -> Self {
        Self {
            text: stored.text,
            context: Context::from(stored.working),
            done: stored.done,
        }
    }
}

fn read_items(storage: &Storage) -> anyhow::Result<BTreeMap<ItemId, Item>> {
    let Some(raw) = storage.read(ITEMS_KEY)? else {
        return Ok(BTreeMap::new());
    };

    let stored = decode_items(&raw)?;
    Ok(stored
        .into_iter()
        .map(|(id, item)| (id, item.into()))
        .collect())
}

fn decode_items(raw: &str) -> anyhow::Result<BTreeMap<ItemId, StoredItem>> {
    match serde_json::from_str::<ItemsFile>(raw) {
        Ok(file) if file.version == ITEMS_VERSION => Ok(file.items),
        Ok(file) => Err(anyhow!("unsupported items schema version {}", file.version)),
        // Blobs written before the envelope existed are the bare map.
        Err(_) => serde_json::from_str::<BTreeMap<ItemId, StoredItem>>(raw)
            .context("failed parsing items payload"),
    }
}

fn write_items(storage: &Storage, items: &BTreeMap<ItemId, Item>) -> anyhow::Result<()> {
    let file = ItemsFile {
        version: ITEMS_VERSION,
        items: items
            .iter()
            .map(|(id, item)| (*id, StoredItem::from(item)))
            .collect(),
    };

    let payload = serde_json::to_string(&file)?;
    storage.write(ITEMS_KEY, &payload)
}

fn read_context(storage: &Storage) -> anyhow::Result<Context> {
    let Some(raw) = storage.read(CONTEXT_KEY)? else {
        return Ok(Context::default());
    };

    let working: bool =
        serde_json::from_str(raw.trim()).context("failed parsing context payload")?;
    Ok(Context::from(working))
}

fn write_context(storage: &Storage, context: Context) -> anyhow::Result<()> {
    let payload = serde_json::to_string(&bool::from(context))?;
    storage.write(CONTEXT_KEY, &payload)
}
