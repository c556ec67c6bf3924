//! Ordered gallery of persisted items.
//!
//! Items are kept sorted by `position`, and positions are always the dense
//! range `0..len`. Only three things move positions: an explicit reorder,
//! the compaction after a delete, and loading the canonical collection.
//!
//! # Optimistic reorder
//!
//! Reordering is a two-phase update:
//!
//! ```text
//! propose_reorder(order) ─▶ applied locally, ReorderTicket returned
//!                             │
//!        backend persists ticket.updates() as one batch
//!                             │
//! resolve_reorder(ticket, result)
//!     Ok                 → committed
//!     Err(Failed)        → previous order restored
//!     Err(Conflict)      → previous order restored, refresh required
//!     ticket outdated    → nothing restored, refresh required
//! ```
//!
//! Only one reorder may be in flight. A ticket is outdated when the gallery
//! changed underneath it (upload committed, item deleted, collection
//! reloaded). Restoring a snapshot over such changes would guess at a merge,
//! so the gallery fails closed and asks for the canonical order instead.

use crate::backend::{PersistError, PositionUpdate, StoredObject};
use crate::types::{Category, GalleryItem, ItemId};
use std::collections::HashSet;
use thiserror::Error;

/// A proposed order is not a permutation of the current items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("unknown item in proposed order: {0}")]
    Unknown(ItemId),
    #[error("item listed twice in proposed order: {0}")]
    Duplicate(ItemId),
    #[error("item missing from proposed order: {0}")]
    Missing(ItemId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error(transparent)]
    Permutation(#[from] PermutationError),
    #[error("another reorder is still being saved")]
    ReorderInFlight,
    #[error("gallery order is out of date; reload it first")]
    NeedsRefresh,
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),
    #[error("two items share position {0} in canonical collection")]
    DuplicatePosition(u32),
}

/// Handle for a reorder that has been applied locally but not yet saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderTicket {
    serial: u64,
    version: u64,
    previous: Vec<ItemId>,
    updates: Vec<PositionUpdate>,
}

impl ReorderTicket {
    /// The batch to persist.
    pub fn updates(&self) -> &[PositionUpdate] {
        &self.updates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    Committed,
    RolledBack { refresh: bool },
    /// The ticket no longer applies to the current gallery.
    Stale { refresh: bool },
}

#[derive(Debug, Default)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    version: u64,
    next_serial: u64,
    in_flight: Option<u64>,
    needs_refresh: bool,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with the canonical one from the server.
    ///
    /// Items are ordered by their stored position and renumbered densely, so
    /// 1-based or sparse ranks are accepted. Shared positions or ids are
    /// refused and the current collection is kept.
    pub fn load(&mut self, mut items: Vec<GalleryItem>) -> Result<(), GalleryError> {
        items.sort_by_key(|item| item.position);
        for pair in items.windows(2) {
            if pair[0].position == pair[1].position {
                return Err(GalleryError::DuplicatePosition(pair[0].position));
            }
        }
        let mut ids = HashSet::new();
        for item in &items {
            if !ids.insert(&item.id) {
                return Err(GalleryError::DuplicateId(item.id.clone()));
            }
        }

        self.items = items;
        renumber(&mut self.items);
        self.in_flight = None;
        self.needs_refresh = false;
        self.touch();
        tracing::debug!(count = self.items.len(), "loaded gallery");
        Ok(())
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn get(&self, id: &ItemId) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the canonical order must be reloaded before further reorders.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn reorder_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Add a freshly stored object at the end.
    ///
    /// An id that is already present means the local view disagrees with the
    /// server. The item is not added and the gallery is flagged for refresh.
    pub fn append(
        &mut self,
        stored: StoredObject,
        filename: &str,
        mime_type: &str,
    ) -> Result<&GalleryItem, GalleryError> {
        if self.get(&stored.id).is_some() {
            self.needs_refresh = true;
            tracing::warn!(id = %stored.id, "stored object id already in gallery");
            return Err(GalleryError::DuplicateId(stored.id));
        }
        let position = self.items.len() as u32;
        self.items.push(GalleryItem {
            id: stored.id,
            position,
            category: Category::from_mime(mime_type),
            filename: filename.to_string(),
            url: stored.url,
            key: stored.key,
        });
        self.touch();
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove an item and close the gap it leaves.
    pub fn delete(&mut self, id: &ItemId) -> Option<GalleryItem> {
        let index = self.items.iter().position(|item| item.id == *id)?;
        let removed = self.items.remove(index);
        renumber(&mut self.items);
        self.touch();
        Some(removed)
    }

    /// Check that `order` lists every current item exactly once.
    pub fn check_permutation(&self, order: &[ItemId]) -> Result<(), PermutationError> {
        let current: HashSet<&ItemId> = self.items.iter().map(|item| &item.id).collect();
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !current.contains(id) {
                return Err(PermutationError::Unknown(id.clone()));
            }
            if !seen.insert(id) {
                return Err(PermutationError::Duplicate(id.clone()));
            }
        }
        if let Some(missing) = self.items.iter().find(|item| !seen.contains(&item.id)) {
            return Err(PermutationError::Missing(missing.id.clone()));
        }
        Ok(())
    }

    /// Apply `order` locally and return the batch to persist.
    pub fn propose_reorder(&mut self, order: &[ItemId]) -> Result<ReorderTicket, GalleryError> {
        if self.needs_refresh {
            return Err(GalleryError::NeedsRefresh);
        }
        if self.in_flight.is_some() {
            return Err(GalleryError::ReorderInFlight);
        }
        self.check_permutation(order)?;

        let previous = self.ids();
        self.apply_order(order);
        self.touch();
        self.next_serial += 1;
        self.in_flight = Some(self.next_serial);

        let updates = self
            .items
            .iter()
            .map(|item| PositionUpdate {
                id: item.id.clone(),
                position: item.position,
            })
            .collect();
        Ok(ReorderTicket {
            serial: self.next_serial,
            version: self.version,
            previous,
            updates,
        })
    }

    /// Finish a reorder with the backend's answer.
    pub fn resolve_reorder(
        &mut self,
        ticket: ReorderTicket,
        result: Result<(), PersistError>,
    ) -> ReorderOutcome {
        let ours = self.in_flight == Some(ticket.serial);
        if ours {
            self.in_flight = None;
        }
        let current = ours && self.version == ticket.version;

        match (current, result) {
            (true, Ok(())) => ReorderOutcome::Committed,
            (true, Err(err)) => {
                self.apply_order(&ticket.previous);
                self.touch();
                let refresh = err == PersistError::Conflict;
                self.needs_refresh |= refresh;
                ReorderOutcome::RolledBack { refresh }
            }
            (false, Ok(())) => ReorderOutcome::Stale { refresh: false },
            (false, Err(_)) => {
                // Only mark if the ticket was not already superseded by a reload.
                if ours {
                    self.needs_refresh = true;
                }
                ReorderOutcome::Stale { refresh: ours }
            }
        }
    }

    /// Items of one category, in position order.
    pub fn filter(&self, category: Category) -> Vec<&GalleryItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// `(images, files)` tabs, each in position order.
    pub fn partition(&self) -> (Vec<&GalleryItem>, Vec<&GalleryItem>) {
        self.items
            .iter()
            .partition(|item| item.category == Category::Image)
    }

    /// `order` must already be a permutation of the current ids.
    fn apply_order(&mut self, order: &[ItemId]) {
        let mut items = std::mem::take(&mut self.items);
        let mut sorted = Vec::with_capacity(items.len());
        for id in order {
            if let Some(index) = items.iter().position(|item| item.id == *id) {
                sorted.push(items.swap_remove(index));
            }
        }
        self.items = sorted;
        renumber(&mut self.items);
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

fn renumber(items: &mut [GalleryItem]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.position = position as u32;
    }
}
