//! Resource tracking for X11 clients
//!
//! Every resource type lives in its own [`ResourceRegistry`], each guarded by
//! its own lock so unrelated requests do not serialize against each other.
//! Resource ids are unique across all registries; that is enforced by the
//! [`IdSpace`] the registries share, which is sharded by client id range.

pub mod drawable;
pub mod gc;

pub use drawable::{DrawableEntry, DrawableManager};
pub use gc::{GcValues, GraphicsContext, GraphicsContextManager, GC_ATTRIBUTES};

use crate::protocol::XID;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Number of bits in a client's resource id mask
pub const CLIENT_ID_BITS: u32 = 21;

/// Resource id mask handed to every client at setup time
pub const RESOURCE_ID_MASK: u32 = (1 << CLIENT_ID_BITS) - 1;

const ID_SPACE_SHARDS: usize = 16;

/// Something that can be stored in a [`ResourceRegistry`]
pub trait Resource: Send + Sync {
    fn id(&self) -> XID;
}

/// Kinds of resources a client can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    GraphicsContext,
    Pixmap,
}

/// The range of ids a client may allocate from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIdRange {
    pub base: u32,
    pub mask: u32,
}

impl ClientIdRange {
    /// Id range of the `index`th client. Index 0 is reserved for the server.
    pub fn for_client(index: u32) -> Self {
        ClientIdRange {
            base: index << CLIENT_ID_BITS,
            mask: RESOURCE_ID_MASK,
        }
    }

    pub fn contains(&self, id: XID) -> bool {
        id.get() != 0 && id.get() & !self.mask == self.base
    }
}

/// Server-wide set of live resource ids
///
/// Sharded by client id range so that clients allocating from their own
/// ranges take different locks.
#[derive(Debug)]
pub struct IdSpace {
    shards: Vec<Mutex<HashSet<XID>>>,
}

impl Default for IdSpace {
    fn default() -> Self {
        IdSpace {
            shards: (0..ID_SPACE_SHARDS).map(|_| Mutex::new(HashSet::new())).collect(),
        }
    }
}

impl IdSpace {
    pub fn new() -> Self {
        Self::default()
    }

    fn shard(&self, id: XID) -> &Mutex<HashSet<XID>> {
        &self.shards[(id.get() >> CLIENT_ID_BITS) as usize % ID_SPACE_SHARDS]
    }

    /// Claim `id`, returning false if it is already live
    pub fn reserve(&self, id: XID) -> bool {
        self.shard(id).lock().insert(id)
    }

    pub fn release(&self, id: XID) {
        self.shard(id).lock().remove(&id);
    }

    pub fn contains(&self, id: XID) -> bool {
        self.shard(id).lock().contains(&id)
    }

    /// True if `id` is inside `range` and not currently in use
    pub fn is_valid_id(&self, range: ClientIdRange, id: XID) -> bool {
        range.contains(id) && !self.contains(id)
    }
}

struct Entry<T> {
    owner: u32,
    resource: Arc<T>,
}

/// Table of live resources of one type
pub struct ResourceRegistry<T> {
    name: &'static str,
    ids: Arc<IdSpace>,
    entries: RwLock<HashMap<XID, Entry<T>>>,
}

impl<T: Resource> ResourceRegistry<T> {
    pub fn new(name: &'static str, ids: Arc<IdSpace>) -> Self {
        ResourceRegistry {
            name,
            ids,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert the resource built by `factory` under `id`.
    ///
    /// Returns `None` if `id` is already in use by any resource on the
    /// server; `factory` is not called in that case.
    pub fn create<F>(&self, owner: u32, id: XID, factory: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> T,
    {
        if !self.ids.reserve(id) {
            log::debug!("{}: id {} already in use", self.name, id);
            return None;
        }

        let resource = Arc::new(factory());
        self.entries.write().insert(
            id,
            Entry {
                owner,
                resource: Arc::clone(&resource),
            },
        );
        log::debug!("{}: created {} for client {}", self.name, id, owner);
        Some(resource)
    }

    pub fn get(&self, id: XID) -> Option<Arc<T>> {
        self.entries.read().get(&id).map(|e| Arc::clone(&e.resource))
    }

    pub fn owner(&self, id: XID) -> Option<u32> {
        self.entries.read().get(&id).map(|e| e.owner)
    }

    /// Remove `id`. Removing an absent id does nothing.
    pub fn free(&self, id: XID) -> Option<Arc<T>> {
        let removed = self.entries.write().remove(&id)?;
        self.ids.release(id);
        log::debug!("{}: freed {}", self.name, id);
        Some(removed.resource)
    }

    /// Remove `id` only if `owner` created it
    pub fn free_owned(&self, owner: u32, id: XID) -> Option<Arc<T>> {
        let removed = {
            let mut entries = self.entries.write();
            match entries.get(&id) {
                Some(entry) if entry.owner == owner => entries.remove(&id),
                _ => None,
            }
        }?;
        self.ids.release(id);
        Some(removed.resource)
    }

    pub fn contains(&self, id: XID) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
