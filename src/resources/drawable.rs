//! Drawable lookup
//!
//! Windows and pixmaps share one table because both are addressed as
//! drawables. Window geometry and contents belong to the window tree, so an
//! entry only records what requests need to validate against.

use super::{IdSpace, Resource, ResourceRegistry};
use crate::protocol::*;
use std::sync::Arc;

/// A live window or pixmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawableEntry {
    pub drawable: Drawable,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
}

impl DrawableEntry {
    pub fn is_pixmap(&self) -> bool {
        matches!(self.drawable, Drawable::Pixmap(_))
    }
}

impl Resource for DrawableEntry {
    fn id(&self) -> XID {
        self.drawable.id()
    }
}

/// Resolves drawable ids to live windows and pixmaps
pub struct DrawableManager {
    drawables: ResourceRegistry<DrawableEntry>,
}

impl DrawableManager {
    pub fn new(ids: Arc<IdSpace>) -> Self {
        DrawableManager {
            drawables: ResourceRegistry::new("drawables", ids),
        }
    }

    pub fn get_drawable(&self, id: XID) -> Option<Arc<DrawableEntry>> {
        self.drawables.get(id)
    }

    /// Register a window created by the window tree (e.g. the root window)
    pub fn register_window(
        &self,
        owner: u32,
        window: Window,
        width: u16,
        height: u16,
        depth: u8,
    ) -> Option<Arc<DrawableEntry>> {
        self.drawables.create(owner, window.id(), || DrawableEntry {
            drawable: Drawable::Window(window),
            width,
            height,
            depth,
        })
    }

    pub fn create_pixmap(
        &self,
        owner: u32,
        pixmap: Pixmap,
        width: u16,
        height: u16,
        depth: u8,
    ) -> Option<Arc<DrawableEntry>> {
        self.drawables.create(owner, pixmap.id(), || DrawableEntry {
            drawable: Drawable::Pixmap(pixmap),
            width,
            height,
            depth,
        })
    }

    /// Free a pixmap. Absent ids are ignored; a window id is a Pixmap error.
    pub fn free_pixmap(&self, id: XID) -> RequestResult<()> {
        match self.drawables.get(id) {
            Some(entry) if !entry.is_pixmap() => Err(RequestError::bad_pixmap(id)),
            Some(_) => {
                self.drawables.free(id);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Free a pixmap on behalf of a disconnecting client
    pub fn release_pixmap(&self, owner: u32, id: XID) {
        self.drawables.free_owned(owner, id);
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}
