//! Atom table
//!
//! Atoms 1 through 68 are predefined by the core protocol; interned names
//! get ids counting up from there. Names are compared as raw bytes; the
//! protocol does not fix an encoding for them.

use crate::protocol::Atom;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Predefined atom names, in id order starting at 1
const PREDEFINED_ATOMS: [&str; 68] = [
    "PRIMARY",
    "SECONDARY",
    "ARC",
    "ATOM",
    "BITMAP",
    "CARDINAL",
    "COLORMAP",
    "CURSOR",
    "CUT_BUFFER0",
    "CUT_BUFFER1",
    "CUT_BUFFER2",
    "CUT_BUFFER3",
    "CUT_BUFFER4",
    "CUT_BUFFER5",
    "CUT_BUFFER6",
    "CUT_BUFFER7",
    "DRAWABLE",
    "FONT",
    "INTEGER",
    "PIXMAP",
    "POINT",
    "RECTANGLE",
    "RESOURCE_MANAGER",
    "RGB_COLOR_MAP",
    "RGB_BEST_MAP",
    "RGB_BLUE_MAP",
    "RGB_DEFAULT_MAP",
    "RGB_GRAY_MAP",
    "RGB_GREEN_MAP",
    "RGB_RED_MAP",
    "STRING",
    "VISUALID",
    "WINDOW",
    "WM_COMMAND",
    "WM_HINTS",
    "WM_CLIENT_MACHINE",
    "WM_ICON_NAME",
    "WM_ICON_SIZE",
    "WM_NAME",
    "WM_NORMAL_HINTS",
    "WM_SIZE_HINTS",
    "WM_ZOOM_HINTS",
    "MIN_SPACE",
    "NORM_SPACE",
    "MAX_SPACE",
    "END_SPACE",
    "SUPERSCRIPT_X",
    "SUPERSCRIPT_Y",
    "SUBSCRIPT_X",
    "SUBSCRIPT_Y",
    "UNDERLINE_POSITION",
    "UNDERLINE_THICKNESS",
    "STRIKEOUT_ASCENT",
    "STRIKEOUT_DESCENT",
    "ITALIC_ANGLE",
    "X_HEIGHT",
    "QUAD_WIDTH",
    "WEIGHT",
    "POINT_SIZE",
    "RESOLUTION",
    "COPYRIGHT",
    "NOTICE",
    "FONT_NAME",
    "FAMILY_NAME",
    "FULL_NAME",
    "CAP_HEIGHT",
    "WM_CLASS",
    "WM_TRANSIENT_FOR",
];

#[derive(Default)]
struct Atoms {
    by_name: HashMap<Vec<u8>, Atom>,
    names: Vec<Vec<u8>>,
}

/// Server-wide name <-> atom mapping
pub struct AtomTable {
    inner: RwLock<Atoms>,
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomTable {
    pub fn new() -> Self {
        let mut atoms = Atoms::default();
        for name in PREDEFINED_ATOMS {
            atoms.names.push(name.as_bytes().to_vec());
            atoms
                .by_name
                .insert(name.as_bytes().to_vec(), Atom::new(atoms.names.len() as u32));
        }
        AtomTable {
            inner: RwLock::new(atoms),
        }
    }

    /// Look up `name`, creating it unless `only_if_exists` is set
    pub fn intern(&self, name: &[u8], only_if_exists: bool) -> Option<Atom> {
        if let Some(&atom) = self.inner.read().by_name.get(name) {
            return Some(atom);
        }
        if only_if_exists {
            return None;
        }

        let mut atoms = self.inner.write();
        // Another client may have interned it between the two locks.
        if let Some(&atom) = atoms.by_name.get(name) {
            return Some(atom);
        }
        atoms.names.push(name.to_vec());
        let atom = Atom::new(atoms.names.len() as u32);
        atoms.by_name.insert(name.to_vec(), atom);
        log::debug!(
            "Interned atom {} = {:?}",
            atom.get(),
            String::from_utf8_lossy(name)
        );
        Some(atom)
    }

    /// The exact bytes `atom` was interned with
    pub fn name(&self, atom: Atom) -> Option<Vec<u8>> {
        let index = (atom.get() as usize).checked_sub(1)?;
        self.inner.read().names.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
