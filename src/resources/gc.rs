//! Graphics contexts
//!
//! A graphics context is a bundle of 23 drawing attributes. CreateGC and
//! ChangeGC set them from a masked value list, CopyGC copies masked slots
//! between two contexts; both go through [`GC_ATTRIBUTES`].

use super::drawable::DrawableEntry;
use super::{IdSpace, Resource, ResourceRegistry};
use crate::protocol::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Attribute values of a graphics context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcValues {
    pub function: GCFunction,
    pub plane_mask: u32,
    pub foreground: u32,
    pub background: u32,
    pub line_width: u16,
    pub line_style: LineStyle,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
    pub fill_style: FillStyle,
    pub fill_rule: FillRule,
    pub tile: Pixmap,
    pub stipple: Pixmap,
    pub tile_stipple_x_origin: i16,
    pub tile_stipple_y_origin: i16,
    pub font: Font,
    pub subwindow_mode: SubwindowMode,
    pub graphics_exposures: bool,
    pub clip_x_origin: i16,
    pub clip_y_origin: i16,
    pub clip_mask: Pixmap,
    pub dash_offset: u16,
    pub dashes: Vec<u8>,
    pub arc_mode: ArcMode,
}

impl Default for GcValues {
    fn default() -> Self {
        GcValues {
            function: GCFunction::Copy,
            plane_mask: u32::MAX,
            foreground: 0,
            background: 1,
            line_width: 0,
            line_style: LineStyle::Solid,
            cap_style: CapStyle::Butt,
            join_style: JoinStyle::Miter,
            fill_style: FillStyle::Solid,
            fill_rule: FillRule::EvenOdd,
            tile: Pixmap::NONE,
            stipple: Pixmap::NONE,
            tile_stipple_x_origin: 0,
            tile_stipple_y_origin: 0,
            font: Font::NONE,
            subwindow_mode: SubwindowMode::ClipByChildren,
            graphics_exposures: true,
            clip_x_origin: 0,
            clip_y_origin: 0,
            clip_mask: Pixmap::NONE,
            dash_offset: 0,
            dashes: vec![4, 4],
            arc_mode: ArcMode::PieSlice,
        }
    }
}

// Value list words are CARD32; narrower attributes use the low bits.

fn card32(word: u32) -> RequestResult<u32> {
    Ok(word)
}

fn card16(word: u32) -> RequestResult<u16> {
    Ok(word as u16)
}

fn int16(word: u32) -> RequestResult<i16> {
    Ok(word as u16 as i16)
}

fn boolean(word: u32) -> RequestResult<bool> {
    match word {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(RequestError::bad_value(word)),
    }
}

fn pixmap(word: u32) -> RequestResult<Pixmap> {
    Ok(Pixmap::new(word))
}

fn font(word: u32) -> RequestResult<Font> {
    Ok(Font::new(word))
}

fn dashes(word: u32) -> RequestResult<Vec<u8>> {
    match word as u8 {
        0 => Err(RequestError::bad_value(word)),
        n => Ok(vec![n, n]),
    }
}

macro_rules! checked_enum {
    ($fn_name:ident, $ty:ty) => {
        fn $fn_name(word: u32) -> RequestResult<$ty> {
            <$ty>::from_u32(word).ok_or(RequestError::bad_value(word))
        }
    };
}

checked_enum!(function, GCFunction);
checked_enum!(line_style, LineStyle);
checked_enum!(cap_style, CapStyle);
checked_enum!(join_style, JoinStyle);
checked_enum!(fill_style, FillStyle);
checked_enum!(fill_rule, FillRule);
checked_enum!(subwindow_mode, SubwindowMode);
checked_enum!(arc_mode, ArcMode);

macro_rules! gc_attribute {
    ($name:literal, $slot:ident, $convert:ident) => {
        MaskedField {
            name: $name,
            width: 4,
            decode: |values, reader| {
                let word = reader.read_u32()?;
                values.$slot = $convert(word)?;
                Ok(())
            },
            copy: |dst, src| dst.$slot = src.$slot.clone(),
        }
    };
}

/// GC attributes in value-mask bit order
pub static GC_ATTRIBUTES: [MaskedField<GcValues>; 23] = [
    gc_attribute!("function", function, function),
    gc_attribute!("plane-mask", plane_mask, card32),
    gc_attribute!("foreground", foreground, card32),
    gc_attribute!("background", background, card32),
    gc_attribute!("line-width", line_width, card16),
    gc_attribute!("line-style", line_style, line_style),
    gc_attribute!("cap-style", cap_style, cap_style),
    gc_attribute!("join-style", join_style, join_style),
    gc_attribute!("fill-style", fill_style, fill_style),
    gc_attribute!("fill-rule", fill_rule, fill_rule),
    gc_attribute!("tile", tile, pixmap),
    gc_attribute!("stipple", stipple, pixmap),
    gc_attribute!("tile-stipple-x-origin", tile_stipple_x_origin, int16),
    gc_attribute!("tile-stipple-y-origin", tile_stipple_y_origin, int16),
    gc_attribute!("font", font, font),
    gc_attribute!("subwindow-mode", subwindow_mode, subwindow_mode),
    gc_attribute!("graphics-exposures", graphics_exposures, boolean),
    gc_attribute!("clip-x-origin", clip_x_origin, int16),
    gc_attribute!("clip-y-origin", clip_y_origin, int16),
    gc_attribute!("clip-mask", clip_mask, pixmap),
    gc_attribute!("dash-offset", dash_offset, card16),
    gc_attribute!("dashes", dashes, dashes),
    gc_attribute!("arc-mode", arc_mode, arc_mode),
];

/// Value-mask bits for GC attributes
pub mod gc_mask {
    pub const FUNCTION: u32 = 1 << 0;
    pub const PLANE_MASK: u32 = 1 << 1;
    pub const FOREGROUND: u32 = 1 << 2;
    pub const BACKGROUND: u32 = 1 << 3;
    pub const LINE_WIDTH: u32 = 1 << 4;
    pub const LINE_STYLE: u32 = 1 << 5;
    pub const CAP_STYLE: u32 = 1 << 6;
    pub const JOIN_STYLE: u32 = 1 << 7;
    pub const FILL_STYLE: u32 = 1 << 8;
    pub const FILL_RULE: u32 = 1 << 9;
    pub const TILE: u32 = 1 << 10;
    pub const STIPPLE: u32 = 1 << 11;
    pub const TILE_STIPPLE_X_ORIGIN: u32 = 1 << 12;
    pub const TILE_STIPPLE_Y_ORIGIN: u32 = 1 << 13;
    pub const FONT: u32 = 1 << 14;
    pub const SUBWINDOW_MODE: u32 = 1 << 15;
    pub const GRAPHICS_EXPOSURES: u32 = 1 << 16;
    pub const CLIP_X_ORIGIN: u32 = 1 << 17;
    pub const CLIP_Y_ORIGIN: u32 = 1 << 18;
    pub const CLIP_MASK: u32 = 1 << 19;
    pub const DASH_OFFSET: u32 = 1 << 20;
    pub const DASHES: u32 = 1 << 21;
    pub const ARC_MODE: u32 = 1 << 22;
}

/// A graphics context resource
#[derive(Debug)]
pub struct GraphicsContext {
    gc: GContext,
    /// Drawable the context was created against; not re-validated later
    drawable: Drawable,
    values: Mutex<GcValues>,
}

impl GraphicsContext {
    pub fn gcontext(&self) -> GContext {
        self.gc
    }

    pub fn drawable(&self) -> Drawable {
        self.drawable
    }

    /// Snapshot of the current attribute values
    pub fn values(&self) -> GcValues {
        self.values.lock().clone()
    }
}

impl Resource for GraphicsContext {
    fn id(&self) -> XID {
        self.gc.id()
    }
}

/// Owns every graphics context on the server
pub struct GraphicsContextManager {
    contexts: ResourceRegistry<GraphicsContext>,
}

impl GraphicsContextManager {
    pub fn new(ids: Arc<IdSpace>) -> Self {
        GraphicsContextManager {
            contexts: ResourceRegistry::new("gcs", ids),
        }
    }

    /// Create a context with default attributes; `None` if `id` is taken
    pub fn create_graphics_context(
        &self,
        owner: u32,
        id: XID,
        drawable: &DrawableEntry,
    ) -> Option<Arc<GraphicsContext>> {
        self.create_graphics_context_with(owner, id, drawable, GcValues::default())
    }

    /// Create a context whose attributes were already decoded
    pub fn create_graphics_context_with(
        &self,
        owner: u32,
        id: XID,
        drawable: &DrawableEntry,
        values: GcValues,
    ) -> Option<Arc<GraphicsContext>> {
        self.contexts.create(owner, id, || GraphicsContext {
            gc: GContext(id),
            drawable: drawable.drawable,
            values: Mutex::new(values),
        })
    }

    pub fn get_graphics_context(&self, id: XID) -> Option<Arc<GraphicsContext>> {
        self.contexts.get(id)
    }

    /// Apply a masked value list to `gc`.
    ///
    /// Values are decoded into a staged copy; nothing changes unless the
    /// whole list decodes.
    pub fn update_graphics_context(
        &self,
        gc: &GraphicsContext,
        mask: Bitmask,
        reader: &mut RequestReader<'_>,
    ) -> RequestResult<()> {
        let mut values = gc.values.lock();
        let mut staged = values.clone();
        mask.decode_into(&GC_ATTRIBUTES, &mut staged, reader)?;
        *values = staged;
        log::debug!("ChangeGC: gc={} mask=0x{:x}", gc.id(), mask.bits());
        Ok(())
    }

    /// Copy the masked attributes of `src` into `dst`
    pub fn copy_graphics_context(&self, src: &GraphicsContext, dst: &GraphicsContext, mask: Bitmask) {
        // Snapshot first so two opposite copies never hold both locks.
        let source = src.values();
        let mut target = dst.values.lock();
        mask.copy_into(&GC_ATTRIBUTES, &source, &mut target);
        log::debug!(
            "CopyGC: copied attributes from {} to {} (mask=0x{:x})",
            src.id(),
            dst.id(),
            mask.bits()
        );
    }

    /// Replace the dash pattern of `gc`
    pub fn set_dashes(&self, gc: &GraphicsContext, dash_offset: u16, dashes: &[u8]) -> RequestResult<()> {
        if dashes.is_empty() || dashes.contains(&0) {
            return Err(RequestError::bad_value(0));
        }
        let mut values = gc.values.lock();
        values.dash_offset = dash_offset;
        values.dashes = dashes.to_vec();
        Ok(())
    }

    /// Remove a context. Absent ids are ignored.
    pub fn free_graphics_context(&self, id: XID) {
        if self.contexts.free(id).is_none() {
            log::debug!("FreeGC: GC {} not found", id);
        }
    }

    /// Free a context on behalf of a disconnecting client
    pub fn release_graphics_context(&self, owner: u32, id: XID) {
        self.contexts.free_owned(owner, id);
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
