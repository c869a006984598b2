//! Graphics context requests: CreateGC, ChangeGC, CopyGC, SetDashes, FreeGC

use crate::protocol::*;
use crate::resources::{GcValues, ResourceKind, GC_ATTRIBUTES};
use crate::server::dispatcher::{HandlerResult, RequestContext};

pub(super) fn handle_create_gc(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // cid(4), drawable(4), value-mask(4), value-list(...)
    let cid = reader.read_xid()?;
    let drawable = reader.read_xid()?;
    let mask = Bitmask::new(reader.read_u32()?);

    log::debug!(
        "CreateGC: cid=0x{:x}, drawable=0x{:x}, mask=0x{:x}",
        cid.get(),
        drawable.get(),
        mask.bits()
    );

    ctx.check_new_id(cid)?;
    let target = ctx
        .server
        .drawables()
        .get_drawable(drawable)
        .ok_or(RequestError::bad_drawable(drawable))?;

    let mut values = GcValues::default();
    mask.decode_into(&GC_ATTRIBUTES, &mut values, reader)?;

    ctx.server
        .graphics_contexts()
        .create_graphics_context_with(ctx.client.client_id, cid, &target, values)
        .ok_or(RequestError::bad_id_choice(cid))?;

    ctx.client
        .register_as_owner_of_resource(ResourceKind::GraphicsContext, cid);
    Ok(None)
}

pub(super) fn handle_change_gc(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // gc(4), value-mask(4), value-list(...)
    let id = reader.read_xid()?;
    let mask = Bitmask::new(reader.read_u32()?);

    log::debug!("ChangeGC: gc=0x{:x}, mask=0x{:x}", id.get(), mask.bits());

    let gcs = ctx.server.graphics_contexts();
    let gc = gcs
        .get_graphics_context(id)
        .ok_or(RequestError::bad_gc(id))?;
    if !mask.is_empty() {
        gcs.update_graphics_context(&gc, mask, reader)?;
    }
    Ok(None)
}

pub(super) fn handle_copy_gc(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // src-gc(4), dst-gc(4), value-mask(4)
    let src_id = reader.read_xid()?;
    let dst_id = reader.read_xid()?;
    let mask = Bitmask::new(reader.read_u32()?);

    log::debug!(
        "CopyGC: src=0x{:x}, dst=0x{:x}, mask=0x{:x}",
        src_id.get(),
        dst_id.get(),
        mask.bits()
    );

    let gcs = ctx.server.graphics_contexts();
    let src = gcs
        .get_graphics_context(src_id)
        .ok_or(RequestError::bad_gc(src_id))?;
    let dst = gcs
        .get_graphics_context(dst_id)
        .ok_or(RequestError::bad_gc(dst_id))?;
    if !mask.is_empty() {
        gcs.copy_graphics_context(&src, &dst, mask);
    }
    Ok(None)
}

pub(super) fn handle_set_dashes(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // gc(4), dash-offset(2), n(2), dashes(n)
    let id = reader.read_xid()?;
    let dash_offset = reader.read_u16()?;
    let count = reader.read_u16()? as usize;
    let dashes = reader.read_bytes(count)?;

    log::debug!(
        "SetDashes: gc=0x{:x}, offset={}, dashes={:?}",
        id.get(),
        dash_offset,
        dashes
    );

    let gcs = ctx.server.graphics_contexts();
    let gc = gcs
        .get_graphics_context(id)
        .ok_or(RequestError::bad_gc(id))?;
    gcs.set_dashes(&gc, dash_offset, dashes)?;
    Ok(None)
}

pub(super) fn handle_free_gc(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // gc(4)
    let id = reader.read_xid()?;
    log::debug!("FreeGC: gc=0x{:x}", id.get());

    ctx.server.graphics_contexts().free_graphics_context(id);
    ctx.client
        .forget_resource(ResourceKind::GraphicsContext, id);
    Ok(None)
}
