//! Pixmap requests: CreatePixmap, FreePixmap

use crate::protocol::*;
use crate::resources::ResourceKind;
use crate::server::dispatcher::{HandlerResult, RequestContext};

pub(super) fn handle_create_pixmap(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // depth(1 in header), pid(4), drawable(4), width(2), height(2)
    let depth = ctx.header.detail;
    let pid = reader.read_xid()?;
    let drawable = reader.read_xid()?;
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;

    log::debug!(
        "CreatePixmap: pid=0x{:x}, drawable=0x{:x}, {}x{}x{}",
        pid.get(),
        drawable.get(),
        width,
        height,
        depth
    );

    ctx.check_new_id(pid)?;
    let reference = ctx
        .server
        .drawables()
        .get_drawable(drawable)
        .ok_or(RequestError::bad_drawable(drawable))?;

    if width == 0 {
        return Err(RequestError::bad_value(width as u32));
    }
    if height == 0 {
        return Err(RequestError::bad_value(height as u32));
    }
    if depth != 1 && depth != reference.depth {
        return Err(RequestError::bad_value(depth as u32));
    }

    ctx.server
        .drawables()
        .create_pixmap(ctx.client.client_id, Pixmap(pid), width, height, depth)
        .ok_or(RequestError::bad_id_choice(pid))?;
    ctx.client
        .register_as_owner_of_resource(ResourceKind::Pixmap, pid);
    Ok(None)
}

pub(super) fn handle_free_pixmap(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // pixmap(4)
    let pid = reader.read_xid()?;
    log::debug!("FreePixmap: pixmap=0x{:x}", pid.get());

    ctx.server.drawables().free_pixmap(pid)?;
    ctx.client.forget_resource(ResourceKind::Pixmap, pid);
    Ok(None)
}
