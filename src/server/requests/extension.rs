//! QueryExtension and NoOperation

use crate::protocol::*;
use crate::server::dispatcher::{HandlerResult, RequestContext};

/// No extensions are implemented, so every name is reported absent
pub(super) fn handle_query_extension(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // name-length(2), pad(2), name(n)
    let name_length = reader.read_u16()? as usize;
    reader.skip(2)?;
    let name = String::from_utf8_lossy(reader.read_bytes(name_length)?);

    log::debug!("QueryExtension: extension {:?} not found", name);

    Ok(Some(ctx.encoder().encode_query_extension_reply(
        ctx.sequence,
        false,
        0,
        0,
        0,
    )))
}

pub(super) fn handle_no_operation(
    _ctx: &RequestContext<'_>,
    _reader: &mut RequestReader<'_>,
) -> HandlerResult {
    Ok(None)
}
