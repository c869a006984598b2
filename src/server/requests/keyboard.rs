//! Keyboard requests: GetKeyboardMapping, GetModifierMapping

use crate::protocol::*;
use crate::server::dispatcher::{HandlerResult, RequestContext};
use crate::server::keyboard::{KEYCODES_PER_MODIFIER, KEYSYMS_PER_KEYCODE};

pub(super) fn handle_get_keyboard_mapping(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // first-keycode(1), count(1), pad(2)
    let first_keycode = reader.read_u8()?;
    let count = reader.read_u8()?;

    log::debug!(
        "GetKeyboardMapping: first_keycode={}, count={}",
        first_keycode,
        count
    );

    let keysyms = ctx.server.keyboard().mapping(first_keycode, count)?;
    Ok(Some(ctx.encoder().encode_get_keyboard_mapping_reply(
        ctx.sequence,
        KEYSYMS_PER_KEYCODE,
        keysyms,
    )))
}

pub(super) fn handle_get_modifier_mapping(
    ctx: &RequestContext<'_>,
    _reader: &mut RequestReader<'_>,
) -> HandlerResult {
    log::debug!("GetModifierMapping");
    Ok(Some(ctx.encoder().encode_get_modifier_mapping_reply(
        ctx.sequence,
        KEYCODES_PER_MODIFIER,
        ctx.server.keyboard().modifier_map(),
    )))
}
