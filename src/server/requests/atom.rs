//! Atom requests: InternAtom, GetAtomName

use crate::protocol::*;
use crate::server::dispatcher::{HandlerResult, RequestContext};

pub(super) fn handle_intern_atom(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // only-if-exists(1 in header), name-length(2), pad(2), name(n)
    let only_if_exists = ctx.header.detail != 0;
    let name_length = reader.read_u16()? as usize;
    reader.skip(2)?;
    let name = reader.read_bytes(name_length)?;

    log::debug!(
        "InternAtom: name={:?}, only_if_exists={}",
        String::from_utf8_lossy(name),
        only_if_exists
    );

    let atom = ctx
        .server
        .atoms()
        .intern(name, only_if_exists)
        .unwrap_or(Atom::NONE);
    Ok(Some(ctx.encoder().encode_intern_atom_reply(ctx.sequence, atom)))
}

pub(super) fn handle_get_atom_name(
    ctx: &RequestContext<'_>,
    reader: &mut RequestReader<'_>,
) -> HandlerResult {
    // atom(4)
    let atom = Atom::new(reader.read_u32()?);
    log::debug!("GetAtomName: atom=0x{:x}", atom.get());

    let name = ctx
        .server
        .atoms()
        .name(atom)
        .ok_or(RequestError::bad_atom(atom.get()))?;
    Ok(Some(ctx.encoder().encode_get_atom_name_reply(ctx.sequence, &name)))
}
