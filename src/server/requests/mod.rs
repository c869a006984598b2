//! Core request handlers, grouped by resource family

mod atom;
mod extension;
mod gc;
mod keyboard;
mod pixmap;

use super::dispatcher::RequestDispatcher;
use crate::protocol::RequestOpcode;

/// Install every handler in `dispatcher`
pub fn register_all(dispatcher: &mut RequestDispatcher) {
    dispatcher.register(RequestOpcode::InternAtom, atom::handle_intern_atom);
    dispatcher.register(RequestOpcode::GetAtomName, atom::handle_get_atom_name);
    dispatcher.register(RequestOpcode::CreatePixmap, pixmap::handle_create_pixmap);
    dispatcher.register(RequestOpcode::FreePixmap, pixmap::handle_free_pixmap);
    dispatcher.register(RequestOpcode::CreateGC, gc::handle_create_gc);
    dispatcher.register(RequestOpcode::ChangeGC, gc::handle_change_gc);
    dispatcher.register(RequestOpcode::CopyGC, gc::handle_copy_gc);
    dispatcher.register(RequestOpcode::SetDashes, gc::handle_set_dashes);
    dispatcher.register(RequestOpcode::FreeGC, gc::handle_free_gc);
    dispatcher.register(RequestOpcode::QueryExtension, extension::handle_query_extension);
    dispatcher.register(
        RequestOpcode::GetKeyboardMapping,
        keyboard::handle_get_keyboard_mapping,
    );
    dispatcher.register(
        RequestOpcode::GetModifierMapping,
        keyboard::handle_get_modifier_mapping,
    );
    dispatcher.register(RequestOpcode::NoOperation, extension::handle_no_operation);
}
