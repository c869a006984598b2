//! X11 reply encoder
//!
//! This module encodes replies to the wire protocol. Every reply starts with
//! a 32-byte header; variable data follows, padded to 4 bytes.

use super::*;

/// Reply encoder
pub struct ProtocolEncoder {
    byte_order: ByteOrder,
}

impl ProtocolEncoder {
    pub fn new(byte_order: ByteOrder) -> Self {
        ProtocolEncoder { byte_order }
    }

    fn reply_header(&self, sequence: u16, detail: u8, extra: &[u8]) -> Vec<u8> {
        let extra_padded = padded_len(extra.len());
        let mut buffer = vec![0u8; 32 + extra_padded];

        buffer[0] = 1; // Reply
        buffer[1] = detail;
        self.byte_order.write_u16(&mut buffer[2..4], sequence);
        self.byte_order
            .write_u32(&mut buffer[4..8], (extra_padded / 4) as u32);
        buffer[32..32 + extra.len()].copy_from_slice(extra);

        buffer
    }

    /// Encode InternAtom reply
    pub fn encode_intern_atom_reply(&self, sequence: u16, atom: Atom) -> Vec<u8> {
        let mut buffer = self.reply_header(sequence, 0, &[]);
        self.byte_order.write_u32(&mut buffer[8..12], atom.get());
        buffer
    }

    /// Encode GetAtomName reply
    pub fn encode_get_atom_name_reply(&self, sequence: u16, name: &[u8]) -> Vec<u8> {
        let mut buffer = self.reply_header(sequence, 0, name);
        self.byte_order
            .write_u16(&mut buffer[8..10], name.len() as u16);
        buffer
    }

    /// Encode GetKeyboardMapping reply; `keysyms` holds
    /// `keysyms_per_keycode` entries for each requested keycode
    pub fn encode_get_keyboard_mapping_reply(
        &self,
        sequence: u16,
        keysyms_per_keycode: u8,
        keysyms: &[u32],
    ) -> Vec<u8> {
        let mut extra = vec![0u8; keysyms.len() * 4];
        for (chunk, &keysym) in extra.chunks_exact_mut(4).zip(keysyms) {
            self.byte_order.write_u32(chunk, keysym);
        }
        self.reply_header(sequence, keysyms_per_keycode, &extra)
    }

    /// Encode GetModifierMapping reply: eight rows of
    /// `keycodes_per_modifier` keycodes, Shift first
    pub fn encode_get_modifier_mapping_reply(
        &self,
        sequence: u16,
        keycodes_per_modifier: u8,
        keycodes: &[u8],
    ) -> Vec<u8> {
        self.reply_header(sequence, keycodes_per_modifier, keycodes)
    }

    /// Encode QueryExtension reply
    pub fn encode_query_extension_reply(
        &self,
        sequence: u16,
        present: bool,
        major_opcode: u8,
        first_event: u8,
        first_error: u8,
    ) -> Vec<u8> {
        let mut buffer = self.reply_header(sequence, 0, &[]);
        buffer[8] = present as u8;
        buffer[9] = major_opcode;
        buffer[10] = first_event;
        buffer[11] = first_error;
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_atom_reply() {
        let reply = ProtocolEncoder::new(ByteOrder::LSBFirst)
            .encode_intern_atom_reply(3, Atom::new(70));
        assert_eq!(reply.len(), 32);
        assert_eq!(reply[0], 1);
        assert_eq!(&reply[2..4], &[3, 0]);
        assert_eq!(&reply[4..8], &[0, 0, 0, 0]);
        assert_eq!(&reply[8..12], &[70, 0, 0, 0]);
    }

    #[test]
    fn test_get_atom_name_reply_is_padded() {
        let reply = ProtocolEncoder::new(ByteOrder::MSBFirst)
            .encode_get_atom_name_reply(9, b"WM_NAME");
        assert_eq!(reply.len(), 40);
        assert_eq!(&reply[4..8], &[0, 0, 0, 2]);
        assert_eq!(&reply[8..10], &[0, 7]);
        assert_eq!(&reply[32..39], b"WM_NAME");
        assert_eq!(reply[39], 0);
    }

    #[test]
    fn test_keyboard_mapping_reply_layout() {
        let reply = ProtocolEncoder::new(ByteOrder::MSBFirst)
            .encode_get_keyboard_mapping_reply(5, 2, &[0x61, 0x41, 0xff1b, 0]);
        assert_eq!(reply.len(), 48);
        assert_eq!(reply[1], 2);
        assert_eq!(&reply[2..4], &[0, 5]);
        assert_eq!(&reply[4..8], &[0, 0, 0, 4]);
        assert_eq!(&reply[32..36], &[0, 0, 0, 0x61]);
        assert_eq!(&reply[40..44], &[0, 0, 0xff, 0x1b]);
    }

    #[test]
    fn test_query_extension_reply_absent() {
        let reply = ProtocolEncoder::new(ByteOrder::LSBFirst)
            .encode_query_extension_reply(1, false, 0, 0, 0);
        assert_eq!(reply.len(), 32);
        assert_eq!(reply[8], 0);
    }
}
