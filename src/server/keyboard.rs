//! Keyboard mapping
//!
//! Keycodes follow the evdev numbering (kernel scancode + 8) with a US
//! layout. Each keycode carries an unshifted and a shifted keysym; keys with
//! a single symbol leave the second column as NoSymbol.

use crate::protocol::*;

pub const KEYSYMS_PER_KEYCODE: u8 = 2;
pub const KEYCODES_PER_MODIFIER: u8 = 2;

const NO_SYMBOL: u32 = 0;

/// (keycode, unshifted, shifted)
const US_LAYOUT: &[(u8, u32, u32)] = &[
    (9, 0xff1b, NO_SYMBOL), // Escape
    (10, b'1' as u32, b'!' as u32),
    (11, b'2' as u32, b'@' as u32),
    (12, b'3' as u32, b'#' as u32),
    (13, b'4' as u32, b'$' as u32),
    (14, b'5' as u32, b'%' as u32),
    (15, b'6' as u32, b'^' as u32),
    (16, b'7' as u32, b'&' as u32),
    (17, b'8' as u32, b'*' as u32),
    (18, b'9' as u32, b'(' as u32),
    (19, b'0' as u32, b')' as u32),
    (20, b'-' as u32, b'_' as u32),
    (21, b'=' as u32, b'+' as u32),
    (22, 0xff08, NO_SYMBOL), // BackSpace
    (23, 0xff09, NO_SYMBOL), // Tab
    (34, b'[' as u32, b'{' as u32),
    (35, b']' as u32, b'}' as u32),
    (36, 0xff0d, NO_SYMBOL), // Return
    (37, 0xffe3, NO_SYMBOL), // Control_L
    (47, b';' as u32, b':' as u32),
    (48, b'\'' as u32, b'"' as u32),
    (49, b'`' as u32, b'~' as u32),
    (50, 0xffe1, NO_SYMBOL), // Shift_L
    (51, b'\\' as u32, b'|' as u32),
    (59, b',' as u32, b'<' as u32),
    (60, b'.' as u32, b'>' as u32),
    (61, b'/' as u32, b'?' as u32),
    (62, 0xffe2, NO_SYMBOL), // Shift_R
    (63, 0xffaa, NO_SYMBOL), // KP_Multiply
    (64, 0xffe9, NO_SYMBOL), // Alt_L
    (65, b' ' as u32, NO_SYMBOL),
    (66, 0xffe5, NO_SYMBOL), // Caps_Lock
    (77, 0xff7f, NO_SYMBOL), // Num_Lock
    (78, 0xff14, NO_SYMBOL), // Scroll_Lock
    (95, 0xffc8, NO_SYMBOL), // F11
    (96, 0xffc9, NO_SYMBOL), // F12
    (104, 0xff8d, NO_SYMBOL), // KP_Enter
    (105, 0xffe4, NO_SYMBOL), // Control_R
    (108, 0xffea, NO_SYMBOL), // Alt_R
    (110, 0xff50, NO_SYMBOL), // Home
    (111, 0xff52, NO_SYMBOL), // Up
    (112, 0xff55, NO_SYMBOL), // Prior
    (113, 0xff51, NO_SYMBOL), // Left
    (114, 0xff53, NO_SYMBOL), // Right
    (115, 0xff57, NO_SYMBOL), // End
    (116, 0xff54, NO_SYMBOL), // Down
    (117, 0xff56, NO_SYMBOL), // Next
    (118, 0xff63, NO_SYMBOL), // Insert
    (119, 0xffff, NO_SYMBOL), // Delete
    (133, 0xffeb, NO_SYMBOL), // Super_L
    (134, 0xffec, NO_SYMBOL), // Super_R
    (135, 0xff67, NO_SYMBOL), // Menu
];

/// Letter rows, keyed by the keycode of their first letter
const LETTER_ROWS: [(u8, &[u8]); 3] = [(24, b"qwertyuiop"), (38, b"asdfghjkl"), (52, b"zxcvbnm")];

/// Shift, Lock, Control, Mod1..Mod5; 0 marks an unused slot
const MODIFIER_MAP: [[u8; KEYCODES_PER_MODIFIER as usize]; 8] = [
    [50, 62],   // Shift_L, Shift_R
    [66, 0],    // Caps_Lock
    [37, 105],  // Control_L, Control_R
    [64, 108],  // Alt_L, Alt_R
    [77, 0],    // Num_Lock
    [0, 0],
    [133, 134], // Super_L, Super_R
    [0, 0],
];

/// Keycode to keysym table and modifier map served to clients
pub struct Keyboard {
    keysyms: Vec<u32>,
    modifiers: Vec<u8>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::us()
    }
}

impl Keyboard {
    pub fn us() -> Self {
        let per = KEYSYMS_PER_KEYCODE as usize;
        let count = (MAX_KEYCODE - MIN_KEYCODE) as usize + 1;
        let mut keysyms = vec![NO_SYMBOL; count * per];
        let mut set = |keycode: u8, unshifted: u32, shifted: u32| {
            let index = (keycode - MIN_KEYCODE) as usize * per;
            keysyms[index] = unshifted;
            keysyms[index + 1] = shifted;
        };

        for &(keycode, unshifted, shifted) in US_LAYOUT {
            set(keycode, unshifted, shifted);
        }
        for (first, letters) in LETTER_ROWS {
            for (offset, &letter) in letters.iter().enumerate() {
                set(
                    first + offset as u8,
                    letter as u32,
                    letter.to_ascii_uppercase() as u32,
                );
            }
        }
        // F1..F10 are consecutive in both numberings
        for n in 0..10u8 {
            set(67 + n, 0xffbe + n as u32, NO_SYMBOL);
        }

        Keyboard {
            keysyms,
            modifiers: MODIFIER_MAP.concat(),
        }
    }

    /// Keysyms for `count` keycodes starting at `first`.
    ///
    /// The range must lie within the advertised keycode range, otherwise the
    /// offending value is reported.
    pub fn mapping(&self, first: u8, count: u8) -> RequestResult<&[u32]> {
        if first < MIN_KEYCODE {
            return Err(RequestError::bad_value(first as u32));
        }
        let last = first as u32 + count as u32;
        if count == 0 || last - 1 > MAX_KEYCODE as u32 {
            return Err(RequestError::bad_value(count as u32));
        }
        let per = KEYSYMS_PER_KEYCODE as usize;
        let start = (first - MIN_KEYCODE) as usize * per;
        Ok(&self.keysyms[start..start + count as usize * per])
    }

    pub fn keysyms(&self, keycode: Keycode) -> Option<&[u32]> {
        self.mapping(keycode.get(), 1).ok()
    }

    /// Eight rows of [`KEYCODES_PER_MODIFIER`] keycodes
    pub fn modifier_map(&self) -> &[u8] {
        &self.modifiers
    }
}
