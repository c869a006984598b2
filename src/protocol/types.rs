//! Core X11 protocol types
//!
//! These types represent the fundamental data types used in the X11 protocol.
//! They are kept minimal and close to the wire protocol for efficiency.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use std::fmt;

/// X11 resource ID - used for windows, pixmaps, graphics contexts, etc.
/// In X11, all objects are identified by 29-bit IDs.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XID(pub u32);

impl XID {
    pub const NONE: XID = XID(0);

    pub fn new(id: u32) -> Self {
        XID(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for XID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Window ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window(pub XID);

impl Window {
    pub const NONE: Window = Window(XID::NONE);

    pub fn new(id: u32) -> Self {
        Window(XID::new(id))
    }

    pub fn id(&self) -> XID {
        self.0
    }
}

/// Pixmap ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixmap(pub XID);

impl Pixmap {
    pub const NONE: Pixmap = Pixmap(XID::NONE);

    pub fn new(id: u32) -> Self {
        Pixmap(XID::new(id))
    }

    pub fn id(&self) -> XID {
        self.0
    }
}

/// Drawable - can be either a Window or Pixmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    Window(Window),
    Pixmap(Pixmap),
}

impl Drawable {
    pub fn id(&self) -> XID {
        match self {
            Drawable::Window(w) => w.id(),
            Drawable::Pixmap(p) => p.id(),
        }
    }
}

/// Graphics Context ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GContext(pub XID);

impl GContext {
    pub fn new(id: u32) -> Self {
        GContext(XID::new(id))
    }

    pub fn id(&self) -> XID {
        self.0
    }
}

/// Font ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Font(pub XID);

impl Font {
    pub const NONE: Font = Font(XID::NONE);

    pub fn new(id: u32) -> Self {
        Font(XID::new(id))
    }

    pub fn id(&self) -> XID {
        self.0
    }
}

/// Atom - interned string identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(0);

    pub fn new(id: u32) -> Self {
        Atom(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Timestamp (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub const CURRENT_TIME: Timestamp = Timestamp(0);

    pub fn new(ms: u32) -> Self {
        Timestamp(ms)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Keycode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keycode(pub u8);

impl Keycode {
    pub fn new(code: u8) -> Self {
        Keycode(code)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Button (mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Button(pub u8);

impl Button {
    pub const BUTTON1: Button = Button(1);
    pub const BUTTON2: Button = Button(2);
    pub const BUTTON3: Button = Button(3);
    pub const BUTTON4: Button = Button(4);
    pub const BUTTON5: Button = Button(5);

    pub fn new(button: u8) -> Self {
        Button(button)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Point (x, y coordinate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }
}

/// Keyboard/pointer modifier masks
pub mod modifier_mask {
    pub const SHIFT: u32 = 1 << 0;
    pub const LOCK: u32 = 1 << 1;
    pub const CONTROL: u32 = 1 << 2;
    pub const MOD1: u32 = 1 << 3;
    pub const MOD2: u32 = 1 << 4;
    pub const MOD3: u32 = 1 << 5;
    pub const MOD4: u32 = 1 << 6;
    pub const MOD5: u32 = 1 << 7;
    pub const BUTTON1: u32 = 1 << 8;
    pub const BUTTON2: u32 = 1 << 9;
    pub const BUTTON3: u32 = 1 << 10;
    pub const BUTTON4: u32 = 1 << 11;
    pub const BUTTON5: u32 = 1 << 12;
}

/// Generates an enum with a checked conversion from its wire value.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

wire_enum!(
    /// GC function
    GCFunction {
        Clear = 0,
        And = 1,
        AndReverse = 2,
        Copy = 3,
        AndInverted = 4,
        NoOp = 5,
        Xor = 6,
        Or = 7,
        Nor = 8,
        Equiv = 9,
        Invert = 10,
        OrReverse = 11,
        CopyInverted = 12,
        OrInverted = 13,
        Nand = 14,
        Set = 15,
    }
);

wire_enum!(
    /// Line style
    LineStyle {
        Solid = 0,
        OnOffDash = 1,
        DoubleDash = 2,
    }
);

wire_enum!(
    /// Cap style
    CapStyle {
        NotLast = 0,
        Butt = 1,
        Round = 2,
        Projecting = 3,
    }
);

wire_enum!(
    /// Join style
    JoinStyle {
        Miter = 0,
        Round = 1,
        Bevel = 2,
    }
);

wire_enum!(
    /// Fill style
    FillStyle {
        Solid = 0,
        Tiled = 1,
        Stippled = 2,
        OpaqueStippled = 3,
    }
);

wire_enum!(
    /// Fill rule
    FillRule {
        EvenOdd = 0,
        Winding = 1,
    }
);

wire_enum!(
    /// Subwindow mode
    SubwindowMode {
        ClipByChildren = 0,
        IncludeInferiors = 1,
    }
);

wire_enum!(
    /// Arc mode
    ArcMode {
        Chord = 0,
        PieSlice = 1,
    }
);

/// Byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LSBFirst = 0,
    MSBFirst = 1,
}

impl ByteOrder {
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LSBFirst
        } else {
            ByteOrder::MSBFirst
        }
    }

    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            ByteOrder::MSBFirst => BigEndian::read_u16(buf),
            ByteOrder::LSBFirst => LittleEndian::read_u16(buf),
        }
    }

    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            ByteOrder::MSBFirst => BigEndian::read_i16(buf),
            ByteOrder::LSBFirst => LittleEndian::read_i16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            ByteOrder::MSBFirst => BigEndian::read_u32(buf),
            ByteOrder::LSBFirst => LittleEndian::read_u32(buf),
        }
    }

    pub fn write_u16(self, buf: &mut [u8], value: u16) {
        match self {
            ByteOrder::MSBFirst => BigEndian::write_u16(buf, value),
            ByteOrder::LSBFirst => LittleEndian::write_u16(buf, value),
        }
    }

    pub fn write_i16(self, buf: &mut [u8], value: i16) {
        match self {
            ByteOrder::MSBFirst => BigEndian::write_i16(buf, value),
            ByteOrder::LSBFirst => LittleEndian::write_i16(buf, value),
        }
    }

    pub fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            ByteOrder::MSBFirst => BigEndian::write_u32(buf, value),
            ByteOrder::LSBFirst => LittleEndian::write_u32(buf, value),
        }
    }
}
