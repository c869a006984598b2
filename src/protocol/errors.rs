//! X11 protocol error codes and error handling

use super::types::*;
use std::fmt;

/// X11 error codes as defined in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    Request = 1,
    Value = 2,
    Window = 3,
    Pixmap = 4,
    Atom = 5,
    Cursor = 6,
    Font = 7,
    Match = 8,
    Drawable = 9,
    Access = 10,
    Alloc = 11,
    Colormap = 12,
    GContext = 13,
    IDChoice = 14,
    Name = 15,
    Length = 16,
    Implementation = 17,
}

impl ErrorCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(ErrorCode::Request),
            2 => Some(ErrorCode::Value),
            3 => Some(ErrorCode::Window),
            4 => Some(ErrorCode::Pixmap),
            5 => Some(ErrorCode::Atom),
            6 => Some(ErrorCode::Cursor),
            7 => Some(ErrorCode::Font),
            8 => Some(ErrorCode::Match),
            9 => Some(ErrorCode::Drawable),
            10 => Some(ErrorCode::Access),
            11 => Some(ErrorCode::Alloc),
            12 => Some(ErrorCode::Colormap),
            13 => Some(ErrorCode::GContext),
            14 => Some(ErrorCode::IDChoice),
            15 => Some(ErrorCode::Name),
            16 => Some(ErrorCode::Length),
            17 => Some(ErrorCode::Implementation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Request => "Request: bad request code",
            ErrorCode::Value => "Value: integer parameter out of range",
            ErrorCode::Window => "Window: invalid Window parameter",
            ErrorCode::Pixmap => "Pixmap: invalid Pixmap parameter",
            ErrorCode::Atom => "Atom: invalid Atom parameter",
            ErrorCode::Cursor => "Cursor: invalid Cursor parameter",
            ErrorCode::Font => "Font: invalid Font parameter",
            ErrorCode::Match => "Match: parameter mismatch",
            ErrorCode::Drawable => "Drawable: invalid Drawable parameter",
            ErrorCode::Access => "Access: attempt to access private resource",
            ErrorCode::Alloc => "Alloc: insufficient resources",
            ErrorCode::Colormap => "Colormap: invalid Colormap parameter",
            ErrorCode::GContext => "GContext: invalid GC parameter",
            ErrorCode::IDChoice => "IDChoice: invalid resource ID for this connection",
            ErrorCode::Name => "Name: font or color name doesn't exist",
            ErrorCode::Length => "Length: request length incorrect",
            ErrorCode::Implementation => "Implementation: server implementation error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recoverable error raised by a request handler.
///
/// Carries only what the handler knows: the error kind and the offending
/// value. The dispatcher adds sequence number and opcodes when it turns this
/// into an [`X11Error`] frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestError {
    pub code: ErrorCode,
    pub bad_value: u32,
}

impl RequestError {
    pub fn new(code: ErrorCode, bad_value: u32) -> Self {
        RequestError { code, bad_value }
    }

    pub fn bad_request(opcode: u8) -> Self {
        RequestError::new(ErrorCode::Request, opcode as u32)
    }

    pub fn bad_value(value: u32) -> Self {
        RequestError::new(ErrorCode::Value, value)
    }

    pub fn bad_pixmap(id: XID) -> Self {
        RequestError::new(ErrorCode::Pixmap, id.get())
    }

    pub fn bad_atom(atom: u32) -> Self {
        RequestError::new(ErrorCode::Atom, atom)
    }

    pub fn bad_drawable(id: XID) -> Self {
        RequestError::new(ErrorCode::Drawable, id.get())
    }

    pub fn bad_gc(id: XID) -> Self {
        RequestError::new(ErrorCode::GContext, id.get())
    }

    pub fn bad_id_choice(id: XID) -> Self {
        RequestError::new(ErrorCode::IDChoice, id.get())
    }

    pub fn bad_length() -> Self {
        RequestError::new(ErrorCode::Length, 0)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (value: 0x{:08x})", self.code, self.bad_value)
    }
}

impl std::error::Error for RequestError {}

/// Result type for request handlers
pub type RequestResult<T> = Result<T, RequestError>;

/// X11 error packet
#[derive(Debug, Clone)]
pub struct X11Error {
    pub code: ErrorCode,
    pub sequence: u16,
    pub bad_value: u32,
    pub minor_opcode: u16,
    pub major_opcode: u8,
}

/// Size of every error frame on the wire
pub const ERROR_FRAME_SIZE: usize = 32;

impl X11Error {
    pub fn new(
        code: ErrorCode,
        sequence: u16,
        bad_value: u32,
        minor_opcode: u16,
        major_opcode: u8,
    ) -> Self {
        X11Error {
            code,
            sequence,
            bad_value,
            minor_opcode,
            major_opcode,
        }
    }

    /// Build the error frame for a failed request
    pub fn from_request_error(
        error: RequestError,
        sequence: u16,
        minor_opcode: u16,
        major_opcode: u8,
    ) -> Self {
        X11Error::new(error.code, sequence, error.bad_value, minor_opcode, major_opcode)
    }

    /// Encode error to wire format (32 bytes)
    pub fn encode(&self, byte_order: ByteOrder) -> [u8; ERROR_FRAME_SIZE] {
        let mut buffer = [0u8; ERROR_FRAME_SIZE];

        buffer[0] = 0; // Error reply type
        buffer[1] = self.code as u8;
        byte_order.write_u16(&mut buffer[2..4], self.sequence);
        byte_order.write_u32(&mut buffer[4..8], self.bad_value);
        byte_order.write_u16(&mut buffer[8..10], self.minor_opcode);
        buffer[10] = self.major_opcode;
        // 11..32 is padding

        buffer
    }

    /// Decode an error frame (used by tests and diagnostics)
    pub fn parse(frame: &[u8], byte_order: ByteOrder) -> Option<Self> {
        if frame.len() < ERROR_FRAME_SIZE || frame[0] != 0 {
            return None;
        }

        Some(X11Error {
            code: ErrorCode::from_u8(frame[1])?,
            sequence: byte_order.read_u16(&frame[2..4]),
            bad_value: byte_order.read_u32(&frame[4..8]),
            minor_opcode: byte_order.read_u16(&frame[8..10]),
            major_opcode: frame[10],
        })
    }
}

impl fmt::Display for X11Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X11 Error: {} (sequence: {}, value: 0x{:08x}, major: {}, minor: {})",
            self.code, self.sequence, self.bad_value, self.major_opcode, self.minor_opcode
        )
    }
}
