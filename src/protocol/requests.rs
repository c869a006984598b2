//! X11 protocol requests
//!
//! This module defines the X11 request opcodes and the helpers used to
//! decode request headers and payloads.

use super::errors::*;
use super::types::*;

/// X11 request opcodes handled by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestOpcode {
    InternAtom = 16,
    GetAtomName = 17,
    CreatePixmap = 53,
    FreePixmap = 54,
    CreateGC = 55,
    ChangeGC = 56,
    CopyGC = 57,
    SetDashes = 58,
    FreeGC = 60,
    QueryExtension = 98,
    GetKeyboardMapping = 101,
    GetModifierMapping = 119,
    NoOperation = 127,
}

impl RequestOpcode {
    pub fn from_u8(opcode: u8) -> Option<Self> {
        match opcode {
            16 => Some(RequestOpcode::InternAtom),
            17 => Some(RequestOpcode::GetAtomName),
            53 => Some(RequestOpcode::CreatePixmap),
            54 => Some(RequestOpcode::FreePixmap),
            55 => Some(RequestOpcode::CreateGC),
            56 => Some(RequestOpcode::ChangeGC),
            57 => Some(RequestOpcode::CopyGC),
            58 => Some(RequestOpcode::SetDashes),
            60 => Some(RequestOpcode::FreeGC),
            98 => Some(RequestOpcode::QueryExtension),
            101 => Some(RequestOpcode::GetKeyboardMapping),
            119 => Some(RequestOpcode::GetModifierMapping),
            127 => Some(RequestOpcode::NoOperation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOpcode::InternAtom => "InternAtom",
            RequestOpcode::GetAtomName => "GetAtomName",
            RequestOpcode::CreatePixmap => "CreatePixmap",
            RequestOpcode::FreePixmap => "FreePixmap",
            RequestOpcode::CreateGC => "CreateGC",
            RequestOpcode::ChangeGC => "ChangeGC",
            RequestOpcode::CopyGC => "CopyGC",
            RequestOpcode::SetDashes => "SetDashes",
            RequestOpcode::FreeGC => "FreeGC",
            RequestOpcode::QueryExtension => "QueryExtension",
            RequestOpcode::GetKeyboardMapping => "GetKeyboardMapping",
            RequestOpcode::GetModifierMapping => "GetModifierMapping",
            RequestOpcode::NoOperation => "NoOperation",
        }
    }
}

/// Size of the fixed request header
pub const REQUEST_HEADER_SIZE: usize = 4;

/// Request header (common to all requests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub opcode: u8,
    pub detail: u8,  // Request-specific detail byte
    pub length: u16, // Length in 4-byte units, header included
}

impl RequestHeader {
    /// Parse request header from buffer
    pub fn parse(buffer: &[u8; REQUEST_HEADER_SIZE], byte_order: ByteOrder) -> Self {
        RequestHeader {
            opcode: buffer[0],
            detail: buffer[1],
            length: byte_order.read_u16(&buffer[2..4]),
        }
    }

    /// Get total request size in bytes
    pub fn size(&self) -> usize {
        (self.length as usize) * 4
    }

    /// Number of payload bytes following the header, `None` when the
    /// declared length cannot even hold the header itself
    pub fn payload_size(&self) -> Option<usize> {
        self.size().checked_sub(REQUEST_HEADER_SIZE)
    }
}

/// Helper to read values from a request payload
///
/// Every read is bounds-checked; running off the end of the payload is a
/// `Length` error for the request being decoded.
pub struct RequestReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    byte_order: ByteOrder,
}

impl<'a> RequestReader<'a> {
    pub fn new(buffer: &'a [u8], byte_order: ByteOrder) -> Self {
        RequestReader {
            buffer,
            offset: 0,
            byte_order,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.offset
    }

    fn take(&mut self, n: usize) -> RequestResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.buffer.len())
            .ok_or_else(RequestError::bad_length)?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> RequestResult<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> RequestResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> RequestResult<u16> {
        let bytes = self.take(2)?;
        Ok(self.byte_order.read_u16(bytes))
    }

    pub fn read_i16(&mut self) -> RequestResult<i16> {
        let bytes = self.take(2)?;
        Ok(self.byte_order.read_i16(bytes))
    }

    pub fn read_u32(&mut self) -> RequestResult<u32> {
        let bytes = self.take(4)?;
        Ok(self.byte_order.read_u32(bytes))
    }

    pub fn read_xid(&mut self) -> RequestResult<XID> {
        self.read_u32().map(XID::new)
    }

    pub fn read_bytes(&mut self, len: usize) -> RequestResult<&'a [u8]> {
        self.take(len)
    }

    /// Consume exactly `len` bytes and return a reader over them
    pub fn sub_reader(&mut self, len: usize) -> RequestResult<RequestReader<'a>> {
        let slice = self.take(len)?;
        Ok(RequestReader::new(slice, self.byte_order))
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }
}
