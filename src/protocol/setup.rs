//! X11 connection setup protocol
//!
//! This module handles the initial connection handshake between client and
//! server. Authorization data is read and ignored.

use super::*;
use std::io::{self, Read, Write};

/// Connection setup request from client
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub byte_order: ByteOrder,
    pub protocol_major_version: u16,
    pub protocol_minor_version: u16,
    pub authorization_protocol_name: String,
    pub authorization_protocol_data: Vec<u8>,
}

impl SetupRequest {
    /// Parse setup request from stream
    pub fn parse<R: Read>(stream: &mut R) -> io::Result<Self> {
        let mut header = [0u8; 12];
        stream.read_exact(&mut header)?;

        // Byte 0: byte order ('B' = MSB, 'l' = LSB)
        let byte_order = match header[0] {
            b'B' => ByteOrder::MSBFirst,
            b'l' => ByteOrder::LSBFirst,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid byte order marker 0x{:02x}", other),
                ))
            }
        };

        let protocol_major_version = byte_order.read_u16(&header[2..4]);
        let protocol_minor_version = byte_order.read_u16(&header[4..6]);
        let auth_proto_name_len = byte_order.read_u16(&header[6..8]) as usize;
        let auth_proto_data_len = byte_order.read_u16(&header[8..10]) as usize;

        // Read authorization protocol name (padded to 4 bytes)
        let mut auth_name_buf = vec![0u8; padded_len(auth_proto_name_len)];
        stream.read_exact(&mut auth_name_buf)?;
        let authorization_protocol_name =
            String::from_utf8_lossy(&auth_name_buf[..auth_proto_name_len]).to_string();

        // Read authorization protocol data (padded to 4 bytes)
        let mut authorization_protocol_data = vec![0u8; padded_len(auth_proto_data_len)];
        stream.read_exact(&mut authorization_protocol_data)?;
        authorization_protocol_data.truncate(auth_proto_data_len);

        Ok(SetupRequest {
            byte_order,
            protocol_major_version,
            protocol_minor_version,
            authorization_protocol_name,
            authorization_protocol_data,
        })
    }
}

/// Setup response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStatus {
    Failed = 0,
    Success = 1,
    Authenticate = 2,
}

/// The single screen advertised to clients
#[derive(Debug, Clone)]
pub struct Screen {
    pub root: Window,
    pub default_colormap: u32,
    pub root_visual: u32,
    pub width_in_pixels: u16,
    pub height_in_pixels: u16,
    pub root_depth: u8,
}

/// Setup reply (success case)
#[derive(Debug, Clone)]
pub struct SetupSuccess {
    pub resource_id_base: u32,
    pub resource_id_mask: u32,
    pub vendor: String,
    pub screen: Screen,
}

fn put_u16(buffer: &mut Vec<u8>, byte_order: ByteOrder, value: u16) {
    let mut bytes = [0u8; 2];
    byte_order.write_u16(&mut bytes, value);
    buffer.extend_from_slice(&bytes);
}

fn put_u32(buffer: &mut Vec<u8>, byte_order: ByteOrder, value: u32) {
    let mut bytes = [0u8; 4];
    byte_order.write_u32(&mut bytes, value);
    buffer.extend_from_slice(&bytes);
}

impl SetupSuccess {
    pub fn encode(&self, byte_order: ByteOrder) -> Vec<u8> {
        let screen = &self.screen;
        let mut buffer = Vec::new();

        buffer.push(SetupStatus::Success as u8);
        buffer.push(0);
        put_u16(&mut buffer, byte_order, PROTOCOL_MAJOR_VERSION);
        put_u16(&mut buffer, byte_order, PROTOCOL_MINOR_VERSION);
        let length_pos = buffer.len();
        put_u16(&mut buffer, byte_order, 0); // patched below

        put_u32(&mut buffer, byte_order, 1); // release number
        put_u32(&mut buffer, byte_order, self.resource_id_base);
        put_u32(&mut buffer, byte_order, self.resource_id_mask);
        put_u32(&mut buffer, byte_order, 0); // motion buffer size
        put_u16(&mut buffer, byte_order, self.vendor.len() as u16);
        put_u16(&mut buffer, byte_order, u16::MAX); // maximum request length
        buffer.push(1); // number of screens
        buffer.push(2); // number of pixmap formats
        buffer.push(byte_order as u8); // image byte order
        buffer.push(byte_order as u8); // bitmap bit order
        buffer.push(32); // scanline unit
        buffer.push(32); // scanline pad
        buffer.push(MIN_KEYCODE);
        buffer.push(MAX_KEYCODE);
        buffer.extend_from_slice(&[0u8; 4]);

        buffer.extend_from_slice(self.vendor.as_bytes());
        buffer.resize(buffer.len() + pad(self.vendor.len()), 0);

        // Pixmap formats: depth, bits per pixel, scanline pad, 5 bytes unused
        buffer.extend_from_slice(&[1, 1, 32, 0, 0, 0, 0, 0]);
        buffer.extend_from_slice(&[screen.root_depth, 32, 32, 0, 0, 0, 0, 0]);

        put_u32(&mut buffer, byte_order, screen.root.id().get());
        put_u32(&mut buffer, byte_order, screen.default_colormap);
        put_u32(&mut buffer, byte_order, 0x00ff_ffff); // white pixel
        put_u32(&mut buffer, byte_order, 0); // black pixel
        put_u32(&mut buffer, byte_order, 0); // current input masks
        put_u16(&mut buffer, byte_order, screen.width_in_pixels);
        put_u16(&mut buffer, byte_order, screen.height_in_pixels);
        put_u16(&mut buffer, byte_order, (screen.width_in_pixels as u32 * 254 / 960) as u16);
        put_u16(&mut buffer, byte_order, (screen.height_in_pixels as u32 * 254 / 960) as u16);
        put_u16(&mut buffer, byte_order, 1); // min installed maps
        put_u16(&mut buffer, byte_order, 1); // max installed maps
        put_u32(&mut buffer, byte_order, screen.root_visual);
        buffer.push(0); // backing stores: never
        buffer.push(0); // save unders
        buffer.push(screen.root_depth);
        buffer.push(1); // allowed depths

        // Depth with a single TrueColor visual
        buffer.push(screen.root_depth);
        buffer.push(0);
        put_u16(&mut buffer, byte_order, 1);
        buffer.extend_from_slice(&[0u8; 4]);
        put_u32(&mut buffer, byte_order, screen.root_visual);
        buffer.push(4); // TrueColor
        buffer.push(8); // bits per rgb value
        put_u16(&mut buffer, byte_order, 256);
        put_u32(&mut buffer, byte_order, 0x00ff_0000);
        put_u32(&mut buffer, byte_order, 0x0000_ff00);
        put_u32(&mut buffer, byte_order, 0x0000_00ff);
        buffer.extend_from_slice(&[0u8; 4]);

        // Length in 4-byte units, excluding the first 8 bytes
        let length = ((buffer.len() - 8) / 4) as u16;
        byte_order.write_u16(&mut buffer[length_pos..length_pos + 2], length);

        buffer
    }

    pub fn write_to<W: Write>(&self, stream: &mut W, byte_order: ByteOrder) -> io::Result<()> {
        stream.write_all(&self.encode(byte_order))?;
        stream.flush()
    }
}

/// Setup reply refusing the connection
#[derive(Debug, Clone)]
pub struct SetupFailed {
    pub reason: String,
}

impl SetupFailed {
    pub fn encode(&self, byte_order: ByteOrder) -> Vec<u8> {
        let reason = &self.reason.as_bytes()[..self.reason.len().min(255)];
        let mut buffer = Vec::with_capacity(8 + padded_len(reason.len()));

        buffer.push(SetupStatus::Failed as u8);
        buffer.push(reason.len() as u8);
        put_u16(&mut buffer, byte_order, PROTOCOL_MAJOR_VERSION);
        put_u16(&mut buffer, byte_order, PROTOCOL_MINOR_VERSION);
        put_u16(&mut buffer, byte_order, (padded_len(reason.len()) / 4) as u16);
        buffer.extend_from_slice(reason);
        buffer.resize(8 + padded_len(reason.len()), 0);

        buffer
    }
}
