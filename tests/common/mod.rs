//! Helpers for driving a server over in-memory streams

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use xdispatch::protocol::{ByteOrder, EVENT_FRAME_SIZE};
use xdispatch::server::{Client, Server, ServerConfig};

pub const ROOT: u32 = xdispatch::server::ROOT_WINDOW_ID;

/// Output half of a fake connection
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A server with one connected client
pub struct Harness {
    pub server: Server,
    pub client: Arc<Client>,
    pub output: SharedBuffer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::LSBFirst)
    }

    pub fn with_byte_order(byte_order: ByteOrder) -> Self {
        let server = Server::new(ServerConfig::default());
        let output = SharedBuffer::default();
        let client = server
            .connect_client(byte_order, Box::new(output.clone()))
            .unwrap();
        Harness {
            server,
            client,
            output,
        }
    }

    /// Feed raw request bytes through the dispatcher
    pub fn send(&self, bytes: &[u8]) -> Result<(), xdispatch::server::DispatchError> {
        self.server
            .serve(&self.client, &mut Cursor::new(bytes.to_vec()))
    }

    /// Feed requests that must not break the connection
    pub fn run(&self, requests: &[Vec<u8>]) {
        self.send(&requests.concat()).unwrap();
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        split_frames(&self.output.take(), self.client.byte_order())
    }
}

/// Split server output into error, reply and event frames
pub fn split_frames(bytes: &[u8], byte_order: ByteOrder) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let mut size = EVENT_FRAME_SIZE;
        if bytes[offset] == 1 {
            size += byte_order.read_u32(&bytes[offset + 4..offset + 8]) as usize * 4;
        }
        frames.push(bytes[offset..offset + size].to_vec());
        offset += size;
    }
    frames
}

/// Build a request in `byte_order`, padding the payload to 4 bytes
pub fn request_in(byte_order: ByteOrder, opcode: u8, detail: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![opcode, detail, 0, 0];
    bytes.extend_from_slice(payload);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    let length = (bytes.len() / 4) as u16;
    byte_order.write_u16(&mut bytes[2..4], length);
    bytes
}

pub fn request(opcode: u8, detail: u8, payload: &[u8]) -> Vec<u8> {
    request_in(ByteOrder::LSBFirst, opcode, detail, payload)
}

/// Little-endian CARD32 list
pub fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn create_gc(cid: u32, drawable: u32, mask: u32, values: &[u32]) -> Vec<u8> {
    let mut payload = words(&[cid, drawable, mask]);
    payload.extend(words(values));
    request(55, 0, &payload)
}

pub fn change_gc(gc: u32, mask: u32, values: &[u32]) -> Vec<u8> {
    let mut payload = words(&[gc, mask]);
    payload.extend(words(values));
    request(56, 0, &payload)
}

pub fn copy_gc(src: u32, dst: u32, mask: u32) -> Vec<u8> {
    request(57, 0, &words(&[src, dst, mask]))
}

pub fn free_gc(gc: u32) -> Vec<u8> {
    request(60, 0, &words(&[gc]))
}

pub fn create_pixmap(depth: u8, pid: u32, drawable: u32, width: u16, height: u16) -> Vec<u8> {
    let mut payload = words(&[pid, drawable]);
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    request(53, depth, &payload)
}

pub fn free_pixmap(pid: u32) -> Vec<u8> {
    request(54, 0, &words(&[pid]))
}

pub fn no_operation() -> Vec<u8> {
    request(127, 0, &[])
}

/// Request carrying a length-prefixed name (InternAtom, QueryExtension)
pub fn named(opcode: u8, detail: u8, name: &str) -> Vec<u8> {
    named_bytes(opcode, detail, name.as_bytes())
}

pub fn named_bytes(opcode: u8, detail: u8, name: &[u8]) -> Vec<u8> {
    let mut payload = (name.len() as u16).to_le_bytes().to_vec();
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(name);
    request(opcode, detail, &payload)
}
