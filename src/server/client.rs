//! Client session management
//!
//! A [`Client`] is shared between the thread serving its requests and any
//! thread producing events for it, so all of its state is behind atomics or
//! locks. The output lock is held for exactly one frame at a time.

use crate::protocol::{ByteOrder, RequestError, X11Error, XID};
use crate::resources::{ClientIdRange, IdSpace, ResourceKind};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Represents a connected X11 client
pub struct Client {
    /// Index of this client; also selects its resource id range
    pub client_id: u32,

    id_range: ClientIdRange,

    /// Byte order for this client (from setup request)
    byte_order: ByteOrder,

    /// Sequence number of the last request read
    sequence: AtomicU16,

    output: Mutex<Box<dyn Write + Send>>,

    /// Resources this client created and has not freed
    owned: Mutex<HashSet<(ResourceKind, XID)>>,

    ids: Arc<IdSpace>,
}

impl Client {
    pub fn new(
        client_id: u32,
        byte_order: ByteOrder,
        output: Box<dyn Write + Send>,
        ids: Arc<IdSpace>,
    ) -> Self {
        Client {
            client_id,
            id_range: ClientIdRange::for_client(client_id),
            byte_order,
            sequence: AtomicU16::new(0),
            output: Mutex::new(output),
            owned: Mutex::new(HashSet::new()),
            ids,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn id_range(&self) -> ClientIdRange {
        self.id_range
    }

    pub fn sequence_number(&self) -> u16 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Advance the sequence number after a request is read, returning the new value
    pub fn increment_sequence(&self) -> u16 {
        self.sequence.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// True if this client may allocate `id` right now
    pub fn is_valid_resource_id(&self, id: XID) -> bool {
        self.ids.is_valid_id(self.id_range, id)
    }

    pub fn register_as_owner_of_resource(&self, kind: ResourceKind, id: XID) {
        self.owned.lock().insert((kind, id));
    }

    pub fn forget_resource(&self, kind: ResourceKind, id: XID) {
        self.owned.lock().remove(&(kind, id));
    }

    /// Drain the set of owned resources for teardown
    pub fn take_owned_resources(&self) -> Vec<(ResourceKind, XID)> {
        self.owned.lock().drain().collect()
    }

    /// Write one frame built from the sequence number current at send time.
    ///
    /// The output lock is held while the frame is built and written, so
    /// frames never interleave and never carry a stale sequence number.
    pub fn write_frame_with<F, B>(&self, build: F) -> io::Result<()>
    where
        F: FnOnce(u16) -> B,
        B: AsRef<[u8]>,
    {
        let mut output = self.output.lock();
        let frame = build(self.sequence_number());
        output.write_all(frame.as_ref())?;
        output.flush()
    }

    /// Write pre-encoded bytes as one frame
    pub fn write_frame(&self, frame: &[u8]) -> io::Result<()> {
        self.write_frame_with(|_| frame)
    }

    /// Send a core protocol error for the current request
    pub fn send_error(
        &self,
        error: RequestError,
        minor_opcode: u16,
        major_opcode: u8,
    ) -> io::Result<()> {
        let byte_order = self.byte_order;
        self.write_frame_with(|sequence| {
            X11Error::from_request_error(error, sequence, minor_opcode, major_opcode)
                .encode(byte_order)
        })
    }
}
