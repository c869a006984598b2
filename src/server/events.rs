//! Event delivery
//!
//! Events are encoded inside the destination client's output lock, so the
//! sequence number they carry is the one current when the bytes go out.

use super::client::Client;
use crate::protocol::{Event, RawEvent, EVENT_FRAME_SIZE};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

/// Writes event frames to client connections
#[derive(Debug, Default)]
pub struct EventChannel {
    sent: AtomicU64,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `event` and write it to `client` as one frame.
    ///
    /// Write failures are returned to the caller; the connection's reader
    /// thread is what tears a broken connection down.
    pub fn send_event(&self, client: &Client, event: &Event) -> io::Result<()> {
        let byte_order = client.byte_order();
        let code = event.code();
        client.write_frame_with(|sequence| event.encode(sequence, byte_order))?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        log::trace!("Sent event {} to client {}", code, client.client_id);
        Ok(())
    }

    /// Write an already encoded frame verbatim
    pub fn send_raw_event(&self, client: &Client, data: [u8; EVENT_FRAME_SIZE]) -> io::Result<()> {
        self.send_event(client, &Event::Raw(RawEvent::new(data)))
    }

    /// Number of events written so far
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}
