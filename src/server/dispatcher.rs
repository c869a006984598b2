//! Request dispatch
//!
//! The dispatcher reads one request at a time from a client stream, advances
//! the client's sequence number, and routes the request to the handler
//! registered for its opcode. Handlers report recoverable problems as a
//! [`RequestError`], which becomes an error frame on the same connection;
//! a stream whose framing cannot be trusted ends the connection instead.

use super::client::Client;
use super::requests;
use super::Server;
use crate::protocol::*;
use std::collections::HashMap;
use std::io::{self, Read};
use thiserror::Error;

/// What a handler produces: an optional reply frame
pub type HandlerResult = RequestResult<Option<Vec<u8>>>;

/// A request handler. The reader is positioned at the start of the payload.
pub type RequestHandler = fn(&RequestContext<'_>, &mut RequestReader<'_>) -> HandlerResult;

/// Errors that end a client connection
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("framing violation: {0}")]
    Framing(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Everything a handler may consult while serving one request
pub struct RequestContext<'a> {
    pub server: &'a Server,
    pub client: &'a Client,
    pub header: RequestHeader,
    /// Sequence number assigned to this request
    pub sequence: u16,
}

impl RequestContext<'_> {
    pub fn encoder(&self) -> ProtocolEncoder {
        ProtocolEncoder::new(self.client.byte_order())
    }

    /// Fail with IDChoice unless the client may allocate `id`
    pub fn check_new_id(&self, id: XID) -> RequestResult<()> {
        if self.client.is_valid_resource_id(id) {
            Ok(())
        } else {
            Err(RequestError::bad_id_choice(id))
        }
    }
}

/// Routes decoded requests to handlers by major opcode
pub struct RequestDispatcher {
    handlers: HashMap<u8, RequestHandler>,
}

impl Default for RequestDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDispatcher {
    /// Dispatcher with every core request this server implements
    pub fn new() -> Self {
        let mut dispatcher = RequestDispatcher::empty();
        requests::register_all(&mut dispatcher);
        dispatcher
    }

    /// Dispatcher with no handlers
    pub fn empty() -> Self {
        RequestDispatcher {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, opcode: RequestOpcode, handler: RequestHandler) {
        self.handlers.insert(opcode as u8, handler);
    }

    pub fn handles(&self, opcode: u8) -> bool {
        self.handlers.contains_key(&opcode)
    }

    /// Serve requests until the client closes the stream cleanly
    pub fn run<R: Read>(
        &self,
        server: &Server,
        client: &Client,
        stream: &mut R,
    ) -> Result<(), DispatchError> {
        while self.dispatch_one(server, client, stream)? {}
        Ok(())
    }

    /// Read and process a single request.
    ///
    /// Returns `Ok(false)` when the stream ends on a request boundary.
    pub fn dispatch_one<R: Read>(
        &self,
        server: &Server,
        client: &Client,
        stream: &mut R,
    ) -> Result<bool, DispatchError> {
        let mut header_bytes = [0u8; REQUEST_HEADER_SIZE];
        if !read_header(stream, &mut header_bytes)? {
            return Ok(false);
        }

        let header = RequestHeader::parse(&header_bytes, client.byte_order());
        let payload_size = header.payload_size().ok_or_else(|| {
            DispatchError::Framing(format!(
                "opcode {} declares length {}",
                header.opcode, header.length
            ))
        })?;

        let mut payload = vec![0u8; payload_size];
        stream.read_exact(&mut payload).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => DispatchError::Framing(format!(
                "stream ended inside opcode {} ({} bytes declared)",
                header.opcode,
                header.size()
            )),
            _ => DispatchError::Io(e),
        })?;

        let sequence = client.increment_sequence();
        log::debug!(
            "Client {}: opcode {} ({} bytes, seq {})",
            client.client_id,
            header.opcode,
            header.size(),
            sequence
        );

        let context = RequestContext {
            server,
            client,
            header,
            sequence,
        };
        let mut reader = RequestReader::new(&payload, client.byte_order());

        let result = match self.handlers.get(&header.opcode) {
            Some(handler) => handler(&context, &mut reader),
            None => {
                log::debug!("Unhandled opcode: {}", header.opcode);
                Err(RequestError::bad_request(header.opcode))
            }
        };

        match result {
            Ok(Some(reply)) => client.write_frame(&reply)?,
            Ok(None) => {}
            Err(error) => {
                log::warn!(
                    "Client {}: {} failed: {}",
                    client.client_id,
                    opcode_name(header.opcode),
                    error
                );
                client.send_error(error, 0, header.opcode)?;
            }
        }

        Ok(true)
    }
}

fn opcode_name(opcode: u8) -> &'static str {
    RequestOpcode::from_u8(opcode).map_or("unknown request", |op| op.as_str())
}

/// Fill `buf` from `stream`. Returns false if the stream was already at EOF.
fn read_header<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<bool, DispatchError> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(DispatchError::Framing(format!(
                    "stream ended after {} header bytes",
                    filled
                )))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}
