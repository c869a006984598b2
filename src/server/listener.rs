//! Server listener and connection handling
//!
//! Each accepted connection gets its own thread, which performs the setup
//! handshake and then runs the request loop until the client goes away.

use std::error::Error;
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use super::{Client, Server};
use crate::connection::{Connection, Listener};
use crate::protocol::setup::{SetupFailed, SetupRequest};

/// Accept connections on `listener` forever, one thread per client
pub fn run_listener(
    listener: Listener,
    server: Arc<Server>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    loop {
        match listener.accept() {
            Ok(connection) => {
                let server = Arc::clone(&server);
                thread::spawn(move || {
                    if let Err(e) = handle_client(connection, &server) {
                        log::error!("Client error: {}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Connection failed: {}", e);
            }
        }
    }
}

/// Start the TCP listener for `display` on a background thread
pub fn start_tcp_listener(
    display: u16,
    server: Arc<Server>,
) -> Result<thread::JoinHandle<()>, Box<dyn Error + Send + Sync>> {
    let listener = Listener::tcp(display)?;
    Ok(spawn_listener(listener, server))
}

/// Start the Unix socket listener for `display` on a background thread
#[cfg(unix)]
pub fn start_unix_listener(
    display: u16,
    server: Arc<Server>,
) -> Result<thread::JoinHandle<()>, Box<dyn Error + Send + Sync>> {
    let listener = Listener::unix(display)?;
    Ok(spawn_listener(listener, server))
}

fn spawn_listener(listener: Listener, server: Arc<Server>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = run_listener(listener, server) {
            log::error!("Listener error: {}", e);
        }
    })
}

fn handle_client(
    connection: Connection,
    server: &Server,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    log::info!("New client connection from {}", connection.peer());
    let writer = connection.try_clone()?;
    handle_connection(server, connection, Box::new(writer))
}

/// Run the handshake and request loop over an already split stream
pub fn handle_connection<R: Read>(
    server: &Server,
    mut reader: R,
    mut writer: Box<dyn Write + Send>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let setup_request = SetupRequest::parse(&mut reader)?;
    log::debug!("Setup request: {:?}", setup_request);
    if !setup_request.authorization_protocol_name.is_empty() {
        log::debug!(
            "Ignoring authorization protocol {:?}",
            setup_request.authorization_protocol_name
        );
    }
    let byte_order = setup_request.byte_order;

    if setup_request.protocol_major_version != crate::protocol::PROTOCOL_MAJOR_VERSION {
        let failed = SetupFailed {
            reason: format!(
                "unsupported protocol version {}",
                setup_request.protocol_major_version
            ),
        };
        writer.write_all(&failed.encode(byte_order))?;
        writer.flush()?;
        return Ok(());
    }

    let client = match server.connect_client(byte_order, writer) {
        Some(client) => client,
        None => {
            log::warn!("Refusing connection: no free client slots");
            return Ok(());
        }
    };

    let result = serve_client(server, &client, &mut reader);
    server.disconnect_client(&client);
    result
}

fn serve_client<R: Read>(
    server: &Server,
    client: &Client,
    reader: &mut R,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let setup = server.setup_success(client);
    client.write_frame(&setup.encode(client.byte_order()))?;
    log::info!("Client {} completed setup", client.client_id);

    server.serve(client, reader)?;
    Ok(())
}
