//! Core X11 server implementation
//!
//! [`Server`] ties together the shared resource tables, the atom table, the
//! request dispatcher and the set of connected clients. It is shared by
//! every connection thread behind an `Arc`; each table inside carries its own
//! lock, so there is no server-wide lock.

pub mod atoms;
pub mod client;
pub mod dispatcher;
pub mod events;
pub mod keyboard;
pub mod listener;
mod requests;

pub use atoms::AtomTable;
pub use client::Client;
pub use dispatcher::{DispatchError, HandlerResult, RequestContext, RequestDispatcher};
pub use events::EventChannel;
pub use keyboard::Keyboard;

use crate::protocol::*;
use crate::resources::{
    DrawableManager, GraphicsContextManager, IdSpace, ResourceKind, CLIENT_ID_BITS,
    RESOURCE_ID_MASK,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

/// Root window id; lives in the server's own id range
pub const ROOT_WINDOW_ID: u32 = 0x0000_0100;
const DEFAULT_COLORMAP_ID: u32 = 0x0000_0020;
const ROOT_VISUAL_ID: u32 = 0x0000_0021;

/// Highest client index; index 0 is the server itself
const MAX_CLIENTS: u32 = (1 << (32 - CLIENT_ID_BITS)) - 1;

/// Server settings fixed at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub screen_width: u16,
    pub screen_height: u16,
    pub root_depth: u8,
    /// Resource id mask handed to every client
    pub resource_id_mask: u32,
    pub vendor: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            screen_width: 1024,
            screen_height: 768,
            root_depth: 24,
            resource_id_mask: RESOURCE_ID_MASK,
            vendor: "xdispatch".to_string(),
        }
    }
}

/// Main X11 server state
pub struct Server {
    config: ServerConfig,
    root_window: Window,
    drawables: DrawableManager,
    graphics_contexts: GraphicsContextManager,
    atoms: AtomTable,
    keyboard: Keyboard,
    events: EventChannel,
    dispatcher: RequestDispatcher,
    ids: Arc<IdSpace>,
    clients: RwLock<HashMap<u32, Arc<Client>>>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let ids = Arc::new(IdSpace::new());
        let drawables = DrawableManager::new(Arc::clone(&ids));
        let root_window = Window::new(ROOT_WINDOW_ID);
        // The id space is empty, so the root id cannot collide.
        drawables.register_window(
            0,
            root_window,
            config.screen_width,
            config.screen_height,
            config.root_depth,
        );

        log::info!(
            "Screen: {}x{}x{}, root window 0x{:x}",
            config.screen_width,
            config.screen_height,
            config.root_depth,
            ROOT_WINDOW_ID
        );

        Server {
            graphics_contexts: GraphicsContextManager::new(Arc::clone(&ids)),
            drawables,
            atoms: AtomTable::new(),
            keyboard: Keyboard::us(),
            events: EventChannel::new(),
            dispatcher: RequestDispatcher::new(),
            root_window,
            ids,
            clients: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn root_window(&self) -> Window {
        self.root_window
    }

    pub fn drawables(&self) -> &DrawableManager {
        &self.drawables
    }

    pub fn graphics_contexts(&self) -> &GraphicsContextManager {
        &self.graphics_contexts
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Register a new client writing to `output`.
    ///
    /// Returns `None` when every client id range is taken.
    pub fn connect_client(
        &self,
        byte_order: ByteOrder,
        output: Box<dyn Write + Send>,
    ) -> Option<Arc<Client>> {
        let mut clients = self.clients.write();
        let index = (1..=MAX_CLIENTS).find(|index| !clients.contains_key(index))?;
        let client = Arc::new(Client::new(
            index,
            byte_order,
            output,
            Arc::clone(&self.ids),
        ));
        clients.insert(index, Arc::clone(&client));
        log::info!("Client {} connected", index);
        Some(client)
    }

    pub fn client(&self, client_id: u32) -> Option<Arc<Client>> {
        self.clients.read().get(&client_id).cloned()
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Remove a client and free every resource it still owns
    pub fn disconnect_client(&self, client: &Client) {
        let owned = client.take_owned_resources();
        let count = owned.len();
        for (kind, id) in owned {
            match kind {
                ResourceKind::GraphicsContext => self
                    .graphics_contexts
                    .release_graphics_context(client.client_id, id),
                ResourceKind::Pixmap => self.drawables.release_pixmap(client.client_id, id),
            }
        }
        self.clients.write().remove(&client.client_id);
        log::info!(
            "Client {} disconnected, released {} resources",
            client.client_id,
            count
        );
    }

    /// The setup reply for `client`
    pub fn setup_success(&self, client: &Client) -> SetupSuccess {
        let range = client.id_range();
        SetupSuccess {
            resource_id_base: range.base,
            resource_id_mask: self.config.resource_id_mask,
            vendor: self.config.vendor.clone(),
            screen: Screen {
                root: self.root_window,
                default_colormap: DEFAULT_COLORMAP_ID,
                root_visual: ROOT_VISUAL_ID,
                width_in_pixels: self.config.screen_width,
                height_in_pixels: self.config.screen_height,
                root_depth: self.config.root_depth,
            },
        }
    }

    /// Serve requests from `stream` until it closes or breaks
    pub fn serve<R: Read>(&self, client: &Client, stream: &mut R) -> Result<(), DispatchError> {
        self.dispatcher.run(self, client, stream)
    }

    /// Deliver `event` to a connected client
    pub fn send_event(&self, client_id: u32, event: &Event) -> std::io::Result<bool> {
        match self.client(client_id) {
            Some(client) => self.events.send_event(&client, event).map(|_| true),
            None => Ok(false),
        }
    }
}
