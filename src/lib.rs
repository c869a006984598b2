//! xdispatch - request dispatch and resource core of an X11 server
//!
//! The library decodes X11 client requests, keeps the shared resource tables
//! (graphics contexts, pixmaps, atoms) and writes replies, errors and input
//! events back to clients. The `xdispatch` binary wraps it in TCP and Unix
//! socket listeners.

pub mod connection;
pub mod protocol;
pub mod resources;
pub mod server;

pub use protocol::{Atom, Drawable, GContext, Pixmap, Window};
pub use server::{Server, ServerConfig};

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
