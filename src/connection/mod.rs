//! Connection layer
//!
//! Client streams arrive over TCP or Unix sockets. A [`Connection`] is split
//! with [`Connection::try_clone`] into a reading half, owned by the
//! connection's thread, and a writing half, owned by its [`Client`].
//!
//! [`Client`]: crate::server::Client

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};

#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};

/// A client stream
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    /// Second handle to the same socket
    pub fn try_clone(&self) -> io::Result<Self> {
        match self {
            Connection::Tcp(stream) => stream.try_clone().map(Connection::Tcp),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.try_clone().map(Connection::Unix),
        }
    }

    /// Human-readable peer address for logs
    pub fn peer(&self) -> String {
        match self {
            Connection::Tcp(stream) => stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "tcp".to_string()),
            #[cfg(unix)]
            Connection::Unix(_) => "unix".to_string(),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
        }
    }
}

/// Connection listener
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Listener {
    /// Listen on TCP port 6000 + `display`
    pub fn tcp(display: u16) -> io::Result<Self> {
        let addr = format!("0.0.0.0:{}", 6000 + display as u32);
        let listener = TcpListener::bind(&addr)?;
        log::info!("Listening on {}", addr);
        Ok(Listener::Tcp(listener))
    }

    /// Listen on the display's socket under /tmp/.X11-unix
    #[cfg(unix)]
    pub fn unix(display: u16) -> io::Result<Self> {
        let dir = "/tmp/.X11-unix";
        std::fs::create_dir_all(dir)?;
        let path = format!("{}/X{}", dir, display);
        // A stale socket from an earlier run would make bind fail.
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path)?;
        log::info!("Listening on {}", path);
        Ok(Listener::Unix(listener))
    }

    /// Accept a new connection
    pub fn accept(&self) -> io::Result<Connection> {
        match self {
            Listener::Tcp(listener) => {
                let (stream, _) = listener.accept()?;
                stream.set_nodelay(true)?;
                Ok(Connection::Tcp(stream))
            }
            #[cfg(unix)]
            Listener::Unix(listener) => {
                let (stream, _) = listener.accept()?;
                Ok(Connection::Unix(stream))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tcp_connection_clone_shares_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"ping").unwrap();
            let mut reply = [0u8; 4];
            stream.read_exact(&mut reply).unwrap();
            reply
        });

        let (stream, _) = listener.accept().unwrap();
        let mut reader = Connection::Tcp(stream);
        let mut writer = reader.try_clone().unwrap();

        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        writer.write_all(b"pong").unwrap();

        assert_eq!(&peer.join().unwrap(), b"pong");
    }
}
