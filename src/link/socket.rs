//! Non-blocking stream socket capability.
//!
//! The connection state machine and the framing code only see [`Connector`]
//! and [`Socket`]; the production backend is [`mio::net::TcpStream`], which
//! picks the platform socket API at build time.

use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddrV4;

/// Handle the host registers with its readiness multiplexer.
#[cfg(unix)]
pub type Descriptor = std::os::fd::RawFd;
#[cfg(windows)]
pub type Descriptor = std::os::windows::io::RawSocket;

/// A connected (or connecting) non-blocking stream.
///
/// `read`/`write` report `WouldBlock` instead of blocking and `Ok(0)` from
/// `read` means the peer closed the stream. Dropping the socket closes it.
pub trait Socket: Read + Write {
    /// Called once the socket turned writable while connecting.
    /// `Ok(true)` when established, `Ok(false)` on a spurious wakeup.
    fn finish_connect(&mut self) -> io::Result<bool>;

    fn descriptor(&self) -> Descriptor;
}

pub trait Connector {
    type Socket: Socket;

    /// Starts a non-blocking connect. Completion is signalled by writability.
    fn connect(&mut self, addr: SocketAddrV4) -> io::Result<Self::Socket>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Socket = mio::net::TcpStream;

    fn connect(&mut self, addr: SocketAddrV4) -> io::Result<Self::Socket> {
        mio::net::TcpStream::connect(addr.into())
    }
}

impl Socket for mio::net::TcpStream {
    fn finish_connect(&mut self) -> io::Result<bool> {
        if let Some(err) = self.take_error()? {
            return Err(err);
        }
        match self.peer_addr() {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[cfg(unix)]
    fn descriptor(&self) -> Descriptor {
        use std::os::fd::AsRawFd;
        self.as_raw_fd()
    }

    #[cfg(windows)]
    fn descriptor(&self) -> Descriptor {
        use std::os::windows::io::AsRawSocket;
        self.as_raw_socket()
    }
}

/// `WouldBlock` and `Interrupted` leave the link untouched.
pub(crate) fn is_transient(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}
