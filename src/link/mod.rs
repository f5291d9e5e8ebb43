mod connection;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod frame_stream;
pub mod socket;

pub use connection::{
    ConnectionManager, ConnectionState, CONNECTED_RETRY_BACKOFF, CONNECT_TIMEOUT,
    CONNECT_TIMEOUT_BACKOFF,
};
pub use error::LinkError;
pub use frame_stream::{FrameStream, InboundFrame, BUFFER_CAPACITY};
pub use socket::{Connector, Descriptor, Socket, TcpConnector};
