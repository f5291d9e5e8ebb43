use thiserror::Error;

/// Runtime failures on a telescope link. These never reach the host: the
/// client hangs up and reconnects, keeping the last one for diagnostics.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),
    #[error("server has closed the connection")]
    Closed,
    #[error("connect timeout")]
    ConnectTimeout,
    #[error("bad packet size: {length}")]
    Framing { length: usize },
    #[error("type 0: bad packet size: {length}")]
    BadReport { length: usize },
    #[error("communication is too slow, outbound buffer is full")]
    SendBackpressure,
}

impl LinkError {
    /// Byte alignment on the stream is lost; only a fresh connection recovers.
    pub fn is_framing(&self) -> bool {
        matches!(self, LinkError::Framing { .. } | LinkError::BadReport { .. })
    }
}
