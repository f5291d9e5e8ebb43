use std::io::{Read, Write};

use bytes::{Buf, BytesMut};

use super::error::LinkError;
use super::socket::is_transient;
use crate::protocol::codec::{FrameHeader, HEADER_LEN, POSITION_REPORT_LEN, TYPE_POSITION};
use crate::protocol::PositionReport;

/// Bound on each direction's buffer and on the largest acceptable frame.
pub const BUFFER_CAPACITY: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Position(PositionReport),
    /// Well-formed frame of a type this client does not know; already consumed.
    Unknown { kind: u16, length: usize },
}

/// Reassembles length-prefixed frames from a byte stream and buffers
/// outgoing frames until the socket accepts them.
#[derive(Debug)]
pub struct FrameStream {
    inbound: BytesMut,
    outbound: BytesMut,
}

impl Default for FrameStream {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStream {
    pub fn new() -> Self {
        Self {
            inbound: BytesMut::with_capacity(BUFFER_CAPACITY),
            outbound: BytesMut::with_capacity(BUFFER_CAPACITY),
        }
    }

    /// Drops buffered and partially assembled data in both directions.
    pub fn clear(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }

    pub fn buffered_input(&self) -> usize {
        self.inbound.len()
    }

    pub fn pending_output(&self) -> usize {
        self.outbound.len()
    }

    pub fn has_pending_output(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Appends a whole frame to the outbound buffer, or sheds it when the
    /// buffer would reach `BUFFER_CAPACITY`.
    pub fn queue(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        if self.outbound.len() + frame.len() >= BUFFER_CAPACITY {
            return Err(LinkError::SendBackpressure);
        }
        self.outbound.extend_from_slice(frame);
        Ok(())
    }

    /// Writes as much buffered output as the socket takes, returning the
    /// number of bytes sent. The remainder stays queued.
    pub fn flush<W: Write>(&mut self, socket: &mut W) -> Result<usize, LinkError> {
        if self.outbound.is_empty() {
            return Ok(0);
        }
        match socket.write(&self.outbound) {
            Ok(n) => {
                self.outbound.advance(n);
                Ok(n)
            }
            Err(e) if is_transient(&e) => Ok(0),
            Err(e) => Err(LinkError::Socket(e)),
        }
    }

    /// Performs one read and returns every frame completed by it.
    pub fn receive<R: Read>(&mut self, socket: &mut R) -> Result<Vec<InboundFrame>, LinkError> {
        let mut chunk = [0u8; BUFFER_CAPACITY];
        let room = BUFFER_CAPACITY - self.inbound.len();
        match socket.read(&mut chunk[..room]) {
            Ok(0) => Err(LinkError::Closed),
            Ok(n) => self.ingest(&chunk[..n]),
            Err(e) if is_transient(&e) => Ok(Vec::new()),
            Err(e) => Err(LinkError::Socket(e)),
        }
    }

    /// Appends received bytes and parses complete frames off the front.
    ///
    /// A declared length outside `[4, BUFFER_CAPACITY]` means the stream can
    /// no longer be trusted to be aligned on a frame boundary.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<Vec<InboundFrame>, LinkError> {
        self.inbound.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(length) = FrameHeader::declared_length(&self.inbound) {
            if !(HEADER_LEN..=BUFFER_CAPACITY).contains(&length) {
                return Err(LinkError::Framing { length });
            }
            if length > self.inbound.len() {
                break;
            }
            let frame = self.inbound.split_to(length);
            let header = FrameHeader::parse(&frame).map_err(|_| LinkError::Framing { length })?;
            match header.kind {
                TYPE_POSITION => {
                    if length < POSITION_REPORT_LEN {
                        return Err(LinkError::BadReport { length });
                    }
                    let report = PositionReport::decode(&frame)
                        .map_err(|_| LinkError::BadReport { length })?;
                    frames.push(InboundFrame::Position(report));
                }
                kind => frames.push(InboundFrame::Unknown { kind, length }),
            }
        }
        Ok(frames)
    }
}
