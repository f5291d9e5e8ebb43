use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::angle::{decode_direction, encode_direction};
use crate::clock::Micros;
use crate::coords::Vec3;

pub const HEADER_LEN: usize = 4;
pub const GOTO_LEN: usize = 20;
pub const POSITION_REPORT_LEN: usize = 24;

/// Frame type shared by goto commands and position reports.
pub const TYPE_POSITION: u16 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("frame truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("unexpected frame type {0}")]
    UnexpectedType(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Total frame length, header included.
    pub length: u16,
    pub kind: u16,
}

impl FrameHeader {
    /// Reads the declared frame length, available as soon as two bytes are buffered.
    pub fn declared_length(buf: &[u8]) -> Option<usize> {
        match buf {
            [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi]) as usize),
            _ => None,
        }
    }

    pub fn parse(mut buf: &[u8]) -> Result<Self, CodecError> {
        ensure_len(buf, HEADER_LEN)?;
        Ok(Self {
            length: buf.get_u16_le(),
            kind: buf.get_u16_le(),
        })
    }

    fn put(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.length);
        buf.put_u16_le(self.kind);
    }
}

fn ensure_len(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.len() < needed {
        return Err(CodecError::Truncated {
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

/// Client to server: slew to the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotoCommand {
    pub client_micros: Micros,
    pub ra: u32,
    pub dec: i32,
}

impl GotoCommand {
    pub fn new(client_micros: Micros, target: &Vec3) -> Self {
        let (ra, dec) = encode_direction(target);
        Self {
            client_micros,
            ra,
            dec,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(GOTO_LEN);
        FrameHeader {
            length: GOTO_LEN as u16,
            kind: TYPE_POSITION,
        }
        .put(&mut buf);
        buf.put_i64_le(self.client_micros);
        buf.put_u32_le(self.ra);
        buf.put_i32_le(self.dec);
        buf.freeze()
    }

    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let header = FrameHeader::parse(frame)?;
        if header.kind != TYPE_POSITION {
            return Err(CodecError::UnexpectedType(header.kind));
        }
        ensure_len(frame, GOTO_LEN)?;
        let mut body = &frame[HEADER_LEN..];
        Ok(Self {
            client_micros: body.get_i64_le(),
            ra: body.get_u32_le(),
            dec: body.get_i32_le(),
        })
    }

    pub fn target(&self) -> Vec3 {
        decode_direction(self.ra, self.dec)
    }
}

/// Server to client: where the mount is pointing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionReport {
    pub server_micros: Micros,
    pub ra: u32,
    pub dec: i32,
    pub status: i32,
}

impl PositionReport {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(POSITION_REPORT_LEN);
        FrameHeader {
            length: POSITION_REPORT_LEN as u16,
            kind: TYPE_POSITION,
        }
        .put(&mut buf);
        buf.put_i64_le(self.server_micros);
        buf.put_u32_le(self.ra);
        buf.put_i32_le(self.dec);
        buf.put_i32_le(self.status);
        buf.freeze()
    }

    /// Decodes the first 24 bytes of `frame`; servers may append trailing
    /// bytes, which the declared length accounts for and which are ignored.
    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let header = FrameHeader::parse(frame)?;
        if header.kind != TYPE_POSITION {
            return Err(CodecError::UnexpectedType(header.kind));
        }
        ensure_len(frame, POSITION_REPORT_LEN)?;
        let mut body = &frame[HEADER_LEN..];
        Ok(Self {
            server_micros: body.get_i64_le(),
            ra: body.get_u32_le(),
            dec: body.get_i32_le(),
            status: body.get_i32_le(),
        })
    }

    pub fn direction(&self) -> Vec3 {
        decode_direction(self.ra, self.dec)
    }
}
