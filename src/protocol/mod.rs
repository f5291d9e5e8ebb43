//! Binary protocol spoken with the mount server.
//!
//! Every frame starts with a 4 byte header: total length (`u16`) and frame
//! type (`u16`), both little-endian. Type 0 is used in both directions with a
//! different payload per direction: the client sends [`GotoCommand`]s and the
//! server answers with [`PositionReport`]s.

pub mod angle;
pub mod codec;

pub use angle::{RaDec, QUANTUM_RAD};
pub use codec::{CodecError, FrameHeader, GotoCommand, PositionReport};
