//! Live pointing positions of motorized telescope mounts.
//!
//! A mount is reached through a telescope server over TCP; positions it
//! reports are kept in a short history and read back with a configurable
//! delay, interpolating between reports. Everything is driven by the host's
//! own readiness loop, see [`telescope::Telescope`].

pub mod clock;
pub mod config;
pub mod coords;
pub mod link;
pub mod protocol;
pub mod report;
pub mod telescope;

pub use clock::{Clock, Micros, SystemClock};
pub use coords::Vec3;
pub use telescope::{
    create, AnyTelescope, ReadinessRequest, ReadinessResult, Telescope, TelescopeError,
};
