//! Telescopes the host can show on the sky and send to a target.
//!
//! The host drives every telescope from its own readiness loop: once per
//! iteration it asks [`Telescope::prepare_readiness`] what to wait for, waits
//! (select/poll) on the union of all requests, and hands the outcome back via
//! [`Telescope::handle_readiness`]. Nothing here blocks or spawns threads.

mod dummy;
mod endpoint;
mod error;
mod factory;
pub mod history;
mod tcp;

use std::time::Duration;

pub use dummy::DummyTelescope;
pub use endpoint::{Endpoint, MAX_LATENCY};
pub use error::TelescopeError;
pub use factory::{create, TelescopeKind};
pub use history::{PositionHistory, PositionSample, HISTORY_CAPACITY};
pub use tcp::TcpTelescope;

use crate::clock::Micros;
use crate::coords::Vec3;
use crate::link::Descriptor;

/// What a telescope wants the host to wait for during the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessRequest {
    pub descriptor: Option<Descriptor>,
    pub want_read: bool,
    pub want_write: bool,
    /// Latest point at which the host should call back even if nothing
    /// became ready.
    pub timeout_hint: Option<Duration>,
}

impl ReadinessRequest {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Readiness observed by the host for a telescope's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessResult {
    pub readable: bool,
    pub writable: bool,
}

pub trait Telescope {
    fn name(&self) -> &str;

    fn is_connected(&self) -> bool;

    fn has_known_position(&self) -> bool;

    /// J2000 direction the telescope points at, as of `now`.
    fn current_position(&self, now: Micros) -> Option<Vec3>;

    fn prepare_readiness(&mut self, now: Micros) -> ReadinessRequest;

    fn handle_readiness(&mut self, ready: ReadinessResult);

    /// Fire-and-forget slew request; dropped when it cannot be sent.
    fn go_to(&mut self, target: Vec3);
}

/// Every telescope kind a definition string can produce.
pub enum AnyTelescope {
    Dummy(DummyTelescope),
    Tcp(TcpTelescope),
}

impl AnyTelescope {
    pub fn kind(&self) -> TelescopeKind {
        match self {
            AnyTelescope::Dummy(_) => TelescopeKind::Dummy,
            AnyTelescope::Tcp(_) => TelescopeKind::Tcp,
        }
    }

    fn inner(&self) -> &dyn Telescope {
        match self {
            AnyTelescope::Dummy(t) => t,
            AnyTelescope::Tcp(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Telescope {
        match self {
            AnyTelescope::Dummy(t) => t,
            AnyTelescope::Tcp(t) => t,
        }
    }
}

impl Telescope for AnyTelescope {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn is_connected(&self) -> bool {
        self.inner().is_connected()
    }

    fn has_known_position(&self) -> bool {
        self.inner().has_known_position()
    }

    fn current_position(&self, now: Micros) -> Option<Vec3> {
        self.inner().current_position(now)
    }

    fn prepare_readiness(&mut self, now: Micros) -> ReadinessRequest {
        self.inner_mut().prepare_readiness(now)
    }

    fn handle_readiness(&mut self, ready: ReadinessResult) {
        self.inner_mut().handle_readiness(ready)
    }

    fn go_to(&mut self, target: Vec3) {
        self.inner_mut().go_to(target)
    }
}
