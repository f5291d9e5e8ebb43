use super::{ReadinessRequest, ReadinessResult, Telescope};
use crate::clock::Micros;
use crate::coords::Vec3;

/// Weight of the current position when blending towards the target.
const DAMPING: f64 = 31.0;

/// Local stand-in for a mount: drifts towards the last goto target, one
/// step per readiness tick.
#[derive(Debug, Clone)]
pub struct DummyTelescope {
    name: String,
    position: Vec3,
    desired: Vec3,
}

impl DummyTelescope {
    pub fn new(name: impl Into<String>) -> Self {
        let start = Vec3::new(1.0, 0.0, 0.0);
        Self {
            name: name.into(),
            position: start,
            desired: start,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn step(&mut self) {
        self.position = (self.position * DAMPING + self.desired)
            .normalized()
            .unwrap_or(self.desired);
    }
}

impl Telescope for DummyTelescope {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn has_known_position(&self) -> bool {
        true
    }

    fn current_position(&self, _now: Micros) -> Option<Vec3> {
        Some(self.position)
    }

    fn prepare_readiness(&mut self, _now: Micros) -> ReadinessRequest {
        self.step();
        ReadinessRequest::idle()
    }

    fn handle_readiness(&mut self, _ready: ReadinessResult) {}

    fn go_to(&mut self, target: Vec3) {
        match target.normalized() {
            Some(target) => self.desired = target,
            None => log::debug!("TelescopeDummy({}): ignoring goto to zero vector", self.name),
        }
    }
}
