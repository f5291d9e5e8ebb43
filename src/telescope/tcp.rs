use std::time::Duration;

use super::endpoint::Endpoint;
use super::history::{PositionHistory, PositionSample};
use super::{ReadinessRequest, ReadinessResult, Telescope};
use crate::clock::{Clock, Micros, SystemClock};
use crate::coords::Vec3;
use crate::link::{
    ConnectionManager, ConnectionState, Connector, FrameStream, InboundFrame, LinkError,
    TcpConnector, CONNECTED_RETRY_BACKOFF,
};
use crate::protocol::{GotoCommand, PositionReport, RaDec};

/// Client for a telescope server speaking the binary position protocol.
pub struct TcpTelescope<C = SystemClock, N = TcpConnector>
where
    N: Connector,
{
    name: String,
    endpoint: Endpoint,
    clock: C,
    connection: ConnectionManager<N>,
    stream: FrameStream,
    history: PositionHistory,
    last_error: Option<LinkError>,
    /// Host time passed to the latest `prepare_readiness`; connection timing
    /// is measured on this timeline only.
    tick_micros: Micros,
}

impl TcpTelescope {
    pub fn new(name: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::with_parts(name, endpoint, SystemClock::new(), TcpConnector)
    }
}

impl<C: Clock, N: Connector> TcpTelescope<C, N> {
    pub fn with_parts(name: impl Into<String>, endpoint: Endpoint, clock: C, connector: N) -> Self {
        Self {
            name: name.into(),
            connection: ConnectionManager::new(endpoint.addr, connector),
            endpoint,
            tick_micros: clock.now_micros(),
            clock,
            stream: FrameStream::new(),
            history: PositionHistory::new(),
            last_error: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Most recent runtime failure, kept until replaced.
    pub fn last_error(&self) -> Option<&LinkError> {
        self.last_error.as_ref()
    }

    /// Closes the connection, drops all buffered data and known positions and
    /// lets the next tick reconnect right away. Safe to call in any state.
    ///
    /// Failures detected while connected, framing errors included, clear the
    /// same state but keep the reconnect backoff.
    pub fn hangup(&mut self) {
        self.connection.reset();
        self.forget();
    }

    fn forget(&mut self) {
        self.stream.clear();
        self.history.clear();
    }

    /// The connection manager already closed the socket; drop what depended on it.
    fn on_connect_error(&mut self, err: LinkError) {
        log::debug!("TelescopeTcp({}): {}", self.name, err);
        self.forget();
        self.last_error = Some(err);
    }

    /// An established connection failed; close it and back off.
    fn drop_connection(&mut self, err: LinkError) {
        match &err {
            LinkError::Closed => log::info!("TelescopeTcp({}): {}", self.name, err),
            _ => log::warn!("TelescopeTcp({}): {}", self.name, err),
        }
        self.connection
            .close(self.tick_micros.saturating_add(CONNECTED_RETRY_BACKOFF));
        self.forget();
        self.last_error = Some(err);
    }

    fn perform_writing(&mut self) {
        let Some(socket) = self.connection.connected_socket() else {
            return;
        };
        if let Err(e) = self.stream.flush(socket) {
            self.drop_connection(e);
        }
    }

    fn perform_reading(&mut self) {
        let Some(socket) = self.connection.connected_socket() else {
            return;
        };
        let frames = match self.stream.receive(socket) {
            Ok(frames) => frames,
            Err(e) => {
                self.drop_connection(e);
                return;
            }
        };
        let now = self.clock.now_micros();
        for frame in frames {
            match frame {
                InboundFrame::Position(report) => self.record(report, now),
                InboundFrame::Unknown { kind, length } => log::debug!(
                    "TelescopeTcp({}): ignoring unknown packet, type: {} ({} bytes)",
                    self.name,
                    kind,
                    length
                ),
            }
        }
    }

    fn record(&mut self, report: PositionReport, now: Micros) {
        log::trace!(
            "TelescopeTcp({}): server time {} {}",
            self.name,
            report.server_micros,
            RaDec::new(report.ra, report.dec)
        );
        self.history.insert(PositionSample {
            server_micros: Some(report.server_micros),
            client_micros: now,
            position: report.direction(),
            status: report.status,
        });
    }
}

impl<C: Clock, N: Connector> Telescope for TcpTelescope<C, N> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    fn has_known_position(&self) -> bool {
        self.history.newest().is_some()
    }

    fn current_position(&self, now: Micros) -> Option<Vec3> {
        self.history.query(now, self.endpoint.latency)
    }

    fn prepare_readiness(&mut self, now: Micros) -> ReadinessRequest {
        self.tick_micros = now;
        let was_disconnected = self.connection.state() == ConnectionState::Disconnected;
        match self.connection.tick(now) {
            Ok(()) if was_disconnected && self.connection.descriptor().is_some() => log::debug!(
                "TelescopeTcp({}): connecting to {}",
                self.name,
                self.connection.addr()
            ),
            Ok(()) => {}
            Err(e) => self.on_connect_error(e),
        }

        let timeout_hint = self
            .connection
            .timeout_hint(now)
            .map(|us| Duration::from_micros(us.max(0) as u64));
        let descriptor = self.connection.descriptor();
        match self.connection.state() {
            ConnectionState::Disconnected => ReadinessRequest {
                timeout_hint,
                ..ReadinessRequest::idle()
            },
            ConnectionState::Connecting { .. } => ReadinessRequest {
                descriptor,
                want_read: false,
                want_write: true,
                timeout_hint,
            },
            ConnectionState::Connected => ReadinessRequest {
                descriptor,
                want_read: true,
                want_write: self.stream.has_pending_output(),
                timeout_hint,
            },
        }
    }

    fn handle_readiness(&mut self, ready: ReadinessResult) {
        match self.connection.state() {
            ConnectionState::Disconnected => {}
            ConnectionState::Connecting { .. } => {
                if !ready.writable {
                    return;
                }
                match self.connection.on_writable() {
                    Ok(true) => log::info!("TelescopeTcp({}): connection established", self.name),
                    Ok(false) => {}
                    Err(e) => self.on_connect_error(e),
                }
            }
            ConnectionState::Connected => {
                if ready.writable {
                    self.perform_writing();
                }
                if ready.readable && self.connection.is_connected() {
                    self.perform_reading();
                }
            }
        }
    }

    fn go_to(&mut self, target: Vec3) {
        if !self.is_connected() {
            log::debug!("TelescopeTcp({}): not connected, ignoring goto", self.name);
            return;
        }
        let Some(target) = target.normalized() else {
            log::debug!("TelescopeTcp({}): ignoring goto to zero vector", self.name);
            return;
        };
        let command = GotoCommand::new(self.clock.now_micros(), &target);
        match self.stream.queue(&command.encode()) {
            Ok(()) => log::debug!(
                "TelescopeTcp({}): queuing packet: {}",
                self.name,
                RaDec::new(command.ra, command.dec)
            ),
            Err(e) => {
                log::warn!("TelescopeTcp({}): {}, ignoring this command", self.name, e);
                self.last_error = Some(e);
            }
        }
    }
}
