use std::net::SocketAddrV4;

use super::error::LinkError;
use super::socket::{Connector, Descriptor, Socket};
use crate::clock::{Micros, MICROS_PER_SECOND};

/// How long a non-blocking connect may take, and the pause after a connect
/// that failed outright.
pub const CONNECT_TIMEOUT: Micros = 5 * MICROS_PER_SECOND;
/// Pause after a connect that timed out.
pub const CONNECT_TIMEOUT_BACKOFF: Micros = MICROS_PER_SECOND;
/// Pause after an established connection was lost.
pub const CONNECTED_RETRY_BACKOFF: Micros = 5 * MICROS_PER_SECOND;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ConnectionState {
    #[strum(serialize = "disconnected")]
    Disconnected,
    #[strum(serialize = "connecting")]
    Connecting { deadline: Micros },
    #[strum(serialize = "connected")]
    Connected,
}

enum Link<S> {
    Disconnected,
    Connecting { socket: S, deadline: Micros },
    Connected { socket: S },
}

/// Owns the socket and walks it through connect, timeout and reconnect.
///
/// Every failure leaves the manager `Disconnected` with the socket closed and
/// the next attempt scheduled; the caller only has to drop its own buffers.
pub struct ConnectionManager<N: Connector> {
    addr: SocketAddrV4,
    connector: N,
    link: Link<N::Socket>,
    retry_at: Micros,
}

impl<N: Connector> ConnectionManager<N> {
    pub fn new(addr: SocketAddrV4, connector: N) -> Self {
        Self {
            addr,
            connector,
            link: Link::Disconnected,
            retry_at: Micros::MIN,
        }
    }

    pub fn addr(&self) -> SocketAddrV4 {
        self.addr
    }

    pub fn state(&self) -> ConnectionState {
        match &self.link {
            Link::Disconnected => ConnectionState::Disconnected,
            Link::Connecting { deadline, .. } => ConnectionState::Connecting {
                deadline: *deadline,
            },
            Link::Connected { .. } => ConnectionState::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, Link::Connected { .. })
    }

    /// Earliest time of the next connect attempt while disconnected.
    pub fn retry_at(&self) -> Option<Micros> {
        match self.link {
            Link::Disconnected if self.retry_at != Micros::MIN => Some(self.retry_at),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> Option<Descriptor> {
        match &self.link {
            Link::Disconnected => None,
            Link::Connecting { socket, .. } | Link::Connected { socket } => {
                Some(socket.descriptor())
            }
        }
    }

    /// The socket once the connection is established.
    pub fn connected_socket(&mut self) -> Option<&mut N::Socket> {
        match &mut self.link {
            Link::Connected { socket } => Some(socket),
            _ => None,
        }
    }

    /// Advances time-driven transitions: starts a connect once the backoff
    /// has elapsed and abandons a connect that outlived its deadline.
    pub fn tick(&mut self, now: Micros) -> Result<(), LinkError> {
        match &self.link {
            Link::Disconnected => {
                if now < self.retry_at {
                    return Ok(());
                }
                self.retry_at = now.saturating_add(CONNECT_TIMEOUT);
                let socket = self.connector.connect(self.addr)?;
                self.link = Link::Connecting {
                    socket,
                    deadline: self.retry_at,
                };
                Ok(())
            }
            Link::Connecting { deadline, .. } => {
                if now < *deadline {
                    return Ok(());
                }
                self.close(now.saturating_add(CONNECT_TIMEOUT_BACKOFF));
                Err(LinkError::ConnectTimeout)
            }
            Link::Connected { .. } => Ok(()),
        }
    }

    /// Resolves a pending connect once its socket reported writable.
    /// Returns `true` exactly when the connection just became established.
    ///
    /// A refused connect keeps the original deadline as the retry time.
    pub fn on_writable(&mut self) -> Result<bool, LinkError> {
        let Link::Connecting { socket, deadline } = &mut self.link else {
            return Ok(false);
        };
        match socket.finish_connect() {
            Ok(false) => Ok(false),
            Ok(true) => {
                if let Link::Connecting { socket, .. } =
                    std::mem::replace(&mut self.link, Link::Disconnected)
                {
                    self.link = Link::Connected { socket };
                }
                Ok(true)
            }
            Err(e) => {
                let retry_at = *deadline;
                self.close(retry_at);
                Err(LinkError::Socket(e))
            }
        }
    }

    /// Microseconds until `tick` has something to do, if anything.
    pub fn timeout_hint(&self, now: Micros) -> Option<Micros> {
        match &self.link {
            Link::Disconnected => Some(self.retry_at.saturating_sub(now).max(0)),
            Link::Connecting { deadline, .. } => Some(deadline.saturating_sub(now).max(0)),
            Link::Connected { .. } => None,
        }
    }

    /// Closes the socket, if any, and schedules the next attempt.
    pub fn close(&mut self, retry_at: Micros) {
        self.link = Link::Disconnected;
        self.retry_at = retry_at;
    }

    /// Closes the socket and cancels any pending backoff.
    pub fn reset(&mut self) {
        self.close(Micros::MIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::fake::FakeConnector;
    use std::io::ErrorKind;
    use std::net::Ipv4Addr;

    const T0: Micros = 1_000 * MICROS_PER_SECOND;

    fn manager() -> (ConnectionManager<FakeConnector>, FakeConnector) {
        let connector = FakeConnector::default();
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 10000);
        (ConnectionManager::new(addr, connector.clone()), connector)
    }

    #[test]
    fn first_tick_connects_immediately() {
        let (mut conn, net) = manager();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        conn.tick(T0).unwrap();
        assert_eq!(
            conn.state(),
            ConnectionState::Connecting {
                deadline: T0 + CONNECT_TIMEOUT
            }
        );
        assert_eq!(net.net().connects, 1);
        assert_eq!(conn.descriptor(), Some(7));

        assert!(conn.on_writable().unwrap());
        assert!(conn.is_connected());
        assert!(conn.connected_socket().is_some());
        assert_eq!(conn.timeout_hint(T0), None);
    }

    #[test]
    fn spurious_writable_keeps_connecting() {
        let (mut conn, net) = manager();
        net.net().finish.push_back(Ok(false));
        conn.tick(T0).unwrap();
        assert!(!conn.on_writable().unwrap());
        assert!(matches!(conn.state(), ConnectionState::Connecting { .. }));
    }

    #[test]
    fn refused_connect_waits_for_the_original_deadline() {
        let (mut conn, net) = manager();
        net.net()
            .finish
            .push_back(Err(ErrorKind::ConnectionRefused.into()));

        conn.tick(T0).unwrap();
        assert!(matches!(conn.on_writable(), Err(LinkError::Socket(_))));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(net.net().open_sockets, 0);
        assert_eq!(conn.retry_at(), Some(T0 + CONNECT_TIMEOUT));

        for step in 1..5 {
            conn.tick(T0 + step * MICROS_PER_SECOND).unwrap();
            assert_eq!(net.net().connects, 1, "reconnected early at +{step}s");
        }
        assert_eq!(
            conn.timeout_hint(T0 + 4 * MICROS_PER_SECOND),
            Some(MICROS_PER_SECOND)
        );

        conn.tick(T0 + CONNECT_TIMEOUT).unwrap();
        assert_eq!(net.net().connects, 2);
    }

    #[test]
    fn connect_call_failure_backs_off() {
        let (mut conn, net) = manager();
        net.net()
            .connect_errors
            .push_back(ErrorKind::AddrNotAvailable);

        assert!(matches!(conn.tick(T0), Err(LinkError::Socket(_))));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(conn.timeout_hint(T0), Some(CONNECT_TIMEOUT));

        conn.tick(T0 + CONNECT_TIMEOUT - 1).unwrap();
        assert_eq!(net.net().connects, 1);
        conn.tick(T0 + CONNECT_TIMEOUT).unwrap();
        assert_eq!(net.net().connects, 2);
    }

    #[test]
    fn connect_timeout_backs_off_one_second() {
        let (mut conn, net) = manager();
        conn.tick(T0).unwrap();
        assert_eq!(conn.timeout_hint(T0 + 1), Some(CONNECT_TIMEOUT - 1));

        conn.tick(T0 + CONNECT_TIMEOUT - 1).unwrap();
        assert!(matches!(conn.state(), ConnectionState::Connecting { .. }));

        let timed_out = T0 + CONNECT_TIMEOUT;
        assert!(matches!(
            conn.tick(timed_out),
            Err(LinkError::ConnectTimeout)
        ));
        assert_eq!(net.net().open_sockets, 0);
        assert_eq!(conn.retry_at(), Some(timed_out + CONNECT_TIMEOUT_BACKOFF));

        conn.tick(timed_out + CONNECT_TIMEOUT_BACKOFF - 1).unwrap();
        assert_eq!(net.net().connects, 1);
        conn.tick(timed_out + CONNECT_TIMEOUT_BACKOFF).unwrap();
        assert_eq!(net.net().connects, 2);
    }

    #[test]
    fn reset_cancels_backoff() {
        let (mut conn, net) = manager();
        conn.tick(T0).unwrap();
        conn.on_writable().unwrap();
        conn.close(T0 + CONNECTED_RETRY_BACKOFF);
        assert_eq!(conn.retry_at(), Some(T0 + CONNECTED_RETRY_BACKOFF));

        conn.reset();
        assert_eq!(conn.retry_at(), None);
        conn.tick(T0 + 1).unwrap();
        assert_eq!(net.net().connects, 2);
    }

    #[test]
    fn state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(
            ConnectionState::Connecting { deadline: 1 }.to_string(),
            "connecting"
        );
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
