use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use scope_link::link::{ConnectionState, LinkError};
use scope_link::protocol::angle::encode_direction;
use scope_link::protocol::{GotoCommand, PositionReport};
use scope_link::telescope::{Endpoint, TcpTelescope};
use scope_link::{Clock, ReadinessResult, SystemClock, Telescope, Vec3};

const LATENCY: i64 = 1_000;

fn listener() -> (TcpListener, Endpoint) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let endpoint = Endpoint::from_addr(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port), LATENCY).unwrap();
    (listener, endpoint)
}

/// Runs the readiness cycle, treating the socket as always ready, until
/// `done` holds or two seconds pass.
fn drive(scope: &mut TcpTelescope, clock: &SystemClock, mut done: impl FnMut(&TcpTelescope) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        scope.prepare_readiness(clock.now_micros());
        scope.handle_readiness(ReadinessResult {
            readable: true,
            writable: true,
        });
        if done(scope) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn report(direction: Vec3) -> Vec<u8> {
    let (ra, dec) = encode_direction(&direction);
    PositionReport {
        server_micros: 1,
        ra,
        dec,
        status: 0,
    }
    .encode()
    .to_vec()
}

#[test]
fn receives_positions_and_sends_goto() {
    let (listener, endpoint) = listener();
    let reported = Vec3::new(0.0, 0.0, 1.0);
    let (tx, rx) = mpsc::channel();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        // one report split over two writes
        let bytes = report(reported);
        stream.write_all(&bytes[..7]).unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        stream.write_all(&bytes[7..]).unwrap();

        let mut goto = [0u8; 20];
        stream.read_exact(&mut goto).unwrap();
        tx.send(GotoCommand::decode(&goto).unwrap()).unwrap();
    });

    let clock = SystemClock::new();
    let mut scope = TcpTelescope::new("loopback", endpoint);
    assert!(!scope.is_connected());

    assert!(drive(&mut scope, &clock, |s| s.has_known_position()));
    let position = scope
        .current_position(clock.now_micros() + LATENCY)
        .unwrap();
    assert!(position.distance(&reported) < 1e-8);

    let target = Vec3::new(1.0, 1.0, 0.0);
    scope.go_to(target);
    let mut command = None;
    assert!(drive(&mut scope, &clock, |_| {
        command = rx.try_recv().ok();
        command.is_some()
    }));
    let command = command.unwrap();
    assert!(command.target().distance(&target.normalized().unwrap()) < 1e-8);

    server.join().unwrap();
}

#[test]
fn server_hangup_clears_positions() {
    let (listener, endpoint) = listener();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(&report(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        thread::sleep(Duration::from_millis(100));
    });

    let clock = SystemClock::new();
    let mut scope = TcpTelescope::new("loopback", endpoint);
    assert!(drive(&mut scope, &clock, |s| s.has_known_position()));
    server.join().unwrap();

    assert!(drive(&mut scope, &clock, |s| !s.is_connected()));
    assert!(!scope.has_known_position());
    assert!(matches!(scope.last_error(), Some(LinkError::Closed)));
}

#[test]
fn refused_connection_stays_disconnected() {
    let (listener, endpoint) = listener();
    drop(listener);

    let clock = SystemClock::new();
    let mut scope = TcpTelescope::new("nobody-home", endpoint);
    assert!(drive(&mut scope, &clock, |s| s.last_error().is_some()));
    assert_eq!(scope.state(), ConnectionState::Disconnected);
    assert!(matches!(scope.last_error(), Some(LinkError::Socket(_))));
    assert!(!scope.is_connected());
}
