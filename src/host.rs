//! Readiness multiplexing for the `watch` loop, on top of poll(2).

use std::time::Duration;

use scope_link::{ReadinessRequest, ReadinessResult};

/// Waits until any requested descriptor is ready or `timeout` passes, and
/// returns one result per request, in order.
pub fn wait(requests: &[ReadinessRequest], timeout: Duration) -> Vec<ReadinessResult> {
    let mut fds = Vec::new();
    let mut slots = Vec::with_capacity(requests.len());
    for request in requests {
        let events = interest(request);
        match request.descriptor {
            Some(fd) if events != 0 => {
                slots.push(Some(fds.len()));
                fds.push(libc::pollfd {
                    fd,
                    events,
                    revents: 0,
                });
            }
            _ => slots.push(None),
        }
    }

    let timeout_ms = timeout.as_micros().div_ceil(1000).min(i32::MAX as u128) as libc::c_int;
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            log::error!("poll failed: {}", err);
        }
        return vec![ReadinessResult::default(); requests.len()];
    }

    slots
        .into_iter()
        .map(|slot| match slot {
            Some(i) => outcome(fds[i].revents),
            None => ReadinessResult::default(),
        })
        .collect()
}

fn interest(request: &ReadinessRequest) -> libc::c_short {
    let mut events = 0;
    if request.want_read {
        events |= libc::POLLIN;
    }
    if request.want_write {
        events |= libc::POLLOUT;
    }
    events
}

/// Errors and hangups are reported as readiness so the telescope's own
/// read/write call observes them.
fn outcome(revents: libc::c_short) -> ReadinessResult {
    let failed = revents & (libc::POLLERR | libc::POLLHUP) != 0;
    ReadinessResult {
        readable: failed || revents & libc::POLLIN != 0,
        writable: failed || revents & libc::POLLOUT != 0,
    }
}

/// Smallest hint among the requests, capped at `tick`.
pub fn next_timeout(requests: &[ReadinessRequest], tick: Duration) -> Duration {
    requests
        .iter()
        .filter_map(|r| r.timeout_hint)
        .fold(tick, Duration::min)
}
