use std::net::{SocketAddr, SocketAddrV4, ToSocketAddrs};

use super::error::TelescopeError;
use crate::clock::Micros;

/// Upper bound on the configured display latency (10 s).
pub const MAX_LATENCY: Micros = 10_000_000;

/// Validated address of a telescope server plus the delay applied when
/// reading positions back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub addr: SocketAddrV4,
    pub latency: Micros,
}

impl Endpoint {
    /// Checks the ranges, then resolves `host` to its first IPv4 address.
    pub fn resolve(host: &str, port: u64, latency: u64) -> Result<Self, TelescopeError> {
        let port = check_range("port", port, 1, u16::MAX as u64)? as u16;
        let latency = check_range("latency", latency, 1, MAX_LATENCY as u64)? as Micros;

        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| TelescopeError::AddressResolution {
                host: host.to_string(),
                source,
            })?;
        let addr = addrs
            .into_iter()
            .find_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(v4),
                SocketAddr::V6(_) => None,
            })
            .ok_or_else(|| TelescopeError::NotIpv4(host.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            addr,
            latency,
        })
    }

    /// Endpoint for an already known address.
    pub fn from_addr(addr: SocketAddrV4, latency: Micros) -> Result<Self, TelescopeError> {
        check_range("port", addr.port() as u64, 1, u16::MAX as u64)?;
        let latency = check_range("latency", latency.max(0) as u64, 1, MAX_LATENCY as u64)?;
        Ok(Self {
            host: addr.ip().to_string(),
            addr,
            latency: latency as Micros,
        })
    }
}

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<u64, TelescopeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(TelescopeError::ParameterRange {
            name,
            value: value.to_string(),
            min,
            max,
        })
    }
}
