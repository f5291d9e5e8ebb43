use thiserror::Error;

/// Reasons a telescope definition does not produce a telescope.
#[derive(Debug, Error)]
pub enum TelescopeError {
    #[error("telescope definition {0:?} not recognised")]
    InvalidDefinition(String),
    #[error("unknown telescope type {0:?}")]
    UnknownType(String),
    #[error("incorrect TCP parameters {0:?}, expected host:port:latency_micros")]
    InvalidParameters(String),
    #[error("{name} {value} not valid, must be within {min}..={max}")]
    ParameterRange {
        name: &'static str,
        value: String,
        min: u64,
        max: u64,
    },
    #[error("unknown host {host}: {source}")]
    AddressResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("host {0} has no IPv4 address")]
    NotIpv4(String),
}
