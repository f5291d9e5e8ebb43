use super::dummy::DummyTelescope;
use super::endpoint::Endpoint;
use super::error::TelescopeError;
use super::tcp::TcpTelescope;
use super::AnyTelescope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TelescopeKind {
    Dummy,
    #[strum(serialize = "TCP")]
    Tcp,
}

impl TelescopeKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Dummy" => Some(TelescopeKind::Dummy),
            "TCP" => Some(TelescopeKind::Tcp),
            _ => None,
        }
    }
}

/// Builds a telescope from a definition such as
/// `My_first_telescope:TCP:localhost:10000:500000` or `Sim:Dummy`.
///
/// The result is not connected yet; the first readiness tick starts that.
pub fn create(definition: &str) -> Result<AnyTelescope, TelescopeError> {
    let result = build(definition);
    match &result {
        Ok(telescope) => log::debug!(
            "Creating telescope {:?}; kind {}",
            definition,
            telescope.kind()
        ),
        Err(e) => log::warn!("Not creating a telescope for {:?}: {}", definition, e),
    }
    result
}

fn build(definition: &str) -> Result<AnyTelescope, TelescopeError> {
    let (name, kind, params) = split_definition(definition)?;
    let kind =
        TelescopeKind::parse(kind).ok_or_else(|| TelescopeError::UnknownType(kind.to_string()))?;

    match kind {
        TelescopeKind::Dummy => Ok(AnyTelescope::Dummy(DummyTelescope::new(name))),
        TelescopeKind::Tcp => {
            let endpoint = parse_tcp_params(params)?;
            log::debug!(
                "TelescopeTcp parameters host, port, latency: {} {} {}",
                endpoint.host,
                endpoint.addr.port(),
                endpoint.latency
            );
            Ok(AnyTelescope::Tcp(TcpTelescope::new(name, endpoint)))
        }
    }
}

/// `name:type[:params]`; neither name nor type may contain a colon.
fn split_definition(definition: &str) -> Result<(&str, &str, &str), TelescopeError> {
    let mut parts = definition.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let kind = parts
        .next()
        .ok_or_else(|| TelescopeError::InvalidDefinition(definition.to_string()))?
        .trim();
    let params = parts.next().unwrap_or_default().trim();
    Ok((name, kind, params))
}

/// `host:port:latency_micros`
fn parse_tcp_params(params: &str) -> Result<Endpoint, TelescopeError> {
    let invalid = || TelescopeError::InvalidParameters(params.to_string());

    let parts: Vec<&str> = params.split(':').collect();
    let [host, port, latency] = parts.as_slice() else {
        return Err(invalid());
    };
    let port = parse_number("port", port).ok_or_else(invalid)??;
    let latency = parse_number("latency", latency).ok_or_else(invalid)??;

    Endpoint::resolve(host.trim(), port, latency)
}

/// `None` unless `s` is all ASCII digits; digits too large for a `u64`
/// are a range error.
fn parse_number(name: &'static str, s: &str) -> Option<Result<u64, TelescopeError>> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse().map_err(|_| TelescopeError::ParameterRange {
        name,
        value: s.to_string(),
        min: 1,
        max: u64::MAX,
    }))
}
