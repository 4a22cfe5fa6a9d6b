//! Network endpoint identity and its flat string encoding.

use std::fmt;

/// Separator joining the fields of an encoded endpoint.
///
/// IP addresses, node names and port numbers never contain `||`, so the
/// encoding is reversible without escaping. That property is a system-wide
/// invariant on the sources of these strings.
const SEPARATOR: &str = "||";

/// A single network endpoint registered in a NEG.
///
/// Identity is the full (ip, port, node) tuple; two endpoints with the same
/// IP and port on different nodes are distinct. The port is kept in string
/// form because a service's target port may be named, and resolution to a
/// number happens during desired-state mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkEndpoint {
    /// Pod IP address.
    pub ip: String,
    /// Resolved port, as a decimal string.
    pub port: String,
    /// Name of the node (GCE instance) hosting the pod.
    pub node: String,
}

impl fmt::Display for NetworkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode_endpoint(&self.ip, &self.node, &self.port))
    }
}

/// Encodes ip, node and port into a single flat key.
pub fn encode_endpoint(ip: &str, node: &str, port: &str) -> String {
    [ip, node, port].join(SEPARATOR)
}

/// Decodes a key produced by [`encode_endpoint`] back into (ip, node, port).
///
/// Returns `None` for strings that were not produced by the encoder.
pub fn decode_endpoint(encoded: &str) -> Option<(String, String, String)> {
    let mut parts = encoded.split(SEPARATOR);
    let ip = parts.next()?;
    let node = parts.next()?;
    let port = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ip.to_string(), node.to_string(), port.to_string()))
}

/// Identity of the pod backing an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
