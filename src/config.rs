use crate::clients::ROOT_SERVERS;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the [`crate::Server`] and the [`crate::clients::Resolver`].
///
/// The defaults match a plain recursive server on port 53.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding the `*.conf` zone files.
    pub zones: PathBuf,

    /// Address to listen on.
    pub bind: SocketAddr,

    /// Port upstream name servers are queried on.
    pub upstream_port: u16,

    /// How long to wait for each upstream server to reply.
    pub timeout: Duration,

    /// Maximum nesting of delegations and name server lookups.
    pub max_depth: usize,

    /// Where every resolution starts, tried in order.
    pub root_servers: Vec<IpAddr>,

    /// Largest request accepted from clients, in bytes.
    pub max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            zones: PathBuf::from("zones"),
            bind: SocketAddr::from(([0, 0, 0, 0], 53)),
            upstream_port: 53,
            timeout: Duration::from_secs(1),
            max_depth: 32,
            root_servers: ROOT_SERVERS.iter().map(|ip| IpAddr::V4(*ip)).collect(),
            max_request_size: 512,
        }
    }
}
