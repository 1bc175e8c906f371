//! Talking to other name servers.
use crate::Result;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

pub use self::resolver::Resolver;
pub use self::stats::Stats;
pub use self::udp::UdpClient;

mod resolver;
mod stats;
mod udp;

/// IPv4 addresses of the root name servers, in the order they are tried.
pub const ROOT_SERVERS: [Ipv4Addr; 13] = [
    Ipv4Addr::new(170, 247, 170, 2), // b.root-servers.net
    Ipv4Addr::new(192, 58, 128, 30), // j.root-servers.net
    Ipv4Addr::new(192, 33, 4, 12),   // c.root-servers.net
    Ipv4Addr::new(199, 7, 91, 13),   // d.root-servers.net
    Ipv4Addr::new(192, 203, 230, 10), // e.root-servers.net
    Ipv4Addr::new(192, 5, 5, 241),   // f.root-servers.net
    Ipv4Addr::new(192, 112, 36, 4),  // g.root-servers.net
    Ipv4Addr::new(198, 97, 190, 53), // h.root-servers.net
    Ipv4Addr::new(192, 36, 148, 17), // i.root-servers.net
    Ipv4Addr::new(193, 0, 14, 129),  // k.root-servers.net
    Ipv4Addr::new(199, 7, 83, 42),   // l.root-servers.net
    Ipv4Addr::new(202, 12, 27, 33),  // m.root-servers.net
    Ipv4Addr::new(198, 41, 0, 4),    // a.root-servers.net
];

/// Exchanger sends an encoded query to a server and returns its encoded
/// response.
///
/// Implementations must be safe to call from many request threads at once.
pub trait Exchanger {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>>;
}

impl<E: Exchanger + ?Sized> Exchanger for Arc<E> {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(server, query)
    }
}

impl<E: Exchanger + ?Sized> Exchanger for &E {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(server, query)
    }
}
