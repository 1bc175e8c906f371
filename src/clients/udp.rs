use crate::clients::stats::StatsBuilder;
use crate::clients::Exchanger;
use crate::{Error, Result};
use log::debug;
use std::io;
use std::net::SocketAddr;
use std::net::UdpSocket;
use std::time::Duration;

/// Largest response accepted from a upstream server.
pub const MAX_RESPONSE_SIZE: usize = 4096;

/// A UDP DNS Client. Every exchange uses a new socket, connected to the
/// server being asked, so only its replies are received.
///
/// # Example
///
/// ```rust,no_run
/// use iterdns::clients::{Exchanger, UdpClient};
/// use iterdns::types::*;
/// use std::time::Duration;
///
/// fn main() -> Result<(), iterdns::Error> {
///     let query = Message::query(0xeccb, "bramp.net", Type::A);
///
///     let response = UdpClient::new(Duration::from_secs(1))
///        .exchange("198.41.0.4:53".parse().unwrap(), &query.to_vec()?)?;
///
///     println!("{}", Message::from_slice(&response)?);
///     Ok(())
/// }
/// ```
///
/// See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1>
#[derive(Clone, Debug)]
pub struct UdpClient {
    read_timeout: Option<Duration>,
}

impl Default for UdpClient {
    fn default() -> Self {
        UdpClient {
            read_timeout: Some(Duration::new(1, 0)),
        }
    }
}

impl UdpClient {
    /// Creates a new UdpClient that waits at most `read_timeout` for each reply.
    pub fn new(read_timeout: Duration) -> Self {
        UdpClient {
            read_timeout: Some(read_timeout),
        }
    }
}

impl Exchanger for UdpClient {
    /// Sends the query to the `server` via UDP and returns the response.
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>> {
        let local = if server.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(self.read_timeout)?;

        // Connect us to the server, meaning recv will only receive directly
        // from the server.
        socket.connect(server)?;

        let stats = StatsBuilder::start(query.len());
        socket.send(query)?;

        let mut buf = [0; MAX_RESPONSE_SIZE];
        let len = match socket.recv(&mut buf) {
            Ok(len) => len,

            // Unix reports WouldBlock, Windows TimedOut.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {
                return Err(Error::UpstreamTimeout(server))
            }
            Err(e) => return Err(e.into()),
        };

        debug!("exchange with {}:\n{}", server, stats.end(server, len));

        Ok(buf[..len].to_vec())
    }
}
