//! Answers DNS queries received over UDP.
use crate::clients::{Exchanger, Resolver, UdpClient};
use crate::config::Config;
use crate::dns::{set_id, HEADER_LEN};
use crate::zones::{Lookup, ZoneLookup, Zones};
use crate::{Message, Opcode, Rcode, Result, QR};
use log::{debug, info, trace, warn};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;

/// Turns a request into a response, from the local zones if they know the
/// name, otherwise by resolving it.
pub struct Handler<Z = Zones, E = UdpClient> {
    zones: Z,
    resolver: Resolver<E>,
}

impl<Z, E> Handler<Z, E>
where
    Z: ZoneLookup,
    E: Exchanger,
{
    pub fn new(zones: Z, resolver: Resolver<E>) -> Handler<Z, E> {
        Handler { zones, resolver }
    }

    pub fn resolver(&self) -> &Resolver<E> {
        &self.resolver
    }

    /// Returns the encoded response to the encoded request, or None if
    /// nothing should be sent back.
    pub fn handle(&self, request: &[u8]) -> Option<Vec<u8>> {
        let query = match Message::from_slice(request) {
            Ok(query) => query,
            Err(e) => {
                info!("malformed request: {}", e);
                return format_error(request);
            }
        };

        trace!("request:\n{}", query);

        if query.qr == QR::Response {
            debug!("ignoring a response with id {}", query.id);
            return None;
        }

        match self.respond(&query) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("failed to answer {}: {}", query.id, e);
                error_response(&query, Rcode::ServFail).ok()
            }
        }
    }

    fn respond(&self, query: &Message) -> Result<Vec<u8>> {
        if query.opcode != Opcode::Query {
            return error_response(query, Rcode::NotImp);
        }

        if query.questions.len() != 1 {
            return error_response(query, Rcode::FormErr);
        }

        let question = &query.questions[0];

        match self.zones.lookup(&question.name, question.r#type) {
            Lookup::Found(records) => {
                debug!("{} {}: answered from zone", question.name, question.r#type);

                let mut response = Message::response_to(query);
                response.aa = true;
                response.answers = records;
                return response.to_vec();
            }

            Lookup::WrongType(soa) => {
                debug!("{} {}: no such type in zone", question.name, question.r#type);

                let mut response = Message::response_to(query);
                response.aa = true;
                response.authoritys = soa;
                return response.to_vec();
            }

            Lookup::NoSuchName => (),
        }

        match self.resolver.resolve(&question.name, question.r#type) {
            Ok(mut response) => {
                set_id(&mut response, query.id);

                // We recurse for the client, whatever the upstream server offered.
                response[3] |= 0b1000_0000;

                Ok(response)
            }
            Err(e) => {
                info!("{} {}: {}", question.name, question.r#type, e);
                error_response(query, Rcode::ServFail)
            }
        }
    }
}

/// A response with no answers, echoing the query's question.
fn error_response(query: &Message, rcode: Rcode) -> Result<Vec<u8>> {
    let mut response = Message::response_to(query);
    response.rcode = rcode;
    response.to_vec()
}

/// A FORMERR for a request we could not parse, if enough of it arrived to
/// know who to reply to.
fn format_error(request: &[u8]) -> Option<Vec<u8>> {
    if request.len() < HEADER_LEN {
        return None;
    }

    // Never reply to a response.
    if request[2] & 0b1000_0000 != 0 {
        return None;
    }

    let response = Message {
        id: u16::from_be_bytes([request[0], request[1]]),
        qr: QR::Response,
        rcode: Rcode::FormErr,
        ra: true,

        ..Default::default()
    };

    response.to_vec().ok()
}

/// A UDP server, handling each request on its own thread.
///
/// # Example
///
/// ```rust,no_run
/// use iterdns::{Config, Server};
/// use iterdns::zones::Zones;
///
/// fn main() -> Result<(), iterdns::Error> {
///     let config = Config::default();
///     let zones = Zones::load_dir(&config.zones)?;
///
///     Server::bind(&config, zones)?.run()
/// }
/// ```
pub struct Server<Z = Zones, E = UdpClient> {
    socket: Arc<UdpSocket>,
    handler: Arc<Handler<Z, E>>,
    max_request_size: usize,
}

impl<Z: ZoneLookup + Send + Sync + 'static> Server<Z, UdpClient> {
    /// Binds to the configured address, resolving over UDP.
    pub fn bind(config: &Config, zones: Z) -> Result<Server<Z, UdpClient>> {
        Server::bind_with_handler(config, Handler::new(zones, Resolver::new(config)))
    }
}

impl<Z, E> Server<Z, E>
where
    Z: ZoneLookup + Send + Sync + 'static,
    E: Exchanger + Send + Sync + 'static,
{
    pub fn bind_with_handler(config: &Config, handler: Handler<Z, E>) -> Result<Server<Z, E>> {
        let socket = UdpSocket::bind(config.bind)?;
        info!("listening on {}", socket.local_addr()?);

        Ok(Server {
            socket: Arc::new(socket),
            handler: Arc::new(handler),
            max_request_size: config.max_request_size,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serves requests, forever.
    pub fn run(&self) -> Result<()> {
        loop {
            let mut buf = vec![0; self.max_request_size];
            let (len, src) = match self.socket.recv_from(&mut buf) {
                Ok(r) => r,
                Err(e) => {
                    // e.g the ICMP port unreachable from a earlier reply.
                    warn!("receive failed: {}", e);
                    continue;
                }
            };
            buf.truncate(len);

            let socket = Arc::clone(&self.socket);
            let handler = Arc::clone(&self.handler);

            thread::spawn(move || {
                if let Some(response) = handler.handle(&buf) {
                    if let Err(e) = socket.send_to(&response, src) {
                        warn!("failed to reply to {}: {}", src, e);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Type;
    use pretty_assertions::assert_eq;

    /// Never called, as every test is answered before resolving.
    struct Unreachable;

    impl Exchanger for Unreachable {
        fn exchange(&self, server: SocketAddr, _query: &[u8]) -> Result<Vec<u8>> {
            panic!("unexpected exchange with {}", server)
        }
    }

    fn handler() -> Handler<Zones, Unreachable> {
        Handler::new(
            Zones::default(),
            Resolver::new_with_client(Unreachable, &Config::default()),
        )
    }

    #[test]
    fn test_format_error() {
        // Header says 1 question, but there is none.
        let request = hex::decode("abcd01000001000000000000").unwrap();
        let response = handler().handle(&request).expect("expected a response");

        let m = Message::from_slice(&response).unwrap();
        assert_eq!(m.id, 0xabcd);
        assert_eq!(m.qr, QR::Response);
        assert_eq!(m.rcode, Rcode::FormErr);
        assert!(m.questions.is_empty());
    }

    #[test]
    fn test_dropped() {
        // Too short to have an id.
        assert_eq!(handler().handle(&[0xab, 0xcd, 0x01]), None);

        // A response.
        let mut m = Message::query(1, "example.com.", Type::A);
        m.qr = QR::Response;
        assert_eq!(handler().handle(&m.to_vec().unwrap()), None);

        // A malformed response.
        let request = hex::decode("abcd81000001000000000000").unwrap();
        assert_eq!(handler().handle(&request), None);
    }

    #[test]
    fn test_not_implemented() {
        let mut query = Message::query(7, "example.com.", Type::A);
        query.opcode = Opcode::Status;

        let response = handler().handle(&query.to_vec().unwrap()).unwrap();
        let m = Message::from_slice(&response).unwrap();
        assert_eq!(m.id, 7);
        assert_eq!(m.rcode, Rcode::NotImp);
    }

    #[test]
    fn test_question_count() {
        let mut query = Message::query(8, "example.com.", Type::A);
        query.add_question("example.net.", Type::A, crate::Class::Internet);

        let response = handler().handle(&query.to_vec().unwrap()).unwrap();
        let m = Message::from_slice(&response).unwrap();
        assert_eq!(m.id, 8);
        assert_eq!(m.rcode, Rcode::FormErr);

        let mut query = Message::query(9, "example.com.", Type::A);
        query.questions.clear();

        let response = handler().handle(&query.to_vec().unwrap()).unwrap();
        let m = Message::from_slice(&response).unwrap();
        assert_eq!(m.rcode, Rcode::FormErr);
    }
}
