use crate::attempts::Attempts;
use crate::cache::Cache;
use crate::clients::{Exchanger, UdpClient};
use crate::config::Config;
use crate::name::{fqdn, same_name};
use crate::types::*;
use crate::{Error, Result};
use log::{debug, info, trace, warn};
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Iterative resolver. Starting at the root servers, follows referrals until
/// a server returns answers for the question.
///
/// Responses that contain answers are cached, and the cache is consulted
/// before any server is asked. The cache may be shared with other
/// resolvers via [`Resolver::with_cache`].
///
/// See [rfc1034#section-5.3.3].
///
/// [rfc1034#section-5.3.3]: https://datatracker.ietf.org/doc/html/rfc1034#section-5.3.3
pub struct Resolver<E = UdpClient> {
    client: E,
    cache: Arc<Cache>,
    roots: Vec<IpAddr>,
    port: u16,
    max_depth: usize,
}

impl Resolver<UdpClient> {
    /// Creates a new Resolver talking UDP to the upstream servers.
    pub fn new(config: &Config) -> Resolver<UdpClient> {
        Resolver::new_with_client(UdpClient::new(config.timeout), config)
    }
}

/// What the result of a [`Frame`] is used for.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Purpose {
    /// The response answers the question of the frame below.
    Answer,

    /// The response holds addresses of a name server, which should be
    /// asked the question of the frame below.
    NameServer,
}

/// A way forward learnt from a referral.
#[derive(Debug, PartialEq)]
enum Step {
    /// Ask the same question to these servers (from glue records).
    Servers(Vec<IpAddr>),

    /// Find the address of this name server first.
    Lookup(String),
}

/// One question being asked of a list of servers.
#[derive(Debug)]
struct Frame {
    name: String,
    r#type: Type,

    /// Servers not yet asked.
    servers: VecDeque<IpAddr>,

    /// Referrals from the last server asked, not yet followed.
    steps: VecDeque<Step>,

    depth: usize,
    purpose: Purpose,
}

impl Frame {
    fn new(name: String, r#type: Type, servers: Vec<IpAddr>, depth: usize, purpose: Purpose) -> Frame {
        Frame {
            name,
            r#type,
            servers: servers.into(),
            steps: VecDeque::new(),
            depth,
            purpose,
        }
    }

    /// Returns a frame asking the same question to other servers.
    fn child(&self, servers: Vec<IpAddr>) -> Frame {
        Frame::new(
            self.name.clone(),
            self.r#type,
            servers,
            self.depth + 1,
            Purpose::Answer,
        )
    }
}

enum Event {
    /// A new frame should be pushed.
    Start(Frame),

    /// The top frame should carry on.
    Continue,

    /// The top frame has finished, with or without a response.
    Done(Option<Vec<u8>>),

    /// A frame that is no longer on the stack has finished.
    Finished(Purpose, Option<Vec<u8>>),
}

impl<E> Resolver<E>
where
    E: Exchanger,
{
    /// Creates a new Resolver that uses the `client` to talk to servers.
    pub fn new_with_client(client: E, config: &Config) -> Resolver<E> {
        Resolver {
            client,
            cache: Arc::new(Cache::new()),
            roots: config.root_servers.clone(),
            port: config.upstream_port,
            max_depth: config.max_depth,
        }
    }

    /// Use the given cache instead of a private one.
    pub fn with_cache(mut self, cache: Arc<Cache>) -> Resolver<E> {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Resolves the question, returning the raw bytes of the response that
    /// answered it. The response's id is whatever the answering server
    /// used, callers should replace it with their own.
    ///
    /// # Errors
    ///
    /// [`Error::ResolutionExhausted`] if every path was tried without
    /// getting an answer.
    pub fn resolve(&self, name: &str, r#type: Type) -> Result<Vec<u8>> {
        let name = fqdn(name);

        // Only lives for this request.
        let mut attempts = Attempts::new();

        let mut stack: Vec<Frame> = Vec::new();
        let mut event = Event::Start(Frame::new(
            name.clone(),
            r#type,
            self.roots.clone(),
            0,
            Purpose::Answer,
        ));

        loop {
            event = match event {
                Event::Start(frame) => self.start(&mut stack, frame),

                Event::Continue => match stack.last_mut() {
                    Some(frame) => self.step(frame, &mut attempts),
                    None => Event::Done(None),
                },

                Event::Done(response) => match stack.pop() {
                    Some(frame) => Event::Finished(frame.purpose, response),
                    None => Event::Finished(Purpose::Answer, response),
                },

                Event::Finished(purpose, response) => {
                    let parent = match stack.last() {
                        Some(parent) => parent,
                        None => {
                            return response.ok_or(Error::ResolutionExhausted {
                                name,
                                qtype: r#type,
                            })
                        }
                    };

                    match (purpose, response) {
                        (_, None) => Event::Continue,

                        // Which is also the answer for the parent.
                        (Purpose::Answer, Some(response)) => Event::Done(Some(response)),

                        (Purpose::NameServer, Some(response)) => {
                            let servers = addresses(&response);
                            if servers.is_empty() {
                                Event::Continue
                            } else {
                                Event::Start(parent.child(servers))
                            }
                        }
                    }
                }
            }
        }
    }

    /// Pushes the frame, unless it can be finished straight away.
    fn start(&self, stack: &mut Vec<Frame>, frame: Frame) -> Event {
        if frame.depth > self.max_depth {
            warn!(
                "{} {}: gave up after {} levels of referrals",
                frame.name, frame.r#type, frame.depth
            );
            return Event::Finished(frame.purpose, None);
        }

        if let Some(response) = self.cache.get(&frame.name, frame.r#type) {
            debug!("{} {}: cached", frame.name, frame.r#type);
            return Event::Finished(frame.purpose, Some(response));
        }

        stack.push(frame);
        Event::Continue
    }

    /// Follows the next referral, or asks the next server.
    fn step(&self, frame: &mut Frame, attempts: &mut Attempts) -> Event {
        if let Some(step) = frame.steps.pop_front() {
            return Event::Start(match step {
                Step::Servers(servers) => frame.child(servers),
                Step::Lookup(host) => Frame::new(
                    host,
                    Type::A,
                    self.roots.clone(),
                    frame.depth + 1,
                    Purpose::NameServer,
                ),
            });
        }

        let server = match frame.servers.pop_front() {
            Some(server) => server,
            None => {
                debug!("{} {}: no servers left to ask", frame.name, frame.r#type);
                return Event::Done(None);
            }
        };

        if attempts.try_mark(&frame.name, frame.r#type, server) {
            trace!("{} {}: already asked {}", frame.name, frame.r#type, server);
            return Event::Continue;
        }

        let (response, reply) = match self.ask(&frame.name, frame.r#type, server) {
            Ok(r) => r,
            Err(e) => {
                info!("{} {}: {}", frame.name, frame.r#type, e);
                return Event::Continue;
            }
        };

        if let Some(first) = reply.answers.first() {
            debug!(
                "{} {}: {} answers from {}",
                frame.name,
                frame.r#type,
                reply.answers.len(),
                server
            );
            self.cache
                .put(&frame.name, frame.r#type, response.clone(), first.ttl);
            return Event::Done(Some(response));
        }

        // The name does not exist, and the server is the authority to say so.
        if reply.aa && reply.rcode == Rcode::NXDomain {
            debug!("{} {}: {} says no such name", frame.name, frame.r#type, server);
            return Event::Done(Some(response));
        }

        frame.steps = referrals(&reply);
        trace!(
            "{} {}: {} referred us {} ways",
            frame.name,
            frame.r#type,
            server,
            frame.steps.len()
        );

        Event::Continue
    }

    /// Sends one query to the server, returning the raw and parsed reply.
    fn ask(&self, name: &str, r#type: Type, server: IpAddr) -> Result<(Vec<u8>, Message)> {
        let id = rand::random::<u16>();
        let query = Message::query(id, name, r#type).to_vec()?;
        let server = SocketAddr::new(server, self.port);

        debug!("{} {}: asking {}", name, r#type, server);
        let response = self.client.exchange(server, &query)?;
        let reply = Message::from_slice(&response)?;
        trace!("{} {}: reply from {}:\n{}", name, r#type, server, reply);

        if reply.id != id {
            return Err(Error::UpstreamIdMismatch {
                expected: id,
                got: reply.id,
            });
        }

        if reply.tc {
            return Err(Error::TruncatedResponse(server));
        }

        Ok((response, reply))
    }
}

/// Returns the ways forward given by a referral, in the order the name
/// servers appear. Each glue address is its own step, name servers without
/// glue need looking up first.
fn referrals(reply: &Message) -> VecDeque<Step> {
    let mut steps = VecDeque::new();

    for ns in &reply.authoritys {
        let host = match &ns.resource {
            Resource::NS(host) => host,
            _ => continue,
        };

        let glue: Vec<IpAddr> = reply
            .additionals
            .iter()
            .filter(|r| same_name(&r.name, host))
            .filter_map(|r| match r.resource {
                Resource::A(ip) => Some(IpAddr::V4(ip)),
                _ => None,
            })
            .collect();

        if glue.is_empty() {
            steps.push_back(Step::Lookup(host.clone()));
        } else {
            steps.extend(glue.into_iter().map(|ip| Step::Servers(vec![ip])));
        }
    }

    steps
}

/// The A addresses in the response's answers.
fn addresses(response: &[u8]) -> Vec<IpAddr> {
    let reply = match Message::from_slice(response) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("bad name server lookup response: {}", e);
            return Vec::new();
        }
    };

    reply
        .answers
        .iter()
        .filter_map(|r| match r.resource {
            Resource::A(ip) => Some(IpAddr::V4(ip)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SOA;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ns(name: &str, host: &str) -> Record {
        Record::new(name, Class::Internet, Duration::from_secs(3600), Resource::NS(host.to_string()))
    }

    fn a(name: &str, ip: &str) -> Record {
        Record::new(
            name,
            Class::Internet,
            Duration::from_secs(3600),
            Resource::A(ip.parse().unwrap()),
        )
    }

    #[test]
    fn test_referrals() {
        let mut reply = Message::default();
        reply.authoritys = vec![
            ns("example.com.", "a.iana-servers.net."),
            ns("example.com.", "ns.example.com."),
            ns("example.com.", "b.iana-servers.net."),
        ];
        reply.additionals = vec![
            a("NS.example.COM.", "192.0.2.1"),
            a("ns.example.com.", "192.0.2.2"),
            a("other.example.com.", "192.0.2.3"),
        ];

        let want: VecDeque<Step> = vec![
            Step::Lookup("a.iana-servers.net.".to_string()),
            Step::Servers(vec!["192.0.2.1".parse().unwrap()]),
            Step::Servers(vec!["192.0.2.2".parse().unwrap()]),
            Step::Lookup("b.iana-servers.net.".to_string()),
        ]
        .into();

        assert_eq!(referrals(&reply), want);
    }

    #[test]
    fn test_referrals_ignores_other_authorities() {
        let mut reply = Message::default();
        reply.authoritys = vec![Record::new(
            "example.com.",
            Class::Internet,
            Duration::from_secs(3600),
            Resource::SOA(SOA {
                mname: "ns.example.com.".to_string(),
                rname: "admin.example.com.".to_string(),
                serial: 1,
                refresh: Duration::from_secs(1),
                retry: Duration::from_secs(1),
                expire: Duration::from_secs(1),
                minimum: Duration::from_secs(1),
            }),
        )];

        assert!(referrals(&reply).is_empty());
    }

    #[test]
    fn test_addresses() {
        let mut reply = Message::query(1, "ns.example.com.", Type::A);
        reply.qr = QR::Response;
        reply.answers = vec![
            a("ns.example.com.", "192.0.2.1"),
            Record::new(
                "ns.example.com.",
                Class::Internet,
                Duration::from_secs(60),
                Resource::AAAA("2001:db8::1".parse().unwrap()),
            ),
            a("ns.example.com.", "192.0.2.2"),
        ];

        let response = reply.to_vec().unwrap();
        assert_eq!(
            addresses(&response),
            vec![
                "192.0.2.1".parse::<IpAddr>().unwrap(),
                "192.0.2.2".parse::<IpAddr>().unwrap()
            ]
        );

        assert!(addresses(&[0, 1, 2]).is_empty());
    }
}
