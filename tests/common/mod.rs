// A fake network of name servers, for testing resolution without sockets.
#![allow(dead_code)]

use iterdns::clients::Exchanger;
use iterdns::types::*;
use iterdns::{Error, Message, Record, Resource, Result};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

type Behaviour = Box<dyn Fn(&Message) -> Result<Message> + Send + Sync>;

/// Servers that are not in the network time out.
#[derive(Default)]
pub struct MockNetwork {
    servers: HashMap<IpAddr, Behaviour>,

    /// Every query sent, in order.
    calls: Mutex<Vec<(IpAddr, String, Type)>>,
}

impl MockNetwork {
    pub fn new() -> MockNetwork {
        MockNetwork::default()
    }

    pub fn server<F>(mut self, ip: &str, behaviour: F) -> MockNetwork
    where
        F: Fn(&Message) -> Result<Message> + Send + Sync + 'static,
    {
        self.servers.insert(ip.parse().unwrap(), Box::new(behaviour));
        self
    }

    pub fn calls(&self) -> Vec<(IpAddr, String, Type)> {
        self.calls.lock().unwrap().clone()
    }

    /// The servers asked, in order.
    pub fn asked(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(ip, name, r#type)| format!("{} {} {}", ip, name, r#type))
            .collect()
    }
}

impl Exchanger for MockNetwork {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>> {
        let query = Message::from_slice(query)?;
        let question = &query.questions[0];

        self.calls
            .lock()
            .unwrap()
            .push((server.ip(), question.name.clone(), question.r#type));

        match self.servers.get(&server.ip()) {
            Some(behaviour) => behaviour(&query)?.to_vec(),
            None => Err(Error::UpstreamTimeout(server)),
        }
    }
}

pub fn a(name: &str, ip: &str) -> Record {
    Record::new(
        name,
        Class::Internet,
        Duration::from_secs(300),
        Resource::A(ip.parse().unwrap()),
    )
}

pub fn ns(zone: &str, host: &str) -> Record {
    Record::new(
        zone,
        Class::Internet,
        Duration::from_secs(172800),
        Resource::NS(host.to_string()),
    )
}

/// A reply with the given answers.
pub fn answer(query: &Message, answers: Vec<Record>) -> Message {
    let mut reply = Message::response_to(query);
    reply.aa = true;
    reply.ra = false;
    reply.answers = answers;
    reply
}

/// A reply delegating to name servers, each with optional glue.
pub fn referral(query: &Message, zone: &str, servers: &[(&str, Option<&str>)]) -> Message {
    let mut reply = Message::response_to(query);
    reply.ra = false;

    for (host, glue) in servers {
        reply.authoritys.push(ns(zone, host));
        if let Some(ip) = glue {
            reply.additionals.push(a(host, ip));
        }
    }
    reply
}
