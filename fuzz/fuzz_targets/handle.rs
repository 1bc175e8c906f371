#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate iterdns;

use iterdns::clients::{Exchanger, Resolver};
use iterdns::zones::{Zone, Zones};
use iterdns::{Config, Error, Handler};
use std::net::SocketAddr;

/// Every upstream server times out, so only local answers succeed.
struct Silent;

impl Exchanger for Silent {
    fn exchange(&self, server: SocketAddr, _query: &[u8]) -> Result<Vec<u8>, Error> {
        Err(Error::UpstreamTimeout(server))
    }
}

fuzz_target!(|data: &[u8]| {
    let zone = Zone::parse("example.com", "$TTL 60\n@ SOA ns admin 1 2 3 4 5\nwww A 192.0.2.1")
        .expect("bad zone");

    let config = Config {
        root_servers: vec!["192.0.2.53".parse().unwrap()],
        ..Config::default()
    };

    let handler = Handler::new(
        Zones::new(vec![zone]),
        Resolver::new_with_client(Silent, &config),
    );

    let _ = handler.handle(data);
});
