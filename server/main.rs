// Runs the name server.
// iterdns-server {zones} {address} {port}
use clap::Parser;
use iterdns::zones::Zones;
use iterdns::{Config, Server};
use log::{error, info};
use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "iterdns-server")]
#[command(about = "Answers from local zone files, and resolves everything else from the root servers")]
struct Args {
    /// Directory of `<origin>.conf` zone files
    zones: PathBuf,

    /// Address to listen on
    address: IpAddr,

    /// Port to listen on
    port: u16,

    /// How long to wait for each upstream server, in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Maximum nesting of referrals and name server lookups
    #[arg(long, default_value_t = 32)]
    max_depth: usize,

    /// Port to query upstream servers on
    #[arg(long, default_value_t = 53)]
    upstream_port: u16,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = Config {
        zones: args.zones,
        bind: SocketAddr::new(args.address, args.port),
        timeout: Duration::from_millis(args.timeout_ms),
        max_depth: args.max_depth,
        upstream_port: args.upstream_port,

        ..Config::default()
    };

    let zones = match Zones::load_dir(&config.zones) {
        Ok(zones) => zones,
        Err(e) => {
            error!("failed to read zones from {}: {}", config.zones.display(), e);
            process::exit(1);
        }
    };
    info!("loaded {} zones", zones.len());

    let server = match Server::bind(&config, zones) {
        Ok(server) => server,
        Err(e) => {
            error!("failed to listen on {}: {}", config.bind, e);
            process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!("{}", e);
        process::exit(1);
    }
}
