use crate::name::{fqdn, same_name};
use crate::zones::File;
use crate::{Record, Resource, Result, Type};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Outcome of looking a question up in local zone data.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    /// Records of the name and type (all types for [`Type::ANY`]).
    Found(Vec<Record>),

    /// The name exists but has no records of the type. Holds the zone's
    /// SOA records, for the authority section.
    WrongType(Vec<Record>),

    /// No zone knows the name.
    NoSuchName,
}

/// Something that can answer questions from local data.
pub trait ZoneLookup {
    fn lookup(&self, name: &str, r#type: Type) -> Lookup;
}

/// The records loaded from one zone file.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    origin: String,
    records: Vec<Record>,
}

impl Zone {
    pub fn new(origin: &str, records: Vec<Record>) -> Zone {
        Zone {
            origin: fqdn(origin),
            records,
        }
    }

    /// Parses and processes zone file text, with `origin` as the
    /// initial `$ORIGIN`.
    ///
    /// ```
    /// use iterdns::zones::{Lookup, Zone, ZoneLookup};
    /// use iterdns::Type;
    ///
    /// let zone = Zone::parse("example.com", "$TTL 60\nwww A 192.0.2.1").unwrap();
    /// match zone.lookup("WWW.example.com.", Type::A) {
    ///     Lookup::Found(records) => assert_eq!(records.len(), 1),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn parse(origin: &str, input: &str) -> Result<Zone> {
        let records = File::parse(Some(origin), input)?.into_records()?;
        Ok(Zone::new(origin, records))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The SOA records owned by the zone's origin.
    pub fn soa(&self) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| matches!(r.resource, Resource::SOA(_)) && same_name(&r.name, &self.origin))
            .cloned()
            .collect()
    }
}

impl ZoneLookup for Zone {
    fn lookup(&self, name: &str, r#type: Type) -> Lookup {
        let mut named = self
            .records
            .iter()
            .filter(|r| same_name(&r.name, name))
            .peekable();

        if named.peek().is_none() {
            return Lookup::NoSuchName;
        }

        let found: Vec<Record> = named
            .filter(|r| r#type == Type::ANY || r.r#type() == r#type)
            .cloned()
            .collect();

        if found.is_empty() {
            Lookup::WrongType(self.soa())
        } else {
            Lookup::Found(found)
        }
    }
}

/// Every zone the server is authoritative for. Asked in order, the first
/// zone that knows the name decides the outcome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Zones {
    zones: Vec<Zone>,
}

impl Zones {
    pub fn new(zones: Vec<Zone>) -> Zones {
        Zones { zones }
    }

    /// Loads every `*.conf` file in the directory, in file name order. The
    /// file name without the extension is the zone's origin.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Zones> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "conf") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut zones = Vec::new();
        for path in paths {
            let origin = match path.file_stem().and_then(|s| s.to_str()) {
                Some(origin) => origin.to_string(),
                None => {
                    warn!("{}: not a valid zone name", path.display());
                    continue;
                }
            };

            let zone = fs::read_to_string(&path)
                .map_err(Into::into)
                .and_then(|input| Zone::parse(&origin, &input));

            match zone {
                Ok(zone) => {
                    info!(
                        "loaded zone {} with {} records from {}",
                        zone.origin(),
                        zone.records().len(),
                        path.display()
                    );
                    zones.push(zone)
                }
                Err(e) => warn!("{}: skipped: {}", path.display(), e),
            }
        }

        Ok(Zones { zones })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }
}

impl ZoneLookup for Zones {
    fn lookup(&self, name: &str, r#type: Type) -> Lookup {
        for zone in &self.zones {
            match zone.lookup(name, r#type) {
                Lookup::NoSuchName => continue,
                found => return found,
            }
        }

        Lookup::NoSuchName
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Class;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const EXAMPLE_ZONE: &str = "
$TTL 3600
@     IN SOA ns admin ( 1 7200 3600 1209600 300 )
@     IN NS  ns
@     IN A   192.0.2.1
ns    IN A   192.0.2.2
mail  IN MX  10 mx.example.net.
";

    fn a(name: &str, ip: &str) -> Record {
        Record::new(
            name,
            Class::Internet,
            Duration::from_secs(3600),
            Resource::A(ip.parse().unwrap()),
        )
    }

    #[test]
    fn test_lookup() {
        let zone = Zone::parse("example.com", EXAMPLE_ZONE).expect("failed to parse");
        assert_eq!(zone.origin(), "example.com.");
        assert_eq!(zone.soa().len(), 1);

        assert_eq!(
            zone.lookup("ns.example.com.", Type::A),
            Lookup::Found(vec![a("ns.example.com.", "192.0.2.2")])
        );
        assert_eq!(
            zone.lookup("NS.Example.Com", Type::A),
            Lookup::Found(vec![a("ns.example.com.", "192.0.2.2")])
        );
        assert_eq!(zone.lookup("mail.example.com.", Type::A), Lookup::WrongType(zone.soa()));
        assert_eq!(zone.lookup("other.example.com.", Type::A), Lookup::NoSuchName);
        assert_eq!(zone.lookup("example.org.", Type::A), Lookup::NoSuchName);

        match zone.lookup("example.com.", Type::ANY) {
            Lookup::Found(records) => assert_eq!(records.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zones_order() {
        let first = Zone::new("a.test", vec![a("www.a.test.", "192.0.2.1")]);
        let second = Zone::new(
            "test",
            vec![
                a("www.a.test.", "192.0.2.99"),
                a("www.b.test.", "192.0.2.2"),
            ],
        );
        let zones = Zones::new(vec![first, second]);

        assert_eq!(
            zones.lookup("www.a.test.", Type::A),
            Lookup::Found(vec![a("www.a.test.", "192.0.2.1")])
        );
        assert_eq!(
            zones.lookup("www.b.test.", Type::A),
            Lookup::Found(vec![a("www.b.test.", "192.0.2.2")])
        );
        assert_eq!(zones.lookup("www.c.test.", Type::A), Lookup::NoSuchName);

        // The first zone knows the name, so the second is never asked.
        assert_eq!(zones.lookup("www.a.test.", Type::MX), Lookup::WrongType(vec![]));
    }

    #[test]
    fn test_load_dir() {
        let dir = std::env::temp_dir().join(format!("iterdns-zones-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("example.com.conf"), EXAMPLE_ZONE).unwrap();
        fs::write(dir.join("broken.test.conf"), "$TTL 60\nwww A not-an-ip\n").unwrap();
        fs::write(dir.join("ignored.txt"), "not a zone").unwrap();

        let zones = Zones::load_dir(&dir).expect("failed to load");
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(zones.len(), 1);
        assert_eq!(
            zones.lookup("ns.example.com.", Type::A),
            Lookup::Found(vec![a("ns.example.com.", "192.0.2.2")])
        );
    }

    #[test]
    fn test_load_dir_missing() {
        assert!(Zones::load_dir("/this/does/not/exist").is_err());
    }
}
