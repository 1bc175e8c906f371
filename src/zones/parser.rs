// Parses a Zone File following RFC 1035 (section 5).

use crate::resource::{MX, SOA, TXT};
use crate::zones::Entry;
use crate::zones::Record;
use crate::Class;
use crate::Resource;
use pest_consume::match_nodes;
use pest_consume::Error;
use pest_consume::Parser;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser)]
#[grammar = "zones/zones.pest"]
pub(crate) struct ZoneParser;

type Result<T> = std::result::Result<T, Error<Rule>>;
type Node<'i> = pest_consume::Node<'i, Rule, ()>;

#[pest_consume::parser]
impl ZoneParser {
    fn EOI(_input: Node) -> Result<()> {
        Ok(())
    }

    fn ip4(input: Node) -> Result<Ipv4Addr> {
        match Ipv4Addr::from_str(input.as_str()) {
            Ok(ip4) => Ok(ip4),
            Err(e) => Err(input.error(e)),
        }
    }

    fn ip6(input: Node) -> Result<Ipv6Addr> {
        match Ipv6Addr::from_str(input.as_str()) {
            Ok(ip6) => Ok(ip6),
            Err(e) => Err(input.error(e)),
        }
    }

    fn duration(input: Node) -> Result<Duration> {
        // TODO Support unit suffixes (e.g "1d") as BIND does.
        match input.as_str().parse() {
            Ok(i) => Ok(Duration::new(i, 0)),
            Err(e) => Err(input.error(e)),
        }
    }

    /// A quoted character-string, returned without the quotes.
    fn string(input: Node) -> Result<&str> {
        let s = input.as_str();
        Ok(s.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(s))
    }

    fn domain(input: Node) -> Result<&str> {
        Ok(input.as_str())
    }

    fn class(input: Node) -> Result<Class> {
        match input.as_str().parse() {
            Ok(class) => Ok(class),
            Err(e) => Err(input.error(e)),
        }
    }

    fn number<T: std::str::FromStr>(input: Node) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        match input.as_str().parse() {
            Ok(i) => Ok(i),
            Err(e) => Err(input.error(e)),
        }
    }

    #[alias(resource)]
    fn resource_a(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [ip4(ip)] => Resource::A(ip),
        ))
    }

    #[alias(resource)]
    fn resource_aaaa(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [ip6(ip)] => Resource::AAAA(ip),
        ))
    }

    #[alias(resource)]
    fn resource_cname(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [domain(name)] => Resource::CNAME(name.to_string()),
        ))
    }

    #[alias(resource)]
    fn resource_ns(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [domain(name)] => Resource::NS(name.to_string()),
        ))
    }

    #[alias(resource)]
    fn resource_mx(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [number(preference), domain(exchange)] => Resource::MX(MX {
                preference,
                exchange: exchange.to_string()
            }),
        ))
    }

    #[alias(resource)]
    fn resource_soa(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [domain(mname), domain(rname), number(serial), duration(refresh), duration(retry), duration(expire), duration(minimum)] => Resource::SOA(SOA {
                mname: mname.to_string(),
                rname: rname.to_string(),
                serial, refresh, retry, expire, minimum
            }),
        ))
    }

    #[alias(resource)]
    fn resource_txt(input: Node) -> Result<Resource> {
        Ok(match_nodes!(input.into_children();
            [string(strings)..] => Resource::TXT(TXT(
                strings.map(|s| s.as_bytes().to_vec()).collect()
            )),
        ))
    }

    #[alias(entry)]
    fn origin(input: Node) -> Result<Entry> {
        Ok(match_nodes!(input.into_children();
            [domain(d)] => Entry::Origin(d.to_string()),
        ))
    }

    #[alias(entry)]
    fn ttl(input: Node) -> Result<Entry> {
        Ok(match_nodes!(input.into_children();
            [duration(ttl)] => Entry::TTL(ttl),
        ))
    }

    #[alias(entry)]
    fn record(input: Node) -> Result<Entry> {
        Ok(Entry::Record(Self::parse_record(input)?))
    }

    pub fn single_record(input: Node) -> Result<Record> {
        let error = input.error("expected a single record");

        match_nodes!(input.into_children();
            [entry(entry), EOI(_)] => match entry {
                Entry::Record(record) => Ok(record),
                _ => Err(error),
            },
        )
    }

    pub fn file(input: Node) -> Result<Vec<Entry>> {
        Ok(match_nodes!(input.into_children();
            [entry(entries).., EOI(_)] => entries.collect(),
        ))
    }
}

impl ZoneParser {
    // parse_record does the heavy lifting parsing a single record entry.
    // This is in a seperate ZoneParser impl, due to limitations with
    // `#[pest_consume::parser]` which does not allow aliased methods to be
    // called, or used in match_nodes.
    fn parse_record(input: Node) -> Result<Record> {
        let missing = input.error("record has no type or data");

        let mut name = None;
        let mut ttl = None;
        let mut class = None;
        let mut resource = None;

        // We would prefer to use match_nodes! but we need to match the
        // various children in any order. This is due to the near ambigious
        // syntax of the resource record entry.
        for node in input.into_children() {
            let rule = node.as_rule();
            match rule {
                Rule::domain if name.is_none() => name = Some(Self::domain(node)?.to_string()),
                Rule::duration if ttl.is_none() => ttl = Some(Self::duration(node)?),
                Rule::class if class.is_none() => class = Some(Self::class(node)?),

                _ => match Self::rule_alias(rule) {
                    // Rule::resource have many aliases, try one of them.
                    AliasedRule::resource if resource.is_none() => {
                        resource = Some(Self::resource(node)?)
                    }

                    _ => {
                        return Err(node.error(format!(
                            "unexpected {:?} '{}'",
                            rule,
                            node.as_str()
                        )))
                    }
                },
            }
        }

        Ok(Record {
            name,
            ttl,
            class,
            resource: resource.ok_or(missing)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::resource::{MX, SOA, TXT};
    use crate::zones::{Entry, File, Record};
    use crate::{Class, Resource};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use std::time::Duration;

    fn record(
        name: Option<&str>,
        ttl: Option<u64>,
        class: Option<Class>,
        resource: Resource,
    ) -> Record {
        Record {
            name: name.map(str::to_string),
            ttl: ttl.map(Duration::from_secs),
            class,
            resource,
        }
    }

    #[test]
    fn test_single_record() {
        let tests = vec![
            (
                "example.com.  A   192.0.2.1",
                record(
                    Some("example.com."),
                    None,
                    None,
                    Resource::A("192.0.2.1".parse().unwrap()),
                ),
            ),
            (
                "www 3600 IN AAAA 2001:db8:10::1",
                record(
                    Some("www"),
                    Some(3600),
                    Some(Class::Internet),
                    Resource::AAAA("2001:db8:10::1".parse().unwrap()),
                ),
            ),
            (
                "@ IN 60 MX 10 mail",
                record(
                    Some("@"),
                    Some(60),
                    Some(Class::Internet),
                    Resource::MX(MX {
                        preference: 10,
                        exchange: "mail".to_string(),
                    }),
                ),
            ),
            (
                "IN NS ns.example.com.",
                record(
                    None,
                    None,
                    Some(Class::Internet),
                    Resource::NS("ns.example.com.".to_string()),
                ),
            ),
            (
                "alias CNAME www",
                record(
                    Some("alias"),
                    None,
                    None,
                    Resource::CNAME("www".to_string()),
                ),
            ),
            (
                r#"info TXT "hello world" "v=1; two""#,
                record(
                    Some("info"),
                    None,
                    None,
                    Resource::TXT(TXT::from(&["hello world", "v=1; two"][..])),
                ),
            ),
            (
                "@ SOA ns admin ( 1 7200 3600 1209600 300 )",
                record(
                    Some("@"),
                    None,
                    None,
                    Resource::SOA(SOA {
                        mname: "ns".to_string(),
                        rname: "admin".to_string(),
                        serial: 1,
                        refresh: Duration::from_secs(7200),
                        retry: Duration::from_secs(3600),
                        expire: Duration::from_secs(1209600),
                        minimum: Duration::from_secs(300),
                    }),
                ),
            ),
        ];

        for (input, want) in tests {
            match Record::from_str(input) {
                Ok(got) => assert_eq!(got, want, "incorrect result for '{}'", input),
                Err(err) => panic!("'{}' failed:\n{}", input, err),
            }
        }
    }

    #[test]
    fn test_single_record_errors() {
        let tests = vec![
            "",
            "example.com.",
            "example.com. A",
            "example.com. A 192.0.2",
            "example.com. MX mail",
            "example.com. PTR example.net.",
            "example.com. A 192.0.2.1 extra",
        ];

        for input in tests {
            assert!(
                Record::from_str(input).is_err(),
                "'{}' should not have parsed",
                input
            );
        }
    }

    #[test]
    fn test_file() {
        let input = "$ORIGIN example.com.\n\
                     ; a comment on its own\n\
                     \n\
                     $TTL 300\n\
                     www  A   192.0.2.1 ; trailing comment\n\
                     \tIN A 192.0.2.2";

        let want = File::new(
            None,
            vec![
                Entry::Origin("example.com.".to_string()),
                Entry::TTL(Duration::from_secs(300)),
                Entry::Record(record(
                    Some("www"),
                    None,
                    None,
                    Resource::A("192.0.2.1".parse().unwrap()),
                )),
                Entry::Record(record(
                    None,
                    None,
                    Some(Class::Internet),
                    Resource::A("192.0.2.2".parse().unwrap()),
                )),
            ],
        );

        match File::from_str(input) {
            Ok(got) => assert_eq!(got, want),
            Err(err) => panic!("failed:\n{}", err),
        }
    }

    #[test]
    fn test_file_multiline_soa() {
        let input = "@ IN SOA ns.example.com. admin.example.com. (\n\
                     \t2020091025 ; serial\n\
                     \t7200       ; refresh\n\
                     \t3600 1209600 3600 )\n";

        let file = File::from_str(input).expect("failed to parse");
        assert_eq!(file.entries.len(), 1);
        match &file.entries[0] {
            Entry::Record(Record {
                resource: Resource::SOA(soa),
                ..
            }) => {
                assert_eq!(soa.serial, 2020091025);
                assert_eq!(soa.minimum, Duration::from_secs(3600));
            }
            entry => panic!("unexpected entry {:?}", entry),
        }
    }
}
