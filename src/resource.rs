//! Resource record data (rdata) types, and how they are written to the wire.
use crate::name::write_qname;
use crate::types::{Class, Record, Resource, Type};
use crate::{Error, Result};
use std::convert::TryInto;
use std::time::Duration;

/// Mail EXchange (MX) record.
#[derive(Clone, Debug, PartialEq)]
pub struct MX {
    /// Lower values are preferred.
    pub preference: u16,

    /// A host willing to act as a mail exchange for the owner name.
    pub exchange: String,
}

/// Start Of Authority (SOA) record.
#[derive(Clone, Debug, PartialEq)]
pub struct SOA {
    /// The name server that was the original or primary source of data for
    /// this zone.
    pub mname: String,

    /// The mailbox of the person responsible for this zone, in its domain
    /// name form (e.g "hostmaster.example.com.").
    pub rname: String,

    pub serial: u32,

    pub refresh: Duration,
    pub retry: Duration,
    pub expire: Duration,
    pub minimum: Duration,
}

/// One or more character-strings of a TXT record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TXT(pub Vec<Vec<u8>>);

impl From<&str> for TXT {
    fn from(txt: &str) -> Self {
        TXT(vec![txt.as_bytes().to_vec()])
    }
}

impl From<&[&str]> for TXT {
    fn from(txts: &[&str]) -> Self {
        TXT(txts.iter().map(|txt| txt.as_bytes().to_vec()).collect())
    }
}

impl Resource {
    /// Returns the [`Type`] of this resource.
    pub fn r#type(&self) -> Type {
        match self {
            Resource::A(_) => Type::A,
            Resource::AAAA(_) => Type::AAAA,
            Resource::CNAME(_) => Type::CNAME,
            Resource::NS(_) => Type::NS,
            Resource::TXT(_) => Type::TXT,
            Resource::MX(_) => Type::MX,
            Resource::SOA(_) => Type::SOA,
            Resource::Unknown(code, _) => Type::from_u16(*code),
        }
    }

    /// Appends the wire encoding of this resource (without the rdata length)
    /// to `buf`. Names are always written out in full.
    pub(crate) fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Resource::A(ip) => buf.extend_from_slice(&ip.octets()),
            Resource::AAAA(ip) => buf.extend_from_slice(&ip.octets()),

            Resource::CNAME(name) | Resource::NS(name) => write_qname(buf, name)?,

            Resource::MX(mx) => {
                buf.extend_from_slice(&mx.preference.to_be_bytes());
                write_qname(buf, &mx.exchange)?;
            }

            Resource::SOA(soa) => {
                write_qname(buf, &soa.mname)?;
                write_qname(buf, &soa.rname)?;
                buf.extend_from_slice(&soa.serial.to_be_bytes());
                for d in &[soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    buf.extend_from_slice(&secs(*d).to_be_bytes());
                }
            }

            Resource::TXT(txt) => {
                for s in &txt.0 {
                    let len: u8 = match s.len().try_into() {
                        Ok(len) => len,
                        Err(_) => {
                            return Err(Error::InvalidRecord(format!(
                                "TXT string of {} bytes is longer than 255",
                                s.len()
                            )))
                        }
                    };
                    buf.push(len);
                    buf.extend_from_slice(s);
                }
            }

            Resource::Unknown(_, data) => buf.extend_from_slice(data),
        }

        Ok(())
    }
}

impl Record {
    pub fn new(name: &str, class: Class, ttl: Duration, resource: Resource) -> Record {
        Record {
            name: name.to_string(),
            class,
            ttl,
            resource,
        }
    }

    /// Returns the [`Type`] of this record.
    pub fn r#type(&self) -> Type {
        self.resource.r#type()
    }

    /// Appends the full wire encoding of this record to `buf`.
    pub(crate) fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        write_qname(buf, &self.name)?;

        buf.extend_from_slice(&self.r#type().to_u16().to_be_bytes());
        buf.extend_from_slice(&self.class.to_u16().to_be_bytes());
        buf.extend_from_slice(&secs(self.ttl).to_be_bytes());

        // The length is only known once the rdata is written, so reserve
        // two bytes and patch them afterwards.
        let len_pos = buf.len();
        buf.extend_from_slice(&[0, 0]);

        self.resource.write(buf)?;

        let len: u16 = match (buf.len() - len_pos - 2).try_into() {
            Ok(len) => len,
            Err(_) => {
                return Err(Error::InvalidRecord(format!(
                    "rdata for '{}' is longer than 65535 bytes",
                    self.name
                )))
            }
        };
        buf[len_pos..len_pos + 2].copy_from_slice(&len.to_be_bytes());

        Ok(())
    }
}

/// Durations are written as 32 bit seconds, saturating.
fn secs(d: Duration) -> u32 {
    d.as_secs().try_into().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_rdata() {
        let tests: Vec<(Resource, Vec<u8>)> = vec![
            (Resource::A("93.184.216.34".parse().unwrap()), vec![93, 184, 216, 34]),
            (
                Resource::NS("a.b.".to_string()),
                vec![1, b'a', 1, b'b', 0],
            ),
            (
                Resource::MX(MX {
                    preference: 10,
                    exchange: "mx.".to_string(),
                }),
                vec![0, 10, 2, b'm', b'x', 0],
            ),
            (Resource::TXT(TXT::from("hi")), vec![2, b'h', b'i']),
            (Resource::Unknown(99, vec![1, 2, 3]), vec![1, 2, 3]),
        ];

        for (resource, want) in tests {
            let mut got = Vec::new();
            resource.write(&mut got).expect("failed to write");
            assert_eq!(got, want, "writing {:?}", resource);
        }
    }

    #[test]
    fn test_write_long_txt() {
        let long = "x".repeat(256);
        let mut buf = Vec::new();
        assert!(matches!(
            Resource::TXT(TXT::from(long.as_str())).write(&mut buf),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_record_length_patched() {
        let record = Record::new(
            "example.com.",
            Class::Internet,
            Duration::from_secs(300),
            Resource::CNAME("www.example.com.".to_string()),
        );
        let mut buf = Vec::new();
        record.write(&mut buf).expect("failed to write");

        // name (13) + type/class/ttl (8) + rdlength (2) + rdata (17)
        assert_eq!(buf.len(), 13 + 8 + 2 + 17);
        assert_eq!(&buf[21..23], &[0, 17]);
        assert_eq!(&buf[13..15], &Type::CNAME.to_u16().to_be_bytes());
        assert_eq!(&buf[17..21], &300u32.to_be_bytes());
    }
}
