// Process a Zone File turning it into actual Records.

use crate::name::fqdn;
use crate::resource::*;
use crate::zones::Entry;
use crate::zones::File;
use crate::Class;
use crate::Record;
use crate::Resource;
use crate::{Error, Result};
use core::time::Duration;

impl File {
    /// Resolves the relative names and the fields left out of each record,
    /// returning fully qualified [`crate::Record`]s.
    ///
    /// A record without a name uses the previous record's name, without a
    /// class the previous record's class (or IN), and without a TTL the
    /// last `$TTL`.
    pub fn into_records(self) -> Result<Vec<Record>> {
        let mut results = Vec::<Record>::new();

        // Useful to refer to:
        // https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
        // https://datatracker.ietf.org/doc/html/rfc2308#section-4

        let mut origin: Option<String> = self.origin;
        let mut default_ttl: Option<Duration> = None;

        let mut last_name: Option<String> = None;
        let mut last_class: Option<Class> = None;

        for entry in self.entries {
            match entry {
                Entry::Origin(new_origin) => {
                    if !new_origin.ends_with('.') {
                        return Err(Error::Zone(format!(
                            "$ORIGIN '{}' is not a absolute domain",
                            new_origin
                        )));
                    }
                    origin = Some(new_origin)
                }
                Entry::TTL(ttl) => default_ttl = Some(ttl),
                Entry::Record(record) => {
                    let origin = origin.as_deref();

                    let name = match record.name {
                        Some(name) => resolve_name(&name, origin)?,
                        None => last_name.clone().ok_or_else(|| {
                            Error::Zone("first record has no domain".to_string())
                        })?,
                    };
                    last_name = Some(name.clone());

                    let ttl = record.ttl.or(default_ttl).ok_or_else(|| {
                        Error::Zone(format!("'{}' has no ttl, and there is no $TTL", name))
                    })?;

                    let class = record.class.or(last_class).unwrap_or(Class::Internet);
                    last_class = Some(class);

                    results.push(Record {
                        resource: resolve_resource(record.resource, origin)?,
                        name,
                        class,
                        ttl,
                    })
                }
            }
        }

        Ok(results)
    }
}

/// Turns a name as written in the zone file into a fully qualified one.
fn resolve_name(name: &str, origin: Option<&str>) -> Result<String> {
    // Absolute domain name
    if name.ends_with('.') {
        return Ok(name.to_string());
    }

    // Everything past here requires a origin
    let origin = origin.ok_or_else(|| {
        Error::Zone(format!("relative domain '{}' without a $ORIGIN", name))
    })?;

    if name == "@" {
        return Ok(fqdn(origin));
    }

    // Relative domain name
    if origin == "." {
        Ok(name.to_owned() + ".")
    } else {
        Ok(name.to_owned() + "." + &fqdn(origin))
    }
}

fn resolve_resource(resource: Resource, origin: Option<&str>) -> Result<Resource> {
    Ok(match resource {
        // These types don't include a domain, so kept as is.
        Resource::A(_) | Resource::AAAA(_) | Resource::TXT(_) | Resource::Unknown(_, _) => {
            resource
        }

        // The rest need some kind of tweaking
        Resource::CNAME(domain) => Resource::CNAME(resolve_name(&domain, origin)?),
        Resource::NS(domain) => Resource::NS(resolve_name(&domain, origin)?),
        Resource::MX(mx) => Resource::MX(MX {
            preference: mx.preference,
            exchange: resolve_name(&mx.exchange, origin)?,
        }),
        Resource::SOA(soa) => Resource::SOA(SOA {
            mname: resolve_name(&soa.mname, origin)?,
            rname: resolve_name(&soa.rname, origin)?,
            ..soa
        }),
    })
}
