//! Zone files, and answering questions from them.
use crate::name::fqdn;
use crate::zones::parser::Rule;
use crate::zones::parser::ZoneParser;
use crate::zones::preprocessor::preprocess;
use crate::Class;
use crate::Resource;
use crate::{Error, Result};
use pest_consume::Parser;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::Display;

pub use self::zone::{Lookup, Zone, ZoneLookup, Zones};

mod parser;
mod preprocessor;
mod process;
mod zone;

extern crate pest;

/// A Zone File. This is the unprocessed version of the zone file
/// where domains such as "@" have not yet been resolved, and fields
/// are optional. To turn this into [`Vec<crate::Record>`] call
/// [`File::into_records`].
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    /// The origin as defined when creating the Zone File. This is different than
    /// a origin set within the zone file. Always absolute, with a trailing dot.
    pub origin: Option<String>,

    /// The list of Entries within the Zone File.
    pub entries: Vec<Entry>,
}

impl File {
    pub fn new(origin: Option<String>, entries: Vec<Entry>) -> File {
        File {
            origin: origin.map(|domain| fqdn(&domain)),
            entries,
        }
    }

    /// Parse a full zone file, with relative names resolved against
    /// `origin` until a `$ORIGIN` says otherwise.
    pub fn parse(origin: Option<&str>, input: &str) -> Result<File> {
        let input = preprocess(input).map_err(|e| Error::Zone(e.to_string()))?;

        let inputs =
            ZoneParser::parse(Rule::file, &input).map_err(|e| Error::Zone(e.to_string()))?;
        let input = inputs.single().map_err(|e| Error::Zone(e.to_string()))?;

        ZoneParser::file(input)
            .map(|entries| File::new(origin.map(str::to_string), entries))
            .map_err(|e| Error::Zone(e.to_string()))
    }
}

impl FromStr for File {
    type Err = Error;

    /// Parse a full zone file.
    ///
    /// ```
    /// use iterdns::Resource;
    /// use iterdns::zones::{File, Entry, Record};
    /// use std::str::FromStr;
    ///
    /// let file = File::from_str("$ORIGIN example.com.\n www  A   192.0.2.1").unwrap();
    /// assert_eq!(file, File::new(None, vec![
    ///   Entry::Origin("example.com.".to_string()),
    ///   Entry::Record(Record {
    ///     name: Some("www".to_string()),
    ///     ttl: None,
    ///     class: None,
    ///     resource: Resource::A("192.0.2.1".parse().unwrap()),
    ///   }),
    /// ]));
    /// ```
    fn from_str(input: &str) -> Result<Self> {
        File::parse(None, input)
    }
}

/// Internal struct for capturing each entry.
#[derive(Clone, Debug, Display, PartialEq)]
pub enum Entry {
    Origin(String),
    TTL(Duration),
    Record(Record),
}

/// Very similar to a [`crate::Record`] but allows for
/// optional values. When parsing a full zone file
/// those options can be derived from previous entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: Option<String>,
    pub ttl: Option<Duration>,
    pub class: Option<Class>,
    pub resource: Resource,
}

impl FromStr for Record {
    type Err = Error;

    /// Parse a single zone file resource record.
    ///
    /// For example:
    ///
    /// ```
    /// use iterdns::Resource;
    /// use iterdns::zones::Record;
    /// use std::str::FromStr;
    ///
    /// let record = Record::from_str("example.com.  A   192.0.2.1").unwrap();
    /// assert_eq!(record, Record {
    ///   name: Some("example.com.".to_string()),
    ///   ttl: None,
    ///   class: None,
    ///   resource: Resource::A("192.0.2.1".parse().unwrap()),
    /// });
    /// ```
    ///
    /// This function is mostly useful for test code, or quickly parsing a
    /// single record. Please prefer to use [`File::from_str`] to parse full files.
    fn from_str(input: &str) -> Result<Self> {
        let inputs =
            ZoneParser::parse(Rule::single_record, input).map_err(|e| Error::Zone(e.to_string()))?;
        let input = inputs.single().map_err(|e| Error::Zone(e.to_string()))?;

        ZoneParser::single_record(input).map_err(|e| Error::Zone(e.to_string()))
    }
}
