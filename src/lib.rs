//! A small DNS name server. Questions about names in the local zone files are
//! answered authoritatively, everything else is resolved iteratively starting
//! at the root servers, with answers cached for their TTL.
//!
//! # Example
//!
//! ```rust
//! use iterdns::zones::{Lookup, Zone, ZoneLookup};
//! use iterdns::{Message, Type};
//!
//! let zone = Zone::parse("example.com", "$TTL 60\n@ A 192.0.2.1").unwrap();
//!
//! let query = Message::query(1, "example.com", Type::A);
//! match zone.lookup(&query.questions[0].name, Type::A) {
//!     Lookup::Found(records) => assert_eq!(records.len(), 1),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
pub mod attempts;
pub mod cache;
pub mod clients;
mod config;
mod display;
mod dns;
mod errors;
mod io;
pub mod name;
pub mod resource;
pub mod server;
pub mod types;
pub mod zones;

#[macro_use]
extern crate pest_derive;

pub use crate::types::*;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::config::Config;
#[doc(inline)]
pub use crate::dns::set_id;
#[doc(inline)]
pub use crate::dns::HEADER_LEN;
#[doc(inline)]
pub use crate::errors::{Error, Result};
#[doc(inline)]
pub use crate::io::{MAX_LABEL_LEN, MAX_NAME_LEN, MAX_POINTER_HOPS};
#[doc(inline)]
pub use crate::server::{Handler, Server};
#[doc(inline)]
pub use crate::types::Message;
#[doc(inline)]
pub use crate::types::Question;
#[doc(inline)]
pub use crate::types::Record;
#[doc(inline)]
pub use crate::types::Resource;

#[doc(inline)]
pub use crate::types::Class;

#[doc(inline)]
pub use crate::types::Type;
