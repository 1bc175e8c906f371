use crate::resource::{MX, SOA, TXT};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use strum_macros::{AsRefStr, EnumString};

/// DNS Message that serves as the root of all DNS requests and responses.
///
/// # Examples
///
/// For constructing a query and encoding:
///
/// ```rust
/// use iterdns::types::*;
/// use iterdns::Message;
///
/// // Construct a simple recursion desired query.
/// let m = Message::query(0xeccb, "bramp.net", Type::A);
///
/// // Encode the query as a Vec<u8>.
/// let req = m.to_vec().expect("failed to encode DNS request");
///
/// // Take a Vec<u8> and turn it back into a message.
/// let m = Message::from_slice(&req).expect("invalid message");
/// assert_eq!(m.questions[0].name, "bramp.net.");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    /// 16-bit identifier assigned by the program that generates any kind of
    /// query. This identifier is copied into the corresponding reply and can be
    /// used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// Recursion Desired - this bit directs the name server to pursue the query
    /// recursively.
    pub rd: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Authoritative Answer - Specifies that the responding name server is an
    /// authority for the domain name in question section.
    pub aa: bool,

    /// Specifies kind of query in this message. 0 represents a standard query.
    /// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
    pub opcode: Opcode,

    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Response code.
    pub rcode: Rcode,

    /// Z Reserved for future use (3 bits). Carried as is.
    pub z: u8,

    /// Recursion Available - this be is set or cleared in a response, and
    /// denotes whether recursive query support is available in the name server.
    pub ra: bool,

    /// The questions.
    pub questions: Vec<Question>,

    /// The answer records.
    pub answers: Vec<Record>,

    /// The authoritive records.
    pub authoritys: Vec<Record>,

    /// The additional records.
    pub additionals: Vec<Record>,
}

/// DNS Question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Question {
    /// A fully qualified domain name, ending in a dot.
    pub name: String,
    pub r#type: Type,
    pub class: Class,
}

/// Resource Record (RR)
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: String,

    pub class: Class,

    /// The number of seconds that the resource record may be cached
    /// before the source of the information should again be consulted.
    /// Zero is interpreted to mean that the RR can only be used for the
    /// transaction in progress.
    pub ttl: Duration,

    pub resource: Resource,
}

#[derive(Copy, Clone, Debug, EnumString, PartialEq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Implements the conversions to and from the wire code of a field, keeping
/// unassigned codes as `Unknown` so they survive a decode and re-encode.
/// Unknown codes are displayed with the given prefix, as per [rfc3597].
///
/// [rfc3597]: https://datatracker.ietf.org/doc/html/rfc3597
macro_rules! wire_codes {
    ($name:ident, $int:ty, $from:ident, $to:ident, $prefix:literal, { $($variant:ident = $code:literal,)* }) => {
        impl $name {
            /// Returns the value for this wire code.
            pub fn $from(code: $int) -> $name {
                match code {
                    $($code => $name::$variant,)*
                    _ => $name::Unknown(code),
                }
            }

            /// Returns the wire code.
            pub fn $to(self) -> $int {
                match self {
                    $($name::$variant => $code,)*
                    $name::Unknown(code) => code,
                }
            }
        }

        impl From<$int> for $name {
            fn from(code: $int) -> Self {
                $name::$from(code)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $name::Unknown(code) => f.pad(&format!(concat!($prefix, "{}"), code)),
                    _ => f.pad(self.as_ref()),
                }
            }
        }
    };
}

/// Specifies kind of query in this message. See [rfc1035], [rfc6895] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    /// Query.
    Query,

    /// Inverse Query (OBSOLETE). See [rfc3425].
    ///
    /// [rfc3425]: https://datatracker.ietf.org/doc/html/rfc3425
    IQuery,
    Status,

    /// See [rfc1996]
    ///
    /// [rfc1996]: https://datatracker.ietf.org/doc/html/rfc1996
    Notify,

    /// See [rfc2136]
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    Update,

    /// DNS Stateful Operations (DSO). See [rfc8490]
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSO,

    /// 3 and 7-15, unassigned. Only the low 4 bits are written.
    #[strum(disabled)]
    Unknown(u8),
}

wire_codes!(Opcode, u8, from_u8, to_u8, "OPCODE", {
    Query = 0,
    IQuery = 1,
    Status = 2,
    Notify = 4,
    Update = 5,
    DSO = 6,
});

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

/// Response Codes.
/// See [rfc1035] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6>
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rcode {
    /// No Error
    NoError,

    /// Format Error
    FormErr,

    /// Server Failure
    ServFail,

    /// Non-Existent Domain
    NXDomain,

    /// Not Implemented
    NotImp,

    /// Query Refused
    Refused,

    /// Name Exists when it should not. See [rfc2136] and [rfc6672].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    /// [rfc6672]: https://datatracker.ietf.org/doc/html/rfc6672
    YXDomain,

    /// RR Set Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXRRSet,

    /// RR Set that should exist does not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NXRRSet,

    /// Not Authoritative. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotAuth,

    /// Name not contained in zone. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotZone,

    /// DSO-TYPE Not Implemented. See [rfc8490].
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSOTYPENI,

    /// 12-15, unassigned. Only the low 4 bits are written.
    #[strum(disabled)]
    Unknown(u8),
}

wire_codes!(Rcode, u8, from_u8, to_u8, "RCODE", {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NXDomain = 3,
    NotImp = 4,
    Refused = 5,
    YXDomain = 6,
    YXRRSet = 7,
    NXRRSet = 8,
    NotAuth = 9,
    NotZone = 10,
    DSOTYPENI = 11,
});

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

/// Resource Record Type, for example, A, CNAME or SOA.
///
/// Types without rdata parsing (PTR, SRV, HTTPS, ...) are carried as
/// `Unknown` with their code, so they can still be asked and answered.
///
// When adding a Type, a parsing function must be added in dns.rs, and
// a writing function in resource.rs.
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Type {
    /// (Default) IPv4 Address.
    A,
    NS,
    CNAME,
    SOA,

    /// Mail exchange.
    MX,

    /// Text strings.
    TXT,

    /// IPv6 Address.
    AAAA,

    /// EDNS(0) Opt type. See [rfc6891]. Only skipped over, never stored.
    ///
    /// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
    OPT,

    /// Any record type.
    /// Only valid as a Question Type.
    ANY,

    /// Any other type code. Displayed as `TYPE<code>`.
    #[strum(disabled)]
    Unknown(u16),
}

wire_codes!(Type, u16, from_u16, to_u16, "TYPE", {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    OPT = 41,
    ANY = 255,
});

impl Default for Type {
    fn default() -> Self {
        Type::A
    }
}

/// Resource Record Class, for example Internet.
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq)]
pub enum Class {
    /// Reserved per [RFC6895]
    ///
    /// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
    Reserved,

    /// (Default) The Internet (IN), see [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "IN")]
    Internet,

    /// CSNET (CS), obsolete (used only for examples in some obsolete RFCs).
    #[strum(serialize = "CS")]
    CsNet,

    /// Chaosnet (CH), obsolete LAN protocol created at MIT in the mid-1970s.
    #[strum(serialize = "CH")]
    Chaos,

    /// Hesiod (HS), an information service developed by MIT's Project Athena.
    #[strum(serialize = "HS")]
    Hesiod,

    None, // NONE [RFC2136]

    /// * (ANY) See [rfc1035]
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "*")]
    Any,

    //     5-253     Unassigned
    //   256-65279   Unassigned
    // 65280-65534   Reserved for Private Use    [RFC6895]
    // 65535         Reserved    [RFC6895]
    #[strum(disabled)]
    Unknown(u16),
}

wire_codes!(Class, u16, from_u16, to_u16, "CLASS", {
    Reserved = 0,
    Internet = 1,
    CsNet = 2,
    Chaos = 3,
    Hesiod = 4,
    None = 254,
    Any = 255,
});

impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}

// This should be kept in sync with Type.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Resource {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),

    CNAME(String),
    NS(String),

    TXT(TXT),

    MX(MX),
    SOA(SOA),

    /// Any type we don't understand, kept as the type code and raw rdata.
    Unknown(u16, Vec<u8>),
}
