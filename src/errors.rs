use crate::types::Type;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors returned by this crate.
///
/// The upstream variants (`UpstreamTimeout`, `UpstreamIdMismatch` and
/// `TruncatedResponse`) are expected during recursive resolution. They make
/// the resolver move on to the next candidate server, and are only ever logged.
#[derive(Error, Debug)]
pub enum Error {
    /// The bytes did not decode as a DNS message.
    #[error("malformed message: {0}")]
    MalformedMessage(#[source] io::Error),

    #[error("name '{0}' is too long")]
    NameTooLong(String),

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Record type code outside of [`Type`]. Records of this type are kept as
    /// opaque bytes.
    #[error("unsupported type {0}")]
    UnsupportedType(u16),

    #[error("timed out waiting for {0}")]
    UpstreamTimeout(SocketAddr),

    #[error("response id {got} does not match query id {expected}")]
    UpstreamIdMismatch { expected: u16, got: u16 },

    #[error("truncated response from {0}")]
    TruncatedResponse(SocketAddr),

    /// Every candidate server and delegation was tried without an answer.
    #[error("unable to resolve {name} {qtype}")]
    ResolutionExhausted { name: String, qtype: Type },

    #[error("zone: {0}")]
    Zone(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returns early with a `io::Error` of the given `io::ErrorKind`.
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {{
        return Err(std::io::Error::new(
            std::io::ErrorKind::$kind,
            format!($($arg)*),
        ))
    }}
}
