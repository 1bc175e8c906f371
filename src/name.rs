// Helpers for domain names. Names are kept as ASCII strings, fully
// qualified with a trailing dot, e.g "example.com.".
use crate::io::{MAX_LABEL_LEN, MAX_NAME_LEN};
use crate::{Error, Result};

/// Returns the name with a trailing dot, the root being ".".
pub fn fqdn(name: &str) -> String {
    if name.is_empty() {
        return ".".to_string();
    }

    let mut name = name.to_string();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}

/// Returns the canonical form of the name, used for comparisons and as
/// cache keys. Domain names are case insensitive.
pub fn normalise(name: &str) -> String {
    fqdn(name).to_ascii_lowercase()
}

/// Compares two names, ignoring case and the trailing dot.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// Returns true if `name` is `origin` or a subdomain of it.
pub fn in_zone(name: &str, origin: &str) -> bool {
    let name = normalise(name);
    let origin = normalise(origin);

    origin == "." || name == origin || name.ends_with(&(".".to_owned() + &origin))
}

/// Writes a domain name into the supplied `Vec<u8>`, as a sequence of
/// length prefixed labels and a terminating zero. Never compresses.
///
/// # Errors
///
/// [`Error::NameTooLong`] if a label is longer than 63 bytes or the encoded
/// name is longer than 255 bytes. [`Error::InvalidName`] for empty labels or
/// non ascii names.
pub(crate) fn write_qname(buf: &mut Vec<u8>, domain: &str) -> Result<()> {
    // On failure nothing of the name is left behind.
    let start = buf.len();
    let result = write_labels(buf, domain);
    if result.is_err() {
        buf.truncate(start);
    }
    result
}

fn write_labels(buf: &mut Vec<u8>, domain: &str) -> Result<()> {
    // Dig's example errors
    // 'aaa....a' is not a legal name (label too long)
    // 'aaa....a' is not a legal name (ran out of space)
    // 'a....a' is not a legal name (empty label)
    let start = buf.len();

    if !domain.is_empty() && domain != "." {
        for label in domain.split_terminator('.') {
            if label.is_empty() || !label.is_ascii() {
                return Err(Error::InvalidName(domain.to_string()));
            }

            if label.len() > MAX_LABEL_LEN {
                return Err(Error::NameTooLong(domain.to_string()));
            }

            // Write the length.
            buf.push(label.len() as u8);

            // Then the actual label.
            buf.extend_from_slice(label.as_bytes());
        }
    }

    buf.push(0);

    if buf.len() - start > MAX_NAME_LEN {
        return Err(Error::NameTooLong(domain.to_string()));
    }

    Ok(())
}
