use crate::name::normalise;
use crate::types::Type;
use std::collections::HashSet;
use std::net::IpAddr;

/// Records which (name, type, server) combinations have been asked during
/// one top-level resolution, so delegations that lead back to a server
/// already asked don't loop forever.
///
/// A new `Attempts` must be used for every client request. Sharing one
/// between requests would stop a server from ever being asked the same
/// question again.
#[derive(Debug, Default)]
pub struct Attempts {
    tried: HashSet<(String, Type, IpAddr)>,
}

impl Attempts {
    pub fn new() -> Attempts {
        Attempts::default()
    }

    /// Marks `server` as asked about (`name`, `type`).
    ///
    /// Returns true if it had already been marked, in which case it should
    /// not be asked again.
    pub fn try_mark(&mut self, name: &str, r#type: Type, server: IpAddr) -> bool {
        !self.tried.insert((normalise(name), r#type, server))
    }

    /// Number of distinct attempts made.
    pub fn len(&self) -> usize {
        self.tried.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tried.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_try_mark() {
        let mut attempts = Attempts::new();
        let server: IpAddr = "198.41.0.4".parse().unwrap();
        let other: IpAddr = "199.9.14.201".parse().unwrap();

        assert!(!attempts.try_mark("example.com.", Type::A, server));
        assert!(attempts.try_mark("example.com.", Type::A, server));
        assert!(attempts.try_mark("EXAMPLE.com", Type::A, server));

        // Any part changing makes it a different attempt.
        assert!(!attempts.try_mark("example.com.", Type::AAAA, server));
        assert!(!attempts.try_mark("example.com.", Type::A, other));
        assert!(!attempts.try_mark("www.example.com.", Type::A, server));

        assert_eq!(attempts.len(), 4);
    }
}
