//! Various traits to help parsing of DNS messages.

use crate::bail;
use crate::types::{Class, Type};
use byteorder::{ReadBytesExt, BE};
use std::io;
use std::io::Cursor;
use std::io::SeekFrom;

/// Maximum length of a encoded domain name, including the length prefixes
/// and the terminating zero. See [rfc1035#section-2.3.4].
///
/// [rfc1035#section-2.3.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum number of compression pointers followed while reading one name.
pub const MAX_POINTER_HOPS: usize = 64;

pub trait SeekExt: io::Seek {
    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;

        // reset position
        self.seek(SeekFrom::Start(pos))?;

        Ok(len - pos)
    }
}

impl<'a> SeekExt for Cursor<&'a [u8]> {
    fn remaining(self: &mut std::io::Cursor<&'a [u8]>) -> io::Result<u64> {
        let len = self.get_ref().len() as u64;

        Ok(len.saturating_sub(self.position()))
    }
}

/// All types that implement `Read` and `Seek` get methods defined
/// in `DNSReadExt` for free.
impl<R: io::Read + ?Sized + io::Seek> DNSReadExt for R {}

/// Extensions to io::Read to add some DNS specific types.
pub trait DNSReadExt: io::Read + io::Seek {
    /// Reads a domain name from a DNS message, following any compression
    /// pointers. Returns the fully qualified name, ending in a dot.
    ///
    /// Every pointer must point strictly before the start of the name (or
    /// name suffix) it was found in, and at most [`MAX_POINTER_HOPS`] are
    /// followed, so a malicious message can not make this loop.
    ///
    /// # Errors
    ///
    /// Will return a io::Error(InvalidData) if the read domain name is invalid, or
    /// a more general io::Error on any other read failure.
    fn read_qname(&mut self) -> io::Result<String> {
        let mut qname = String::new();
        let mut start = self.stream_position()?;

        // Where to continue once the name is read, if we jumped away.
        let mut resume = None;
        let mut hops = 0;

        // The root's terminating zero.
        let mut encoded_len = 1;

        // Read each label one at a time, to build up the full domain name.
        loop {
            // Length of the first label
            let len = self.read_u8()?;
            if len == 0 {
                break;
            }

            match len & 0xC0 {
                // No compression
                0x00 => {
                    encoded_len += 1 + len as usize;
                    if encoded_len > MAX_NAME_LEN {
                        bail!(InvalidData, "name longer than {} bytes", MAX_NAME_LEN);
                    }

                    let mut label = vec![0; len.into()];
                    self.read_exact(&mut label)?;

                    // Really this is meant to be ASCII, but we read as utf8
                    // (as that what Rust provides).
                    let label = match std::str::from_utf8(&label) {
                        Err(e) => bail!(InvalidData, "invalid label: {}", e),
                        Ok(s) => s,
                    };

                    if !label.is_ascii() {
                        bail!(InvalidData, "invalid label '{:}': not valid ascii", label);
                    }

                    qname.push_str(label);
                    qname.push('.');
                }

                // Compression
                0xC0 => {
                    // Read the 14 bit pointer.
                    let b2 = self.read_u8()? as u16;
                    let ptr = ((len as u16 & 0x3F) << 8 | b2) as u64;

                    // Make sure we don't get into a loop.
                    if ptr >= start {
                        bail!(
                            InvalidData,
                            "invalid compressed pointer to {} from name starting at {}",
                            ptr,
                            start
                        );
                    }

                    hops += 1;
                    if hops > MAX_POINTER_HOPS {
                        bail!(InvalidData, "more than {} compressed pointers", MAX_POINTER_HOPS);
                    }

                    // We are going to jump backwards, so record where the
                    // name ends, to continue from there later.
                    if resume.is_none() {
                        resume = Some(self.stream_position()?);
                    }

                    self.seek(SeekFrom::Start(ptr))?;
                    start = ptr;
                }

                // Unknown
                _ => bail!(
                    InvalidData,
                    "unsupported compression type {0:b}",
                    len & 0xC0
                ),
            }
        }

        if let Some(pos) = resume {
            self.seek(SeekFrom::Start(pos))?;
        }

        if qname.is_empty() {
            qname.push('.') // Root domain
        }

        Ok(qname)
    }

    /// Reads a DNS Type. Unassigned codes are kept as [`Type::Unknown`].
    fn read_type(&mut self) -> io::Result<Type> {
        Ok(Type::from_u16(self.read_u16::<BE>()?))
    }

    /// Reads a DNS Class. Unassigned codes are kept as [`Class::Unknown`].
    fn read_class(&mut self) -> io::Result<Class> {
        Ok(Class::from_u16(self.read_u16::<BE>()?))
    }
}
