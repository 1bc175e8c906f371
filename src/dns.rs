use crate::bail;
use crate::io::{DNSReadExt, SeekExt};
use crate::name::{fqdn, write_qname};
use crate::resource::{MX, SOA, TXT};
use crate::types::*;
use crate::{Error, Result};
use byteorder::{ReadBytesExt, BE};
use log::{debug, warn};
use std::io;
use std::io::Cursor;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Size of the fixed header at the start of every message.
pub const HEADER_LEN: usize = 12;

// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &[u8]) -> MessageParser {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message::default(),
        }
    }

    /// Consume the MessageParser and returned the resulting Message.
    fn parse(mut self) -> io::Result<Message> {
        self.m.id = self.cur.read_u16::<BE>()?;

        let b = self.cur.read_u8()?;
        self.m.qr = QR::from_bool(0b1000_0000 & b != 0);
        let opcode = (0b0111_1000 & b) >> 3;
        self.m.aa = (0b0000_0100 & b) != 0;
        self.m.tc = (0b0000_0010 & b) != 0;
        self.m.rd = (0b0000_0001 & b) != 0;

        self.m.opcode = Opcode::from_u8(opcode);

        let b = self.cur.read_u8()?;
        self.m.ra = (0b1000_0000 & b) != 0;
        self.m.z = (0b0111_0000 & b) >> 4;
        let rcode = 0b0000_1111 & b;

        self.m.rcode = Rcode::from_u8(rcode);

        let qd_count = self.cur.read_u16::<BE>()?;
        let an_count = self.cur.read_u16::<BE>()?;
        let ns_count = self.cur.read_u16::<BE>()?;
        let ar_count = self.cur.read_u16::<BE>()?;

        self.read_questions(qd_count)?;
        self.read_records(an_count, RecordSection::Answers)?;
        self.read_records(ns_count, RecordSection::Authorities)?;
        self.read_records(ar_count, RecordSection::Additionals)?;

        let left = self.cur.remaining()?;
        if left > 0 {
            warn!("finished parsing message {} with {} bytes left over", self.m.id, left);
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> io::Result<()> {
        // Don't trust the count to size allocations, each question is at least 5 bytes.
        self.m
            .questions
            .reserve(std::cmp::min(count as u64, self.cur.remaining()? / 5) as usize);

        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_type()?;
            let class = self.cur.read_class()?;

            self.m.questions.push(Question {
                name,
                r#type,
                class,
            });
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> io::Result<()> {
        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let code = self.cur.read_u16::<BE>()?;

            if code == Type::OPT.to_u16() {
                // The class and ttl fields of a OPT record are overloaded, and
                // EDNS(0) is not supported, so skip the whole record.
                self.cur.read_u16::<BE>()?;
                self.cur.read_u32::<BE>()?;
                let len = self.cur.read_u16::<BE>()?;
                self.read_bytes(len.into())?;

                debug!("ignoring EDNS(0) OPT record in message {}", self.m.id);
                continue;
            }

            let class = self.cur.read_class()?;
            let ttl = Duration::from_secs(self.cur.read_u32::<BE>()?.into());
            let len: u64 = self.cur.read_u16::<BE>()?.into();

            let end = self.cur.position() + len;
            if end > self.cur.get_ref().len() as u64 {
                bail!(
                    UnexpectedEof,
                    "record '{}' rdata of {} bytes runs past the end of the message",
                    name,
                    len
                );
            }

            let resource = self.read_resource(&name, Type::from_u16(code), len)?;

            if self.cur.position() != end {
                bail!(
                    InvalidData,
                    "record '{}' of type {} has rdata length {} but {} bytes were read",
                    name,
                    code,
                    len,
                    self.cur.position() + len - end
                );
            }

            let record = Record {
                name,
                class,
                ttl,
                resource,
            };

            match section {
                RecordSection::Answers => self.m.answers.push(record),
                RecordSection::Authorities => self.m.authoritys.push(record),
                RecordSection::Additionals => self.m.additionals.push(record),
            }
        }

        Ok(())
    }

    /// Reads the rdata for the given type. The caller checks that exactly
    /// `len` bytes were consumed.
    fn read_resource(&mut self, name: &str, r#type: Type, len: u64) -> io::Result<Resource> {
        Ok(match r#type {
            Type::A => {
                if len != 4 {
                    bail!(InvalidData, "invalid A record length ({}) expected 4", len);
                }
                Resource::A(Ipv4Addr::from(self.cur.read_u32::<BE>()?))
            }

            Type::AAAA => {
                if len != 16 {
                    bail!(InvalidData, "invalid AAAA record length ({}) expected 16", len);
                }
                Resource::AAAA(Ipv6Addr::from(self.cur.read_u128::<BE>()?))
            }

            Type::NS => Resource::NS(self.cur.read_qname()?),
            Type::CNAME => Resource::CNAME(self.cur.read_qname()?),

            Type::MX => Resource::MX(MX {
                preference: self.cur.read_u16::<BE>()?,
                exchange: self.cur.read_qname()?,
            }),

            Type::SOA => Resource::SOA(SOA {
                mname: self.cur.read_qname()?,
                rname: self.cur.read_qname()?,
                serial: self.cur.read_u32::<BE>()?,
                refresh: Duration::from_secs(self.cur.read_u32::<BE>()?.into()),
                retry: Duration::from_secs(self.cur.read_u32::<BE>()?.into()),
                expire: Duration::from_secs(self.cur.read_u32::<BE>()?.into()),
                minimum: Duration::from_secs(self.cur.read_u32::<BE>()?.into()),
            }),

            Type::TXT => {
                let end = self.cur.position() + len;
                let mut txts = Vec::new();
                while self.cur.position() < end {
                    let len = self.cur.read_u8()?;
                    txts.push(self.read_bytes(len.into())?);
                }
                Resource::TXT(TXT(txts))
            }

            // Neither are valid in a record section.
            Type::OPT | Type::ANY => Resource::Unknown(r#type.to_u16(), self.read_bytes(len)?),

            Type::Unknown(code) => {
                // Not fatal, keep it as opaque bytes.
                debug!("keeping rdata of '{}' as is: {}", name, Error::UnsupportedType(code));
                Resource::Unknown(code, self.read_bytes(len)?)
            }
        })
    }

    fn read_bytes(&mut self, len: u64) -> io::Result<Vec<u8>> {
        if len > self.cur.remaining()? {
            bail!(UnexpectedEof, "wanted {} bytes, only {} remain", len, self.cur.remaining()?);
        }

        let mut buf = vec![0; len as usize];
        std::io::Read::read_exact(&mut self.cur, &mut buf)?;
        Ok(buf)
    }
}

impl Message {
    /// Decodes a DNS message, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    ///
    /// Records of unsupported types are kept as [`Resource::Unknown`].
    ///
    /// # Errors
    ///
    /// [`Error::MalformedMessage`] if the buffer is truncated or otherwise invalid.
    pub fn from_slice(buf: &[u8]) -> Result<Message> {
        MessageParser::new(buf)
            .parse()
            .map_err(Error::MalformedMessage)
    }

    /// Builds a recursion desired query with a single question.
    pub fn query(id: u16, domain: &str, r#type: Type) -> Message {
        let mut m = Message {
            id,
            rd: true,

            ..Default::default()
        };
        m.add_question(domain, r#type, Class::Internet);
        m
    }

    /// Builds an empty response to `query`, with the same id, opcode, RD flag
    /// and questions.
    pub fn response_to(query: &Message) -> Message {
        Message {
            id: query.id,
            qr: QR::Response,
            opcode: query.opcode,
            rd: query.rd,
            ra: true,
            questions: query.questions.clone(),

            ..Default::default()
        }
    }

    pub fn add_question(&mut self, domain: &str, r#type: Type, class: Class) {
        // TODO Don't allow more than 65535 questions.
        let q = Question {
            name: fqdn(domain),
            r#type,
            class,
        };

        self.questions.push(q);
    }

    /// Returns this DNS Message as a Vec<u8> ready to be sent, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    ///
    /// Names are never compressed.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut req = Vec::<u8>::with_capacity(512);

        req.extend_from_slice(&self.id.to_be_bytes());

        let mut b = 0_u8;
        b |= if self.qr.to_bool() { 0b1000_0000 } else { 0 };
        b |= (self.opcode.to_u8() << 3) & 0b0111_1000;
        b |= if self.aa { 0b0000_0100 } else { 0 };
        b |= if self.tc { 0b0000_0010 } else { 0 };
        b |= if self.rd { 0b0000_0001 } else { 0 };
        req.push(b);

        let mut b = 0_u8;
        b |= if self.ra { 0b1000_0000 } else { 0 };
        b |= (self.z << 4) & 0b0111_0000;
        b |= self.rcode.to_u8() & 0b0000_1111;
        req.push(b);

        req.extend_from_slice(&(self.questions.len() as u16).to_be_bytes());
        req.extend_from_slice(&(self.answers.len() as u16).to_be_bytes());
        req.extend_from_slice(&(self.authoritys.len() as u16).to_be_bytes());
        req.extend_from_slice(&(self.additionals.len() as u16).to_be_bytes());

        for question in &self.questions {
            write_qname(&mut req, &question.name)?;

            req.extend_from_slice(&question.r#type.to_u16().to_be_bytes());
            req.extend_from_slice(&question.class.to_u16().to_be_bytes());
        }

        for record in self
            .answers
            .iter()
            .chain(&self.authoritys)
            .chain(&self.additionals)
        {
            record.write(&mut req)?;
        }

        Ok(req)
    }
}

/// Rewrites the transaction id of a encoded message in place.
pub fn set_id(buf: &mut [u8], id: u16) {
    if buf.len() >= 2 {
        buf[0..2].copy_from_slice(&id.to_be_bytes());
    }
}
