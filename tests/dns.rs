use iterdns::resource::{MX, SOA, TXT};
use iterdns::types::*;
use iterdns::{set_id, Error, Message, Record, Resource};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn record(name: &str, resource: Resource) -> Record {
    Record::new(name, Class::Internet, Duration::from_secs(3600), resource)
}

/// A response using every record type we understand.
fn full_response() -> Message {
    let mut m = Message::query(0xbeef, "example.com.", Type::ANY);
    m.qr = QR::Response;
    m.aa = true;
    m.ra = true;

    m.answers = vec![
        record("example.com.", Resource::A("93.184.216.34".parse().unwrap())),
        record(
            "example.com.",
            Resource::AAAA("2606:2800:220:1:248:1893:25c8:1946".parse().unwrap()),
        ),
        record("www.example.com.", Resource::CNAME("example.com.".to_string())),
        record(
            "example.com.",
            Resource::MX(MX {
                preference: 10,
                exchange: "mail.example.com.".to_string(),
            }),
        ),
        record(
            "example.com.",
            Resource::SOA(SOA {
                mname: "ns.icann.org.".to_string(),
                rname: "noc.dns.icann.org.".to_string(),
                serial: 2021071901,
                refresh: Duration::from_secs(7200),
                retry: Duration::from_secs(3600),
                expire: Duration::from_secs(1209600),
                minimum: Duration::from_secs(3600),
            }),
        ),
        record(
            "example.com.",
            Resource::TXT(TXT::from(&["v=spf1 -all", "second string"][..])),
        ),
        record("example.com.", Resource::Unknown(99, vec![1, 2, 3, 4])),
    ];
    m.authoritys = vec![record(
        "example.com.",
        Resource::NS("a.iana-servers.net.".to_string()),
    )];
    m.additionals = vec![record(
        "a.iana-servers.net.",
        Resource::A("199.43.135.53".parse().unwrap()),
    )];

    m
}

#[test]
fn test_round_trip() {
    let m = full_response();

    let buf = m.to_vec().expect("failed to encode");
    let got = Message::from_slice(&buf).expect("failed to decode");

    assert_eq!(got, m);
}

#[test]
fn test_compressed_names() {
    // example.com. A, and www.example.com. CNAME example.com. with both
    // names in the answers pointing back at the question.
    let compressed = hex::decode(concat!(
        "0001818000010002000000",
        "00",
        "076578616d706c6503636f6d0000010001",
        "c00c000100010000 0e1000045db8d822",
        "03777777c00c0005000100000e100002c00c",
    )
    .replace(' ', ""))
    .unwrap();

    let mut want = Message::query(1, "example.com.", Type::A);
    want.qr = QR::Response;
    want.ra = true;
    want.answers = vec![
        record("example.com.", Resource::A("93.184.216.34".parse().unwrap())),
        record("www.example.com.", Resource::CNAME("example.com.".to_string())),
    ];

    let got = Message::from_slice(&compressed).expect("failed to decode");
    assert_eq!(got, want);

    // Written back without compression, it decodes to the same message.
    let uncompressed = want.to_vec().unwrap();
    assert!(uncompressed.len() > compressed.len());
    assert_eq!(Message::from_slice(&uncompressed).unwrap(), got);
}

#[test]
fn test_pointer_loops() {
    let tests = vec![
        // Question name points at itself.
        "000101000001000000000000c00c00010001",
        // Question name points forward.
        "000101000001000000000000c00e0001000100",
        // Points past the end.
        "000101000001000000000000c0ff00010001",
    ];

    for input in tests {
        let buf = hex::decode(input).unwrap();
        match Message::from_slice(&buf) {
            Err(Error::MalformedMessage(_)) => (),
            other => panic!("{}: expected a malformed message, got {:?}", input, other),
        }
    }
}

#[test]
fn test_name_limits() {
    // 63 is the longest label.
    let label = "a".repeat(63);
    let m = Message::query(1, &format!("{}.com.", label), Type::A);
    assert!(m.to_vec().is_ok());

    let m = Message::query(1, &format!("{}a.com.", label), Type::A);
    match m.to_vec() {
        Err(Error::NameTooLong(_)) => (),
        other => panic!("expected name too long, got {:?}", other),
    }

    // Four 63 byte labels encode to 257 bytes.
    let name = vec![label.as_str(); 4].join(".") + ".";
    let m = Message::query(1, &name, Type::A);
    match m.to_vec() {
        Err(Error::NameTooLong(_)) => (),
        other => panic!("expected name too long, got {:?}", other),
    }

    // The same name on the wire is rejected when decoding.
    let mut buf = hex::decode("000101000001000000000000").unwrap();
    for _ in 0..4 {
        buf.push(63);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.extend_from_slice(&[0, 0, 1, 0, 1]);
    assert!(Message::from_slice(&buf).is_err());
}

#[test]
fn test_truncated_input() {
    let buf = full_response().to_vec().unwrap();

    // Every prefix must fail cleanly, never panic.
    for len in 0..buf.len() {
        assert!(
            Message::from_slice(&buf[..len]).is_err(),
            "prefix of {} bytes decoded",
            len
        );
    }
}

#[test]
fn test_set_id() {
    let mut buf = full_response().to_vec().unwrap();
    set_id(&mut buf, 0x0102);

    let m = Message::from_slice(&buf).unwrap();
    assert_eq!(m.id, 0x0102);
    assert_eq!(m.answers, full_response().answers);
}

#[test]
fn test_display() {
    let got = format!("{}", full_response());

    for want in &[
        "example.com.",
        "93.184.216.34",
        "mail.example.com.",
        "a.iana-servers.net.",
    ] {
        assert!(got.contains(want), "'{}' missing from:\n{}", want, got);
    }
}
