#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate iterdns;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must encode again.
    if let Ok(m) = iterdns::Message::from_slice(data) {
        let _ = m.to_vec();
    }
});
