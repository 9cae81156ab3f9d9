//! Fuzz target for the GUI address parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_address_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use yasync_config::Address;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(address) = s.parse::<Address>() {
            // A parsed address must survive its own rendering.
            let reparsed: Address = address
                .to_string()
                .parse()
                .expect("rendered address must parse");
            assert_eq!(address, reparsed);
        }
    }
});
