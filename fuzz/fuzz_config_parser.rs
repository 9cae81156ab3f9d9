//! Fuzz target for the daemon's XML configuration reader.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use std::path::PathBuf;

use libfuzzer_sys::fuzz_target;
use yasync_config::{Overrides, SessionDescriptor};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let path = PathBuf::from("/fuzz/config.xml");
        if let Ok(session) = SessionDescriptor::from_xml(path, s, &Overrides::none()) {
            // Rendering must not panic on anything the reader accepted.
            let _ = session.to_string();
        }
    }
});
