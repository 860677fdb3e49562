//! Fuzz target for IRC prefix parsing
//!
//! Feeds arbitrary strings to the prefix parser; it must classify every
//! input as either a server name or a user mask without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }

        let prefix = slirc_client::Prefix::new_from_str(input);

        // Accessors must stay total on whatever was parsed
        let _ = prefix.nick();
        let _ = prefix.user();
        let _ = prefix.host();
        let _ = prefix.name();
    }
});
