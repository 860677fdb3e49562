//! Fuzz target for channel mode-change parsing
//!
//! Treats the first whitespace token as the mode sequence and the rest as
//! mode arguments; the walker must never panic or consume out of bounds.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }

        let mut tokens = input.split_whitespace();
        let mode_seq = tokens.next().unwrap_or("");
        let args: Vec<&str> = tokens.collect();

        let changes = slirc_client::parse_user_mode_changes(mode_seq, &args);

        // Every reported change must reference one of the supplied args
        for change in &changes {
            assert!(args.contains(&change.nick.as_str()));
        }
    }
});
