//! Channel user-mode parsing.
//!
//! The engine only tracks mode changes that grant or revoke a member
//! standing (owner, admin, op, halfop, voice). Everything else in a MODE
//! line is skipped.

use crate::event::UserModeChange;

/// Mode letters that take a nickname argument and are reported.
pub const NICK_ARG_MODES: &[char] = &['q', 'a', 'o', 'h', 'v'];

/// Walk a mode sequence like `+ov-h` and pair the tracked letters with
/// their nickname arguments.
///
/// A letter before any `+`/`-` counts as removal. Tracked letters stop
/// consuming once the arguments run out. Untracked letters never consume
/// an argument.
pub fn parse_user_mode_changes(mode_seq: &str, args: &[&str]) -> Vec<UserModeChange> {
    let mut added = false;
    let mut args = args.iter().copied();
    let mut changes = Vec::new();

    for c in mode_seq.chars() {
        match c {
            '+' => added = true,
            '-' => added = false,
            _ if NICK_ARG_MODES.contains(&c) => {
                if let Some(nick) = args.next() {
                    changes.push(UserModeChange {
                        added,
                        mode: c,
                        nick: nick.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    changes
}
