//! IRC message types and parsing.
//!
//! [`Message`] is the owned, decoded form of one IRC line: optional IRCv3
//! tags, optional prefix, a command token, and its parameters (the trailing
//! parameter, when present, is the final element of `params`).

mod parse;
pub mod tags;
mod types;

pub use self::parse::decode_relaxed;
pub use self::types::{Message, Tag};
