//! # slirc-client
//!
//! A Rust library implementing the client side of the IRC protocol,
//! with full support for IRCv3 extensions.
//!
//! ## Features
//!
//! - IRC message parsing with tags, prefixes, commands, and parameters
//! - IRCv3 capability negotiation (CAP LS 302) and SASL PLAIN
//! - server-time, BATCH, labeled-response, away/account/chghost handling
//! - Multi-numeric WHOIS aggregation into a single record
//! - A protocol state machine that can be driven without a socket
//! - Optional Tokio integration: TCP/TLS transport, codec, and a
//!   connected client handle

#![deny(clippy::all)]
// TODO: Enable once documentation coverage is complete
// #![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating IRC Messages
//!
//! ```rust
//! use slirc_client::{Message, prefix::Prefix};
//!
//! // Basic message construction
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! let join = Message::join("#channel");
//!
//! // Messages with IRCv3 tags and prefixes
//! let tagged_msg = Message::privmsg("#dev", "Tagged message")
//!     .with_tag("time", Some("2023-01-01T12:00:00Z"))
//!     .with_prefix(Prefix::new_from_str("bot!bot@example.com"));
//!
//! println!("{}", tagged_msg); // Serializes to IRC protocol format
//! ```
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use slirc_client::Message;
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! if let Some(tags) = &message.tags {
//!     println!("Message has {} tags", tags.len());
//! }
//! ```
//!
//! ### Connecting
//!
//! ```no_run
//! use slirc_client::{Client, Event, ServerProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut profile = ServerProfile::new("libera", "irc.libera.chat", "rustbot");
//!     profile.channels = vec!["#rust".to_string()];
//!
//!     let (client, mut events) = Client::connect(profile).await?;
//!     while let Some(event) = events.recv().await {
//!         if let Event::Message { nick, text, .. } = event {
//!             println!("<{}> {}", nick, text);
//!         }
//!     }
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate. We are grateful for Aaron's
//! foundational work on IRC protocol handling in Rust.

pub mod caps;
pub mod error;
pub mod event;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod profile;
pub mod sasl;

pub use self::caps::Capability;
pub use self::event::{Event, UserModeChange, WhoisInfo};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_IRC_LINE_LEN};
pub use self::message::{Message, Tag};
pub use self::mode::parse_user_mode_changes;
pub use self::prefix::Prefix;
pub use self::profile::ServerProfile;
pub use self::sasl::{encode_plain, SaslState};

pub mod ircv3;
pub use self::ircv3::parse_server_time;

pub mod state;
pub use self::state::{Action, ClientState, NegotiationPhase};

#[cfg(feature = "tokio")]
pub mod transport;
#[cfg(feature = "tokio")]
pub use self::transport::Transport;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub use self::client::Client;
