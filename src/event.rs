//! Events produced by the protocol engine.
//!
//! Every server message the engine understands is translated into an
//! [`Event`] and delivered through the channel handed out at connect time.
//! Messages the engine does not understand still surface as
//! [`Event::Status`] so nothing the server says is silently dropped.

use chrono::{DateTime, Utc};

use crate::message::Tag;

/// A single user-mode change applied to a channel member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserModeChange {
    /// `true` for `+`, `false` for `-`.
    pub added: bool,
    /// The mode letter (one of `q`, `a`, `o`, `h`, `v`).
    pub mode: char,
    /// The affected nickname.
    pub nick: String,
}

/// Aggregated WHOIS data, flushed when the end-of-WHOIS numeric arrives.
///
/// Fields stay `None` (or empty) when the server never sent the
/// corresponding numeric.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WhoisInfo {
    /// Username from RPL_WHOISUSER (311).
    pub user: Option<String>,
    /// Hostname from RPL_WHOISUSER (311).
    pub host: Option<String>,
    /// Realname from RPL_WHOISUSER (311).
    pub realname: Option<String>,
    /// Server from RPL_WHOISSERVER (312).
    pub server: Option<String>,
    /// Server description from RPL_WHOISSERVER (312).
    pub server_info: Option<String>,
    /// Idle seconds from RPL_WHOISIDLE (317).
    pub idle: Option<u64>,
    /// Signon time (Unix seconds) from RPL_WHOISIDLE (317).
    pub signon: Option<u64>,
    /// Channel memberships from RPL_WHOISCHANNELS (319).
    pub channels: Vec<String>,
    /// Services account from RPL_WHOISACCOUNT (330).
    pub account: Option<String>,
    /// Real host from RPL_WHOISACTUALLY (338).
    pub actually: Option<String>,
}

/// Protocol events delivered to the consumer.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// Connection lifecycle notes and any server line without a dedicated
    /// event. The string is human-readable.
    Status(String),
    /// PRIVMSG to a channel or to us.
    Message {
        /// Sender nickname (or server name for server notices).
        nick: String,
        /// The channel or nick the message was addressed to.
        target: String,
        /// Message body.
        text: String,
        /// Server-supplied `time` tag when present, receive time otherwise.
        ts: DateTime<Utc>,
        /// All message tags, already unescaped.
        tags: Vec<Tag>,
    },
    /// A complete NAMES list for one channel.
    Names {
        /// Channel name.
        channel: String,
        /// Nicknames, possibly carrying prefix sigils like `@` or `+`.
        nicks: Vec<String>,
    },
    /// A user joined a channel.
    Joined { channel: String, nick: String },
    /// A user left a channel.
    Parted { channel: String, nick: String },
    /// A user disconnected from the network.
    Quit { nick: String },
    /// A user changed nickname.
    NickChanged { old: String, new: String },
    /// One WHO result line (WHOX form, channel and nick only).
    Who { channel: String, nick: String },
    /// One WHO result line (standard 352 form, full detail).
    WhoDetail {
        channel: String,
        nick: String,
        user: String,
        host: String,
        realname: String,
        /// `true` when the flags marked the user away.
        away: bool,
    },
    /// Channel user-mode changes (op, voice and friends).
    ModeUsers {
        channel: String,
        changes: Vec<UserModeChange>,
    },
    /// away-notify: a user went away (`Some`) or came back (`None`).
    Away {
        nick: String,
        message: Option<String>,
    },
    /// account-notify: a user logged in (`Some`) or out (`None`).
    Account {
        nick: String,
        account: Option<String>,
    },
    /// chghost: a user's username or hostname changed.
    ChgHost {
        nick: String,
        user: String,
        host: String,
    },
    /// setname: a user changed their realname.
    SetName { nick: String, realname: String },
    /// A server response correlated to a labeled request.
    Labeled {
        /// The `label` tag value.
        label: String,
        /// The response command or numeric.
        command: String,
        /// Response parameters as received.
        params: Vec<String>,
        /// All tags on the response.
        tags: Vec<Tag>,
    },
    /// Aggregated WHOIS response, one event per queried nick.
    Whois { nick: String, info: WhoisInfo },
    /// MONITOR targets that came online (730).
    MonitorOnline(Vec<String>),
    /// MONITOR targets that went offline (731).
    MonitorOffline(Vec<String>),
}

impl Event {
    /// Build a status event from anything stringish.
    pub(crate) fn status(text: impl Into<String>) -> Self {
        Self::Status(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whois_info_default_is_empty() {
        let info = WhoisInfo::default();
        assert!(info.user.is_none());
        assert!(info.channels.is_empty());
        assert!(info.idle.is_none());
    }

    #[test]
    fn test_status_helper() {
        assert_eq!(
            Event::status("connected"),
            Event::Status("connected".to_string())
        );
    }
}
