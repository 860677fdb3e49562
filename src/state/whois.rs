//! WHOIS reply aggregation.
//!
//! WHOIS answers arrive as a burst of numerics (311, 312, 317, 319, 330,
//! 338) closed by 318. Fields are collected per nick and released as a
//! single [`Event::Whois`] when the end numeric arrives.

use std::collections::HashMap;

use crate::event::{Event, WhoisInfo};
use crate::Message;

use super::{Action, ClientState};

/// Per-nick WHOIS field collector.
#[derive(Clone, Debug, Default)]
pub struct WhoisAccumulator {
    pending: HashMap<String, WhoisInfo>,
}

impl WhoisAccumulator {
    pub(crate) fn entry(&mut self, nick: &str) -> &mut WhoisInfo {
        self.pending.entry(nick.to_string()).or_default()
    }

    /// Remove and return the collected info, defaulting when the end
    /// numeric arrives without any preceding fields.
    pub(crate) fn finish(&mut self, nick: &str) -> WhoisInfo {
        self.pending.remove(nick).unwrap_or_default()
    }
}

impl ClientState {
    pub(super) fn handle_whois_field(&mut self, message: &Message) {
        let nick = match message.arg(1) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return,
        };

        match message.command.as_str() {
            "311" => {
                // <nick> <user> <host> * :<realname>
                if let (Some(user), Some(host)) = (message.arg(2), message.arg(3)) {
                    let info = self.whois.entry(&nick);
                    info.user = Some(user.to_string());
                    info.host = Some(host.to_string());
                    info.realname = Some(message.arg(5).unwrap_or("").to_string());
                }
            }
            "312" => {
                // <nick> <server> :<server info>
                if let Some(server) = message.arg(2) {
                    let info = self.whois.entry(&nick);
                    info.server = Some(server.to_string());
                    info.server_info = Some(message.arg(3).unwrap_or("").to_string());
                }
            }
            "317" => {
                // <nick> <idle> <signon> :seconds idle, signon time
                let info = self.whois.entry(&nick);
                info.idle = parse_seconds(message.arg(2));
                info.signon = parse_seconds(message.arg(3));
            }
            "319" => {
                // <nick> :<channels>
                let channels = message
                    .arg(2)
                    .map(|list| list.split_whitespace().map(String::from).collect())
                    .unwrap_or_default();
                self.whois.entry(&nick).channels = channels;
            }
            "330" => {
                // <nick> <account> :is logged in as
                self.whois.entry(&nick).account = message.arg(2).map(String::from);
            }
            "338" => {
                // Shape varies by daemon; the trailing carries the host text.
                if message.params.len() > 2 {
                    self.whois.entry(&nick).actually = message.params.last().cloned();
                }
            }
            _ => {}
        }
    }

    pub(super) fn handle_whois_end(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let nick = match message.arg(1) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return,
        };
        let info = self.whois.finish(&nick);
        actions.push(Action::emit(Event::Whois { nick, info }));
    }
}

/// Parse a numeric field, rejecting anything with non-digit characters.
fn parse_seconds(value: Option<&str>) -> Option<u64> {
    value
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
}
