//! Message-to-event dispatch.
//!
//! Translates chat traffic, membership changes, and query replies into
//! [`Event`]s. Handlers tolerate short parameter lists by dropping the
//! message rather than emitting partial events, except where noted.

use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::ircv3::parse_server_time;
use crate::mode::parse_user_mode_changes;
use crate::Message;

use super::{Action, ClientState};

impl ClientState {
    pub(super) fn handle_privmsg(
        &mut self,
        message: &Message,
        now: DateTime<Utc>,
        actions: &mut Vec<Action>,
    ) {
        let (target, text) = match (message.arg(0), message.arg(1)) {
            (Some(target), Some(text)) => (target.to_string(), text.to_string()),
            _ => return,
        };
        let ts = message
            .server_time()
            .and_then(parse_server_time)
            .unwrap_or(now);
        actions.push(Action::emit(Event::Message {
            nick: source_nick(message),
            target,
            text,
            ts,
            tags: message.tags.clone().unwrap_or_default(),
        }));
    }

    pub(super) fn handle_join(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let channel = match message.arg(0) {
            Some(channel) => channel.to_string(),
            None => return,
        };
        actions.push(Action::emit(Event::Joined {
            channel,
            nick: source_nick(message),
        }));
    }

    pub(super) fn handle_part(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let channel = match message.arg(0) {
            Some(channel) => channel.to_string(),
            None => return,
        };
        actions.push(Action::emit(Event::Parted {
            channel,
            nick: source_nick(message),
        }));
    }

    pub(super) fn handle_quit(&mut self, message: &Message, actions: &mut Vec<Action>) {
        actions.push(Action::emit(Event::Quit {
            nick: source_nick(message),
        }));
    }

    pub(super) fn handle_nick(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let new = match message.arg(0) {
            Some(new) => new.to_string(),
            None => return,
        };
        actions.push(Action::emit(Event::NickChanged {
            old: source_nick(message),
            new,
        }));
    }

    pub(super) fn handle_chghost(&mut self, message: &Message, actions: &mut Vec<Action>) {
        actions.push(Action::emit(Event::ChgHost {
            nick: source_nick(message),
            user: message.arg(0).unwrap_or("").to_string(),
            host: message.arg(1).unwrap_or("").to_string(),
        }));
    }

    pub(super) fn handle_setname(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let realname = match message.arg(0) {
            Some(realname) => realname.to_string(),
            None => return,
        };
        actions.push(Action::emit(Event::SetName {
            nick: source_nick(message),
            realname,
        }));
    }

    pub(super) fn handle_away(&mut self, message: &Message, actions: &mut Vec<Action>) {
        actions.push(Action::emit(Event::Away {
            nick: source_nick(message),
            message: message.arg(0).map(String::from),
        }));
    }

    pub(super) fn handle_account(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let account = match message.arg(0) {
            Some(account) => account.trim(),
            None => return,
        };
        // "*" and "0" both mean logged out, depending on the daemon.
        let account = match account {
            "*" | "0" => None,
            name => Some(name.to_string()),
        };
        actions.push(Action::emit(Event::Account {
            nick: source_nick(message),
            account,
        }));
    }

    /// Channel mode changes affecting users, e.g. `MODE #chan +ov a b`.
    ///
    /// User-mode changes on our own nick are not surfaced.
    pub(super) fn handle_mode(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let target = message.arg(0).unwrap_or("");
        if !target.starts_with('#') && !target.starts_with('&') {
            return;
        }
        let mode_seq = match message.arg(1) {
            Some(seq) => seq,
            None => return,
        };
        let args: Vec<&str> = message.params.iter().skip(2).map(String::as_str).collect();
        let changes = parse_user_mode_changes(mode_seq, &args);
        if !changes.is_empty() {
            actions.push(Action::emit(Event::ModeUsers {
                channel: target.to_string(),
                changes,
            }));
        }
    }

    /// RPL_WHOREPLY: `<me> <channel> <user> <host> <server> <nick> <flags>
    /// :<hop> <realname>`.
    pub(super) fn handle_who_reply(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let fields = (
            message.arg(1),
            message.arg(2),
            message.arg(3),
            message.arg(5),
            message.arg(6),
        );
        let (channel, user, host, nick, flags) = match fields {
            (Some(c), Some(u), Some(h), Some(n), Some(f)) => (c, u, h, n, f),
            _ => return,
        };
        let away = flags.contains('G') && !flags.contains('H');
        let realname = strip_hopcount(message.arg(7).unwrap_or("")).to_string();
        actions.push(Action::emit(Event::WhoDetail {
            channel: channel.to_string(),
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
            realname,
            away,
        }));
    }

    /// RPL_WHOSPCRPL: field layout depends on the WHOX field mask, so the
    /// channel and nick are located heuristically.
    pub(super) fn handle_whox_reply(&mut self, message: &Message, actions: &mut Vec<Action>) {
        if message.params.len() < 2 {
            return;
        }
        let channel = message.params[1..]
            .iter()
            .find(|p| p.starts_with('#') || p.starts_with('&'))
            .unwrap_or(&message.params[1])
            .clone();
        let nick = message
            .params
            .iter()
            .rev()
            .find(|p| !p.contains(' '))
            .cloned();
        let nick = match nick {
            Some(nick) => nick,
            None => return,
        };
        actions.push(Action::emit(Event::Who { channel, nick }));
    }

    /// RPL_NAMREPLY: `<me> <symbol> <channel> :<prefixed nicks>`.
    ///
    /// Entries keep their status prefixes; interpreting them is left to
    /// the consumer. Replies tagged with an open batch are buffered until
    /// that batch closes.
    pub(super) fn handle_names_reply(&mut self, message: &Message, actions: &mut Vec<Action>) {
        if message.params.len() < 2 {
            return;
        }
        let channel = message.params[message.params.len() - 2].clone();
        let nicks: Vec<String> = message
            .params
            .last()
            .map(|list| list.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        if let Some(reference) = message.batch_tag() {
            if let Some(batch) = self.batches.get_mut(reference) {
                batch.buffer_names(&channel, nicks);
                return;
            }
        }
        actions.push(Action::emit(Event::Names { channel, nicks }));
    }

    pub(super) fn handle_batch(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let ident = match message.arg(0) {
            Some(ident) => ident,
            None => return,
        };
        if let Some(reference) = ident.strip_prefix('+') {
            self.batches.open(reference, message.arg(1).unwrap_or(""));
        } else if let Some(reference) = ident.strip_prefix('-') {
            if let Some(batch) = self.batches.close(reference) {
                for (channel, nicks) in batch.take_names() {
                    if !nicks.is_empty() {
                        actions.push(Action::emit(Event::Names { channel, nicks }));
                    }
                }
            }
        }
    }

    /// RPL_MONONLINE / RPL_MONOFFLINE: `<me> :nick[!user@host][,...]`.
    pub(super) fn handle_monitor(
        &mut self,
        message: &Message,
        online: bool,
        actions: &mut Vec<Action>,
    ) {
        let payload = message.arg(1).unwrap_or("");
        let nicks: Vec<String> = payload
            .split(',')
            .map(|entry| entry.split('!').next().unwrap_or("").trim())
            .filter(|nick| !nick.is_empty())
            .map(String::from)
            .collect();
        if nicks.is_empty() {
            return;
        }
        let event = if online {
            Event::MonitorOnline(nicks)
        } else {
            Event::MonitorOffline(nicks)
        };
        actions.push(Action::emit(event));
    }
}

fn source_nick(message: &Message) -> String {
    message.source_name().unwrap_or("").to_string()
}

/// Drop the leading hop-count token a WHO realname field carries.
fn strip_hopcount(realname: &str) -> &str {
    match realname.split_once(' ') {
        Some((hops, rest)) if !hops.is_empty() && hops.bytes().all(|b| b.is_ascii_digit()) => rest,
        _ => realname,
    }
}
