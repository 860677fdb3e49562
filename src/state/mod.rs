//! Sans-IO protocol state machine for one IRC connection.
//!
//! This module consumes decoded [`Message`]s and produces [`Action`]s: lines
//! to send back to the server and [`Event`]s to deliver to the consumer. It
//! performs no I/O of its own.
//!
//! # Design Philosophy
//!
//! The state machine is designed to be:
//! - **Sans-IO**: No network calls, timers, or blocking. Pure state transitions.
//! - **Runtime-agnostic**: Works with tokio, async-std, or blocking code.
//! - **Testable**: Easy to unit test without mocking network.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use slirc_client::state::{Action, ClientState};
//! use slirc_client::{Message, ServerProfile};
//!
//! let profile = ServerProfile::new("example", "irc.example.org", "testbot");
//! let mut state = ClientState::new(profile);
//!
//! // Initial burst: CAP LS 302, NICK, USER plus status events.
//! let actions = state.start();
//! assert!(actions
//!     .iter()
//!     .any(|a| matches!(a, Action::Send(m) if m.command == "CAP")));
//!
//! // Feed server responses.
//! let ack: Message = ":server CAP * ACK :multi-prefix".parse().unwrap();
//! let actions = state.feed(&ack, Utc::now());
//! # let _ = actions;
//! ```

mod dispatch;
mod negotiate;
mod whois;

pub use negotiate::NegotiationPhase;

pub(crate) use negotiate::CapabilityState;
pub(crate) use whois::WhoisAccumulator;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::ircv3::BatchRegistry;
use crate::profile::ServerProfile;
use crate::sasl::SaslState;
use crate::Message;

/// Actions produced by the state machine.
///
/// The caller is responsible for carrying them out: transmitting `Send`
/// messages and delivering `Emit` events.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Send this message to the server.
    ///
    /// Boxed to reduce enum size variance (Message is large).
    Send(Box<Message>),
    /// Deliver this event to the consumer.
    Emit(Box<Event>),
}

impl Action {
    pub(crate) fn send(message: Message) -> Self {
        Self::Send(Box::new(message))
    }

    pub(crate) fn emit(event: Event) -> Self {
        Self::Emit(Box::new(event))
    }

    pub(crate) fn status(text: impl Into<String>) -> Self {
        Self::emit(Event::Status(text.into()))
    }
}

/// Protocol engine state for a single connection.
///
/// Tracks capability negotiation, SASL progress, open batches, and WHOIS
/// aggregation. Drive it with [`start`](Self::start) once, then
/// [`feed`](Self::feed) for every decoded server message.
#[derive(Clone, Debug)]
pub struct ClientState {
    pub(crate) profile: ServerProfile,
    pub(crate) phase: NegotiationPhase,
    pub(crate) caps: CapabilityState,
    pub(crate) sasl: SaslState,
    pub(crate) welcome_received: bool,
    pub(crate) joined_initial: bool,
    pub(crate) batches: BatchRegistry,
    pub(crate) whois: WhoisAccumulator,
}

impl ClientState {
    /// Create engine state for the given profile.
    #[must_use]
    pub fn new(profile: ServerProfile) -> Self {
        Self {
            profile,
            phase: NegotiationPhase::Idle,
            caps: CapabilityState::default(),
            sasl: SaslState::default(),
            welcome_received: false,
            joined_initial: false,
            batches: BatchRegistry::new(),
            whois: WhoisAccumulator::default(),
        }
    }

    /// The profile this connection was built from.
    #[must_use]
    pub fn profile(&self) -> &ServerProfile {
        &self.profile
    }

    /// Current negotiation phase.
    #[must_use]
    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    /// Capabilities acknowledged by the server so far.
    #[must_use]
    pub fn active_caps(&self) -> &BTreeSet<String> {
        &self.caps.active
    }

    /// Whether a capability was acknowledged by the server.
    #[must_use]
    pub fn has_cap(&self, name: &str) -> bool {
        self.caps.active.contains(name)
    }

    /// Whether CAP END has been sent.
    #[must_use]
    pub fn negotiation_ended(&self) -> bool {
        self.caps.ended
    }

    /// Whether the welcome numeric (001) has been seen.
    #[must_use]
    pub fn welcome_received(&self) -> bool {
        self.welcome_received
    }

    /// Begin registration. Returns the initial burst to transmit.
    #[must_use]
    pub fn start(&mut self) -> Vec<Action> {
        self.phase = NegotiationPhase::LsPending;
        vec![
            Action::status("starting CAP negotiation (LS 302)"),
            Action::send(Message::cap_ls()),
            Action::send(Message::nick(self.profile.nick.clone())),
            Action::send(Message::user(
                self.profile.user.clone(),
                self.profile.realname.clone(),
            )),
            Action::status("registering (NICK/USER sent)"),
        ]
    }

    /// Feed one decoded server message.
    ///
    /// `now` is the receive time, used when a message carries no
    /// server-time tag. Returns actions in the order they must be carried
    /// out.
    #[must_use]
    pub fn feed(&mut self, message: &Message, now: DateTime<Utc>) -> Vec<Action> {
        let mut actions = Vec::new();
        let command = message.command.to_ascii_uppercase();

        // PING is answered and never surfaces as an event.
        if command == "PING" {
            actions.push(Action::send(Message::pong(message.params.clone())));
            return actions;
        }

        // Labeled responses are correlated in addition to normal handling.
        if let Some(label) = message.label() {
            actions.push(Action::emit(Event::Labeled {
                label: label.to_string(),
                command: message.command.clone(),
                params: message.params.clone(),
                tags: message.tags.clone().unwrap_or_default(),
            }));
        }

        match command.as_str() {
            "CAP" => self.handle_cap(message, &mut actions),
            "AUTHENTICATE" => self.handle_authenticate(message, &mut actions),
            "903" | "904" | "905" | "906" | "907" => {
                self.handle_sasl_result(message, &mut actions)
            }
            "001" => self.handle_welcome(&mut actions),
            "PRIVMSG" => self.handle_privmsg(message, now, &mut actions),
            "JOIN" => self.handle_join(message, &mut actions),
            "PART" => self.handle_part(message, &mut actions),
            "QUIT" => self.handle_quit(message, &mut actions),
            "NICK" => self.handle_nick(message, &mut actions),
            "CHGHOST" => self.handle_chghost(message, &mut actions),
            "SETNAME" => self.handle_setname(message, &mut actions),
            "AWAY" => self.handle_away(message, &mut actions),
            "ACCOUNT" => self.handle_account(message, &mut actions),
            "MODE" => self.handle_mode(message, &mut actions),
            "352" => self.handle_who_reply(message, &mut actions),
            "354" => self.handle_whox_reply(message, &mut actions),
            "353" => self.handle_names_reply(message, &mut actions),
            "BATCH" => self.handle_batch(message, &mut actions),
            "730" => self.handle_monitor(message, true, &mut actions),
            "731" => self.handle_monitor(message, false, &mut actions),
            "311" | "312" | "317" | "319" | "330" | "338" => self.handle_whois_field(message),
            "318" => self.handle_whois_end(message, &mut actions),
            _ => self.handle_unknown(message, &mut actions),
        }

        actions
    }

    /// Forward anything unrecognized as opaque status text.
    ///
    /// Lines that decoded to nothing at all are dropped.
    fn handle_unknown(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let mut text = message.command.clone();
        for param in &message.params {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(param);
        }
        if !text.is_empty() {
            actions.push(Action::status(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_profile() -> ServerProfile {
        ServerProfile::new("test", "irc.example.org", "testbot")
    }

    pub(crate) fn feed_line(state: &mut ClientState, line: &str) -> Vec<Action> {
        let message: Message = line.parse().expect("test line should parse");
        state.feed(&message, Utc::now())
    }

    pub(crate) fn sent_lines(actions: &[Action]) -> Vec<String> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(m) => Some(m.to_string().trim_end().to_string()),
                Action::Emit(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_start_burst() {
        let mut state = ClientState::new(test_profile());
        let actions = state.start();
        assert_eq!(
            sent_lines(&actions),
            vec!["CAP LS 302", "NICK testbot", "USER slirc 0 * :slirc client"]
        );
        assert_eq!(state.phase(), NegotiationPhase::LsPending);
    }

    #[test]
    fn test_ping_answered_without_event() {
        let mut state = ClientState::new(test_profile());
        let actions = feed_line(&mut state, "PING :token123");
        assert_eq!(sent_lines(&actions), vec!["PONG token123"]);
        assert!(!actions.iter().any(|a| matches!(a, Action::Emit(_))));
    }

    #[test]
    fn test_unknown_numeric_becomes_status() {
        let mut state = ClientState::new(test_profile());
        let actions = feed_line(&mut state, ":server 372 me :- some motd text");
        assert_eq!(
            actions,
            vec![Action::status("372 me - some motd text")]
        );
    }

    #[test]
    fn test_labeled_response_also_dispatched() {
        let mut state = ClientState::new(test_profile());
        let actions = feed_line(
            &mut state,
            "@label=q1 :nick!u@h PRIVMSG #chan :hello",
        );

        let labeled = actions.iter().any(|a| {
            matches!(a, Action::Emit(e) if matches!(**e, Event::Labeled { ref label, .. } if label == "q1"))
        });
        let message = actions.iter().any(|a| {
            matches!(a, Action::Emit(e) if matches!(**e, Event::Message { .. }))
        });
        assert!(labeled);
        assert!(message);
    }

    #[test]
    fn test_degraded_line_surfaces_raw_text() {
        let mut state = ClientState::new(test_profile());
        let message = crate::message::decode_relaxed("!!! not irc");
        let actions = state.feed(&message, Utc::now());
        assert_eq!(actions, vec![Action::status("!!! not irc")]);
    }
}
