//! Capability negotiation and SASL handlers.
//!
//! Drives the CAP LS/REQ/ACK/NAK flow and the SASL PLAIN exchange, and
//! decides when the initial channel joins fire. CAP END is sent exactly
//! once per connection no matter how the negotiation ends.

use std::collections::BTreeSet;

use crate::caps;
use crate::sasl;
use crate::Message;

use super::{Action, ClientState};

/// Where capability negotiation currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// Nothing sent yet.
    Idle,
    /// CAP LS sent; collecting LS replies. A reply carrying the `*`
    /// continuation marker keeps us here until the final LS arrives.
    LsPending,
    /// CAP REQ sent; waiting for ACK or NAK.
    Requesting,
    /// AUTHENTICATE PLAIN sent; waiting for the server's `+` challenge.
    SaslPending,
    /// Credential payload sent; waiting for a result numeric.
    SaslAuthenticating,
    /// CAP END sent. Terminal for the connection's lifetime.
    Ended,
}

/// Capability sets tracked across negotiation.
///
/// Names advertised as `name=value` are recorded under their bare name.
/// `active` stops changing once CAP END is sent; mid-session CAP NEW/DEL
/// is out of scope.
#[derive(Clone, Debug, Default)]
pub struct CapabilityState {
    /// Capabilities the server advertised via CAP LS.
    pub(crate) available: BTreeSet<String>,
    /// Capabilities we asked for via CAP REQ.
    pub(crate) requested: BTreeSet<String>,
    /// Capabilities the server acknowledged via CAP ACK.
    pub(crate) active: BTreeSet<String>,
    /// CAP END has been sent.
    pub(crate) ended: bool,
}

impl ClientState {
    pub(super) fn handle_cap(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let subcmd = message.arg(1).unwrap_or("").to_ascii_uppercase();
        match subcmd.as_str() {
            "LS" => self.handle_cap_ls(message, actions),
            "ACK" => self.handle_cap_ack(message, actions),
            "NAK" => self.end_negotiation(actions),
            // LIST replies and mid-session NEW/DEL are ignored.
            _ => {}
        }
    }

    fn handle_cap_ls(&mut self, message: &Message, actions: &mut Vec<Action>) {
        // A `*` in the third CAP parameter marks a continued multiline LS.
        let (more_coming, payload) = if message.arg(2) == Some("*") {
            (true, message.arg(3).unwrap_or(""))
        } else {
            (false, message.arg(2).unwrap_or(""))
        };

        for token in payload.split_whitespace() {
            self.caps
                .available
                .insert(caps::base_name(token).to_string());
        }

        if more_coming {
            self.phase = NegotiationPhase::LsPending;
            return;
        }

        let desired = caps::desired_set(self.profile.wants_sasl());
        let to_request: Vec<String> = desired
            .intersection(&self.caps.available)
            .cloned()
            .collect();

        if to_request.is_empty() {
            self.end_negotiation(actions);
        } else if self.caps.requested.is_empty() {
            self.caps.requested.extend(to_request.iter().cloned());
            actions.push(Action::send(Message::cap_req(to_request.join(" "))));
            self.phase = NegotiationPhase::Requesting;
        }
    }

    fn handle_cap_ack(&mut self, message: &Message, actions: &mut Vec<Action>) {
        let payload = message.arg(2).unwrap_or("");
        let mut sasl_acked = false;

        for token in payload.split_whitespace() {
            if token.starts_with('-') {
                continue;
            }
            let name = caps::base_name(token);
            if name == "sasl" {
                sasl_acked = true;
            }
            self.caps.active.insert(name.to_string());
        }

        if sasl_acked && self.profile.wants_sasl() {
            self.begin_sasl(actions);
        } else {
            self.end_negotiation(actions);
        }
    }

    fn begin_sasl(&mut self, actions: &mut Vec<Action>) {
        self.sasl.begin();
        self.phase = NegotiationPhase::SaslPending;
        actions.push(Action::send(Message::authenticate("PLAIN")));
    }

    pub(super) fn handle_authenticate(&mut self, message: &Message, actions: &mut Vec<Action>) {
        if message.arg(0) != Some("+") || !self.sasl.wants_payload() {
            return;
        }

        actions.push(Action::status("SASL server requested payload (+)"));

        let password = self.profile.password.as_deref().unwrap_or("");
        let payload = sasl::encode_plain(self.profile.sasl_authcid(), password);
        for chunk in sasl::chunk_response(&payload) {
            actions.push(Action::send(Message::authenticate(chunk)));
        }
        // An exact multiple of the chunk size needs an empty terminator.
        if payload.len() % sasl::SASL_CHUNK_SIZE == 0 {
            actions.push(Action::send(Message::authenticate("+")));
        }

        self.sasl.mark_payload_sent();
        self.phase = NegotiationPhase::SaslAuthenticating;
    }

    pub(super) fn handle_sasl_result(&mut self, message: &Message, actions: &mut Vec<Action>) {
        self.sasl.finish();
        actions.push(Action::status(format!("SASL result {}", message.command)));
        self.end_negotiation(actions);
    }

    pub(super) fn handle_welcome(&mut self, actions: &mut Vec<Action>) {
        self.welcome_received = true;
        actions.push(Action::status("001 welcome received"));
        if self.caps.ended {
            self.join_initial(actions);
        }
    }

    /// Send CAP END once and join initial channels if 001 already arrived.
    pub(super) fn end_negotiation(&mut self, actions: &mut Vec<Action>) {
        if self.caps.ended {
            return;
        }
        self.caps.ended = true;
        self.phase = NegotiationPhase::Ended;
        actions.push(Action::send(Message::cap_end()));
        if self.welcome_received {
            self.join_initial(actions);
        }
    }

    fn join_initial(&mut self, actions: &mut Vec<Action>) {
        if self.joined_initial {
            return;
        }
        self.joined_initial = true;
        for channel in &self.profile.channels {
            actions.push(Action::send(Message::join(channel.clone())));
        }
    }
}
