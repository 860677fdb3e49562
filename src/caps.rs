//! IRCv3 capability handling for the client side.
//!
//! This module names the capabilities the engine negotiates and normalizes
//! the tokens servers send in CAP LS/ACK payloads.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use std::collections::BTreeSet;

/// Known IRCv3 capability types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Server-time message tags
    ServerTime,
    /// Client message tags support
    MessageTags,
    /// Echo messages back to sender
    EchoMessage,
    /// Notify of account login/logout
    AccountNotify,
    /// Notify of away status changes
    AwayNotify,
    /// Notify of hostname changes
    ChgHost,
    /// SETNAME command for changing realname
    SetName,
    /// Message batching
    Batch,
    /// Label request/response correlation
    LabeledResponse,
    /// Show all user prefix modes in NAMES
    MultiPrefix,
    /// SASL authentication
    Sasl,
    /// Unknown/custom capability
    Custom(String),
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        match self {
            Self::ServerTime => "server-time",
            Self::MessageTags => "message-tags",
            Self::EchoMessage => "echo-message",
            Self::AccountNotify => "account-notify",
            Self::AwayNotify => "away-notify",
            Self::ChgHost => "chghost",
            Self::SetName => "setname",
            Self::Batch => "batch",
            Self::LabeledResponse => "labeled-response",
            Self::MultiPrefix => "multi-prefix",
            Self::Sasl => "sasl",
            Self::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        match s {
            "server-time" => Self::ServerTime,
            "message-tags" => Self::MessageTags,
            "echo-message" => Self::EchoMessage,
            "account-notify" => Self::AccountNotify,
            "away-notify" => Self::AwayNotify,
            "chghost" => Self::ChgHost,
            "setname" => Self::SetName,
            "batch" => Self::Batch,
            "labeled-response" => Self::LabeledResponse,
            "multi-prefix" => Self::MultiPrefix,
            "sasl" => Self::Sasl,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// The capabilities this engine requests whenever the server offers them.
///
/// `sasl` is added separately when credentials are configured.
pub const DESIRED_CAPABILITIES: &[Capability] = &[
    Capability::ServerTime,
    Capability::MessageTags,
    Capability::EchoMessage,
    Capability::AccountNotify,
    Capability::AwayNotify,
    Capability::ChgHost,
    Capability::SetName,
    Capability::Batch,
    Capability::LabeledResponse,
    Capability::MultiPrefix,
];

/// Build the desired capability name set.
pub fn desired_set(with_sasl: bool) -> BTreeSet<String> {
    let mut set: BTreeSet<String> = DESIRED_CAPABILITIES
        .iter()
        .map(|c| c.as_ref().to_string())
        .collect();
    if with_sasl {
        set.insert(Capability::Sasl.as_ref().to_string());
    }
    set
}

/// Normalize a capability token from a CAP payload to its bare name.
///
/// CAP 302 LS advertises values as `name=value`, and ACK entries may carry
/// `-`/`~`/`=` modifier prefixes. Both are stripped.
pub fn base_name(token: &str) -> &str {
    let token = token.trim_start_matches(['-', '~', '=']);
    token.split('=').next().unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_as_ref() {
        assert_eq!(Capability::MultiPrefix.as_ref(), "multi-prefix");
        assert_eq!(Capability::Sasl.as_ref(), "sasl");
    }

    #[test]
    fn test_capability_from_str() {
        assert_eq!(Capability::from("multi-prefix"), Capability::MultiPrefix);
        assert_eq!(Capability::from("sasl"), Capability::Sasl);
        assert_eq!(
            Capability::from("unknown-cap"),
            Capability::Custom("unknown-cap".to_string())
        );
    }

    #[test]
    fn test_desired_set_without_sasl() {
        let set = desired_set(false);
        assert!(set.contains("server-time"));
        assert!(set.contains("multi-prefix"));
        assert!(!set.contains("sasl"));
        assert_eq!(set.len(), DESIRED_CAPABILITIES.len());
    }

    #[test]
    fn test_desired_set_with_sasl() {
        let set = desired_set(true);
        assert!(set.contains("sasl"));
        assert_eq!(set.len(), DESIRED_CAPABILITIES.len() + 1);
    }

    #[test]
    fn test_base_name_strips_values_and_modifiers() {
        assert_eq!(base_name("sasl=PLAIN,EXTERNAL"), "sasl");
        assert_eq!(base_name("sts=port=6697"), "sts");
        assert_eq!(base_name("-multi-prefix"), "multi-prefix");
        assert_eq!(base_name("~batch"), "batch");
        assert_eq!(base_name("server-time"), "server-time");
    }
}
