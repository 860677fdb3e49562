use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use crate::message::tags::escape_tag_value;
use crate::prefix::Prefix;

/// An owned, decoded IRC message.
///
/// Contains the complete parsed representation of one IRC line: optional
/// IRCv3 tags, optional prefix/source, the command token, and its
/// parameters. The trailing parameter, when present, is the last element of
/// `params` and may contain spaces or be empty.
///
/// # Example
///
/// ```
/// use slirc_client::Message;
///
/// // Parse a message
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.params, vec!["#channel", "Hello!"]);
///
/// // Construct a message
/// let msg = Message::privmsg("#channel", "Hello!");
/// ```
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// IRCv3 message tags (e.g., `time`, `batch`, `label`).
    pub tags: Option<Vec<Tag>>,
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The command token (verb or numeric), as received.
    pub command: String,
    /// Command parameters, trailing last.
    pub params: Vec<String>,
}

impl Message {
    /// Create a message from a command token and parameters.
    #[must_use]
    pub fn new<C, P>(command: C, params: Vec<P>) -> Self
    where
        C: Into<String>,
        P: Into<String>,
    {
        Message {
            tags: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Get a parameter by index.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Get the value of an IRCv3 tag by key.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k.as_ref() == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// Get the server-time tag value.
    pub fn server_time(&self) -> Option<&str> {
        self.tag_value("time")
    }

    /// Get the labeled-response label tag.
    pub fn label(&self) -> Option<&str> {
        self.tag_value("label")
    }

    /// Get the batch reference tag.
    pub fn batch_tag(&self) -> Option<&str> {
        self.tag_value("batch")
    }

    /// The leading name segment of the prefix (nick for user prefixes,
    /// server name otherwise).
    pub fn source_name(&self) -> Option<&str> {
        self.prefix.as_ref().map(Prefix::name)
    }

    /// Create a `CAP LS 302` capability listing request.
    #[must_use]
    pub fn cap_ls() -> Self {
        Message::new("CAP", vec!["LS", "302"])
    }

    /// Create a `CAP REQ` for a space-joined capability list.
    #[must_use]
    pub fn cap_req<C>(caps: C) -> Self
    where
        C: Into<String>,
    {
        Message::new("CAP", vec!["REQ".to_string(), caps.into()])
    }

    /// Create a `CAP END` to close capability negotiation.
    #[must_use]
    pub fn cap_end() -> Self {
        Message::new("CAP", vec!["END"])
    }

    /// Create a NICK message.
    #[must_use]
    pub fn nick<N>(nickname: N) -> Self
    where
        N: Into<String>,
    {
        Message::new("NICK", vec![nickname.into()])
    }

    /// Create a USER registration message (`USER <user> 0 * :<realname>`).
    #[must_use]
    pub fn user<U, R>(username: U, realname: R) -> Self
    where
        U: Into<String>,
        R: Into<String>,
    {
        Message::new(
            "USER",
            vec![username.into(), "0".to_string(), "*".to_string(), realname.into()],
        )
    }

    /// Create an AUTHENTICATE message carrying a mechanism name or payload.
    #[must_use]
    pub fn authenticate<D>(data: D) -> Self
    where
        D: Into<String>,
    {
        Message::new("AUTHENTICATE", vec![data.into()])
    }

    /// Create a PONG echoing the parameters of a PING.
    #[must_use]
    pub fn pong(params: Vec<String>) -> Self {
        Message::new("PONG", params)
    }

    /// Create a JOIN message for a channel.
    #[must_use]
    pub fn join<C>(channel: C) -> Self
    where
        C: Into<String>,
    {
        Message::new("JOIN", vec![channel.into()])
    }

    /// Create a PART message, optionally with a reason.
    #[must_use]
    pub fn part<C>(channel: C, reason: Option<&str>) -> Self
    where
        C: Into<String>,
    {
        let mut params = vec![channel.into()];
        if let Some(reason) = reason {
            params.push(reason.to_string());
        }
        Message::new("PART", params)
    }

    /// Create a TOPIC message setting a channel topic.
    #[must_use]
    pub fn topic<C, T>(channel: C, topic: T) -> Self
    where
        C: Into<String>,
        T: Into<String>,
    {
        Message::new("TOPIC", vec![channel.into(), topic.into()])
    }

    /// Create a MODE message from a free-form mode string.
    ///
    /// The mode string is split on whitespace so mode arguments become
    /// separate wire parameters (`MODE #chan +ov alice bob`).
    #[must_use]
    pub fn mode<C>(target: C, modes: &str) -> Self
    where
        C: Into<String>,
    {
        let mut params = vec![target.into()];
        params.extend(modes.split_whitespace().map(str::to_string));
        Message::new("MODE", params)
    }

    /// Create a PRIVMSG to a target.
    #[must_use]
    pub fn privmsg<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Message::new("PRIVMSG", vec![target.into(), text.into()])
    }

    /// Create a MONITOR command (`C`, `+ nicks`, `- nicks`).
    #[must_use]
    pub fn monitor(action: &str, targets: Option<&str>) -> Self {
        let mut params = vec![action.to_string()];
        if let Some(targets) = targets {
            params.push(targets.to_string());
        }
        Message::new("MONITOR", params)
    }

    /// Create a QUIT message with a reason.
    #[must_use]
    pub fn quit<R>(reason: R) -> Self
    where
        R: Into<String>,
    {
        Message::new("QUIT", vec![reason.into()])
    }

    /// Add a single IRCv3 tag to this message.
    #[must_use]
    pub fn with_tag<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let tag = Tag::new(key, value.map(|v| v.into()));
        if let Some(ref mut existing) = self.tags {
            existing.push(tag);
        } else {
            self.tags = Some(vec![tag]);
        }
        self
    }

    /// Set the prefix/source of this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

/// Whether a parameter must be serialized as a trailing parameter.
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref tags) = self.tags {
            if !tags.is_empty() {
                write!(f, "@")?;
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, "{}", tag.0)?;
                    if let Some(ref value) = tag.1 {
                        write!(f, "=")?;
                        escape_tag_value(f, value)?;
                    }
                }
                write!(f, " ")?;
            }
        }

        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{}", self.command)?;

        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i == last && needs_trailing(param) {
                write!(f, " :{}", param)?;
            } else {
                write!(f, " {}", param)?;
            }
        }

        write!(f, "\r\n")
    }
}

/// An IRCv3 message tag.
///
/// Tags are key-value pairs that can be attached to messages.
/// The value is optional (some tags are presence-only flags).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag(
    /// Tag key (e.g., `time`, `label`).
    pub Cow<'static, str>,
    /// Optional tag value, unescaped.
    pub Option<String>,
);

impl Tag {
    /// Create a new tag with a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(Cow::Owned(key.into()), value)
    }
}
