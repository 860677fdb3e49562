//! Connection profile for a single IRC server.
//!
//! A [`ServerProfile`] carries everything needed to reach a server and
//! register on it: endpoint, TLS policy, identity, initial channels, and
//! optional SASL credentials.

use std::time::Duration;

/// Default connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for one IRC server connection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerProfile {
    /// Display label for this profile.
    pub name: String,
    /// Server hostname, also used for SNI when TLS is enabled.
    pub host: String,
    /// Server port.
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    /// Connect over TLS.
    #[cfg_attr(feature = "serde", serde(default = "default_tls"))]
    pub tls: bool,
    /// Nickname to register with.
    #[cfg_attr(feature = "serde", serde(default = "default_nick"))]
    pub nick: String,
    /// Username for the USER command.
    #[cfg_attr(feature = "serde", serde(default = "default_user"))]
    pub user: String,
    /// Realname for the USER command.
    #[cfg_attr(feature = "serde", serde(default = "default_realname"))]
    pub realname: String,
    /// Channels joined automatically once registered.
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: Vec<String>,
    /// SASL password. Setting this enables SASL PLAIN.
    #[cfg_attr(feature = "serde", serde(default))]
    pub password: Option<String>,
    /// SASL account name. Falls back to `user`, then `nick`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sasl_user: Option<String>,
    /// Skip certificate verification. Only for servers with broken certs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_invalid_certs: bool,
    /// TCP/TLS connect timeout.
    #[cfg_attr(feature = "serde", serde(default = "default_connect_timeout"))]
    pub connect_timeout: Duration,
}

fn default_port() -> u16 {
    6697
}

fn default_tls() -> bool {
    true
}

fn default_nick() -> String {
    "slirc_user".to_string()
}

fn default_user() -> String {
    "slirc".to_string()
}

fn default_realname() -> String {
    "slirc client".to_string()
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: String::new(),
            port: default_port(),
            tls: default_tls(),
            nick: default_nick(),
            user: default_user(),
            realname: default_realname(),
            channels: Vec::new(),
            password: None,
            sasl_user: None,
            ignore_invalid_certs: false,
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl ServerProfile {
    /// Create a profile for `host` with default port and TLS settings.
    pub fn new(name: impl Into<String>, host: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            nick: nick.into(),
            ..Self::default()
        }
    }

    /// Whether SASL should be negotiated for this profile.
    pub fn wants_sasl(&self) -> bool {
        self.password.is_some() || self.sasl_user.is_some()
    }

    /// The authentication identity used for SASL PLAIN.
    ///
    /// Falls back through `sasl_user`, `user`, `nick`, taking the first
    /// non-empty value.
    pub fn sasl_authcid(&self) -> &str {
        if let Some(sasl_user) = self.sasl_user.as_deref() {
            if !sasl_user.is_empty() {
                return sasl_user;
            }
        }
        if !self.user.is_empty() {
            return &self.user;
        }
        &self.nick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let profile = ServerProfile::new("libera", "irc.libera.chat", "testnick");
        assert_eq!(profile.port, 6697);
        assert!(profile.tls);
        assert!(!profile.ignore_invalid_certs);
        assert_eq!(profile.connect_timeout, Duration::from_secs(15));
        assert!(profile.channels.is_empty());
        assert!(!profile.wants_sasl());
    }

    #[test]
    fn test_wants_sasl() {
        let mut profile = ServerProfile::new("net", "irc.example.org", "nick");
        assert!(!profile.wants_sasl());

        profile.password = Some("hunter2".to_string());
        assert!(profile.wants_sasl());

        profile.password = None;
        profile.sasl_user = Some("account".to_string());
        assert!(profile.wants_sasl());
    }

    #[test]
    fn test_sasl_authcid_fallback() {
        let mut profile = ServerProfile::new("net", "irc.example.org", "mynick");
        profile.user = "myuser".to_string();
        assert_eq!(profile.sasl_authcid(), "myuser");

        profile.sasl_user = Some("account".to_string());
        assert_eq!(profile.sasl_authcid(), "account");

        profile.sasl_user = Some(String::new());
        assert_eq!(profile.sasl_authcid(), "myuser");

        profile.sasl_user = None;
        profile.user = String::new();
        assert_eq!(profile.sasl_authcid(), "mynick");
    }
}
