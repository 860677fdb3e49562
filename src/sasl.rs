//! SASL PLAIN authentication helpers.
//!
//! The engine authenticates with the PLAIN mechanism (RFC 4616): credentials
//! are encoded as `authzid NUL authcid NUL password` and base64'd. Responses
//! longer than 400 bytes must be split across multiple AUTHENTICATE commands.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.2>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>
//!
//! # Example
//!
//! ```
//! use slirc_client::sasl::encode_plain;
//!
//! let encoded = encode_plain("myuser", "mypassword");
//! assert!(!encoded.is_empty());
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Maximum length of a single SASL message chunk (400 bytes).
///
/// SASL responses that exceed this length must be split into multiple
/// AUTHENTICATE commands.
pub const SASL_CHUNK_SIZE: usize = 400;

/// Encode credentials for the PLAIN mechanism.
///
/// The PLAIN mechanism encodes: `authzid NUL authcid NUL password`
///
/// For IRC SASL, `authzid` is typically empty and `authcid` is the account
/// name being authenticated.
///
/// # Example
///
/// ```
/// use slirc_client::sasl::encode_plain;
///
/// let encoded = encode_plain("testuser", "testpass");
/// // Decodes to: "\0testuser\0testpass"
/// assert!(!encoded.is_empty());
/// ```
pub fn encode_plain(authcid: &str, password: &str) -> String {
    // Format: authzid NUL authcid NUL password
    // For IRC, authzid is typically empty
    let payload = format!("\0{}\0{}", authcid, password);
    BASE64.encode(payload.as_bytes())
}

/// Encode credentials for the PLAIN mechanism with an explicit authzid.
///
/// Use this when you need to authenticate as one user but authorize as another.
pub fn encode_plain_with_authzid(authzid: &str, authcid: &str, password: &str) -> String {
    let payload = format!("{}\0{}\0{}", authzid, authcid, password);
    BASE64.encode(payload.as_bytes())
}

/// Split an encoded SASL response into chunks for transmission.
///
/// IRC SASL requires responses longer than 400 bytes to be split
/// across multiple AUTHENTICATE commands.
pub fn chunk_response(encoded: &str) -> impl Iterator<Item = &str> {
    encoded.as_bytes().chunks(SASL_CHUNK_SIZE).map(|chunk| {
        // Safe because base64 is always ASCII
        std::str::from_utf8(chunk).unwrap()
    })
}

/// Check if a SASL response needs chunking.
#[inline]
pub fn needs_chunking(encoded: &str) -> bool {
    encoded.len() > SASL_CHUNK_SIZE
}

/// Progress of an in-flight SASL exchange.
///
/// Tracks whether authentication has started and whether the credential
/// payload has already been sent, so a repeated `AUTHENTICATE +` from the
/// server never triggers a second payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaslState {
    /// AUTHENTICATE PLAIN has been sent and no result numeric seen yet.
    pub in_progress: bool,
    /// The credential payload has been sent for this exchange.
    pub payload_sent: bool,
}

impl SaslState {
    /// Mark the start of an exchange (AUTHENTICATE PLAIN sent).
    pub fn begin(&mut self) {
        self.in_progress = true;
        self.payload_sent = false;
    }

    /// Whether the server's `+` challenge should be answered with a payload.
    pub fn wants_payload(&self) -> bool {
        self.in_progress && !self.payload_sent
    }

    /// Mark the credential payload as sent.
    pub fn mark_payload_sent(&mut self) {
        self.payload_sent = true;
    }

    /// Mark the exchange finished (any of the 903..=907 result numerics).
    pub fn finish(&mut self) {
        self.in_progress = false;
    }
}
