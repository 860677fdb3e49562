//! Network transport: plain TCP or TLS, framed with [`IrcCodec`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::{ProtocolError, Result};
use crate::irc::IrcCodec;
use crate::profile::ServerProfile;
use crate::Message;

#[allow(clippy::large_enum_variant)]
pub enum Transport {
    Tcp {
        framed: Framed<TcpStream, IrcCodec>,
    },
    Tls {
        framed: Framed<TlsStream<TcpStream>, IrcCodec>,
    },
}

impl Transport {
    /// Connect and complete any TLS handshake within the profile's
    /// connect timeout.
    pub async fn connect(profile: &ServerProfile) -> Result<Self> {
        let deadline = profile.connect_timeout;
        match tokio::time::timeout(deadline, Self::dial(profile)).await {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::ConnectTimeout(deadline)),
        }
    }

    async fn dial(profile: &ServerProfile) -> Result<Self> {
        let stream = TcpStream::connect((profile.host.as_str(), profile.port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        if let Err(e) = stream.set_nodelay(true) {
            warn!("failed to set TCP_NODELAY: {}", e);
        }

        if !profile.tls {
            return Ok(Self::Tcp {
                framed: Framed::new(stream, IrcCodec::new()),
            });
        }

        let connector = tls_connector(profile.ignore_invalid_certs);
        // SNI must still be sent even when verification is disabled.
        let server_name = ServerName::try_from(profile.host.clone())
            .map_err(|_| ProtocolError::InvalidServerName(profile.host.clone()))?;
        let stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| ProtocolError::Tls(e.to_string()))?;
        Ok(Self::Tls {
            framed: Framed::new(stream, IrcCodec::new()),
        })
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// Read the next message; `Ok(None)` means the server closed the
    /// connection.
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        macro_rules! read_framed {
            ($framed:expr) => {
                match $framed.next().await {
                    Some(Ok(msg)) => Ok(Some(msg)),
                    Some(Err(e)) => Err(e),
                    None => Ok(None),
                }
            };
        }

        match self {
            Transport::Tcp { framed } => read_framed!(framed),
            Transport::Tls { framed } => read_framed!(framed),
        }
    }

    pub async fn write_message(&mut self, message: Message) -> Result<()> {
        macro_rules! write_framed {
            ($framed:expr, $msg:expr) => {
                $framed.send($msg).await
            };
        }

        match self {
            Transport::Tcp { framed } => write_framed!(framed, message),
            Transport::Tls { framed } => write_framed!(framed, message),
        }
    }
}

fn tls_connector(ignore_invalid_certs: bool) -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let mut config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    if ignore_invalid_certs {
        warn!("certificate verification disabled - this is insecure!");
        config
            .dangerous()
            .set_certificate_verifier(Arc::new(NoCertificateVerification));
    }

    TlsConnector::from(Arc::new(config))
}

/// Accepts any certificate. Only reachable through
/// `ServerProfile::ignore_invalid_certs`.
#[derive(Debug)]
struct NoCertificateVerification;

impl rustls::client::danger::ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA1,
            rustls::SignatureScheme::ECDSA_SHA1_Legacy,
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
            rustls::SignatureScheme::ED448,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_builds_in_both_modes() {
        let _ = tls_connector(false);
        let _ = tls_connector(true);
    }

    #[test]
    fn test_server_name_rejects_bad_host() {
        assert!(ServerName::try_from("bad host name".to_string()).is_err());
    }
}
