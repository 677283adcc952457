//! TLS trust configuration for outbound HTTP
//!
//! Discovery, JWKS fetches, and the code exchange all run over the same
//! reqwest transport; [`TlsOptions`] carries the trust material applied to
//! that transport (extra root CAs, an optional client identity for mTLS, and
//! a verification toggle for test environments).

use std::fmt;

/// TLS settings applied to every outbound HTTP call.
///
/// The default adds nothing: system roots only, certificate verification on,
/// no client identity.
#[derive(Clone)]
pub struct TlsOptions {
    root_certificates: Vec<reqwest::Certificate>,
    identity: Option<reqwest::Identity>,
    danger_accept_invalid_certs: bool,
}

impl TlsOptions {
    /// Create empty TLS options (system trust roots, verification on)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root_certificates: Vec::new(),
            identity: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Add a trusted root certificate
    #[must_use]
    pub fn with_root_certificate(mut self, certificate: reqwest::Certificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    /// Present a client identity (mTLS) on outbound connections
    #[must_use]
    pub fn with_identity(mut self, identity: reqwest::Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Disable server certificate verification.
    ///
    /// Intended for test environments with self-signed issuers. Never enable
    /// this against a production identity provider.
    #[must_use]
    pub const fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Apply these options to a reqwest client builder
    #[must_use]
    pub fn apply(&self, mut builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        for certificate in &self.root_certificates {
            builder = builder.add_root_certificate(certificate.clone());
        }
        if let Some(identity) = &self.identity {
            builder = builder.identity(identity.clone());
        }
        if self.danger_accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self::new()
    }
}

// Certificate contents stay out of logs.
impl fmt::Debug for TlsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsOptions")
            .field("root_certificates", &self.root_certificates.len())
            .field("identity", &self.identity.is_some())
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .finish()
    }
}
