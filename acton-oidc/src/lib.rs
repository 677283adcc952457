//! # acton-oidc
//!
//! A thin OpenID Connect client for the authorization-code flow: provider
//! discovery, authorization-URL construction, code-for-token exchange, and
//! `id_token` verification, wrapped behind small capability traits so web
//! handlers stay testable without a live identity provider.
//!
//! ## Design
//!
//! - **Immutable after construction.** Discovery happens when the provider
//!   is built; clients and providers are then shared freely across tasks.
//! - **Errors keep their cause.** Transport and verification failures are
//!   wrapped, never swallowed, and nothing is retried internally.
//! - **Cancellation-friendly.** Every async operation aborts promptly when
//!   its future is dropped, so timeout policy stays with the caller.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use acton_oidc::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider =
//!     DiscoveredProvider::discover("https://idp.example.com", TlsOptions::new()).await?;
//!
//! let client = Client::new(ClientConfig {
//!     tls: TlsOptions::new(),
//!     provider: Arc::new(provider),
//!     callback_url: "https://app.example.com/callback".to_string(),
//!     client_id: "my-client".to_string(),
//!     client_secret: "my-secret".to_string(),
//!     scopes: vec!["openid".to_string(), "email".to_string()],
//! })?;
//!
//! // Redirect the user agent here, then handle the callback:
//! let login_url = client.authorization_url("random-state");
//!
//! let token = client.exchange_code("code-from-callback").await?;
//! let identity = client.verify_id_token(&token).await?;
//! println!("signed in as {}", identity.subject);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod provider;
pub mod tls;
pub mod token;
pub mod verifier;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::client::{Client, ClientConfig};
    pub use crate::config::{OidcSettings, TlsSettings};
    pub use crate::error::{BoxError, OidcError};
    pub use crate::grant::{AuthCodeGrant, CodeGrantClient};
    pub use crate::provider::{
        DiscoveredProvider, Endpoint, Provider, StaticProvider, VerifierConfig,
    };
    pub use crate::tls::TlsOptions;
    pub use crate::token::{OAuth2Token, StandardToken};
    pub use crate::verifier::{JwksVerifier, TokenVerifier, VerifiedIdToken};
}
