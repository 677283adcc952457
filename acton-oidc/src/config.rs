//! Settings loading and validation
//!
//! Settings are layered with figment: compiled defaults first, then
//! `config.toml`, then `ACTON_OIDC_`-prefixed environment variables, each
//! layer overriding the previous one. Nested fields use `__` in environment
//! keys, for example `ACTON_OIDC_TLS__CA_BUNDLE`.

use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::OidcError;
use crate::tls::TlsOptions;

/// OIDC client settings loaded from file and environment
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcSettings {
    /// Issuer URL discovery starts from
    pub issuer: String,
    /// OAuth2 client ID issued by the provider
    pub client_id: String,
    /// OAuth2 client secret issued by the provider
    pub client_secret: String,
    /// Redirect URL registered with the provider for this client
    pub callback_url: String,
    /// Scopes requested during authorization
    pub scopes: Vec<String>,
    /// TLS material for outbound calls
    pub tls: TlsSettings,
}

impl Default for OidcSettings {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: String::new(),
            scopes: vec!["openid".to_string()],
            tls: TlsSettings::default(),
        }
    }
}

impl OidcSettings {
    /// Load settings from defaults, `config.toml`, and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a layer fails to parse or the merged settings
    /// do not extract.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings with an explicit TOML file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default settings cannot be serialized to TOML
    /// - The settings file contains invalid TOML syntax
    /// - Merged values fail type conversion during extraction
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            // Load from the settings file (if it exists)
            .merge(Toml::file(path.as_ref()))
            // Environment variables override everything (prefix ACTON_OIDC_, double underscore for nesting)
            .merge(Env::prefixed("ACTON_OIDC_").split("__").lowercase(true))
            .extract()?;

        Ok(settings)
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] naming the first missing field.
    pub fn validate(&self) -> Result<(), OidcError> {
        for (field, value) in [
            ("issuer", &self.issuer),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("callback_url", &self.callback_url),
        ] {
            if value.is_empty() {
                return Err(OidcError::Config(format!(
                    "Missing required setting: {field}"
                )));
            }
        }

        Ok(())
    }
}

/// TLS-related settings, all optional
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// Path to a PEM bundle of additional root certificates
    pub ca_bundle: Option<PathBuf>,
    /// Path to a PEM client certificate presented to the provider
    pub client_cert: Option<PathBuf>,
    /// Path to the PEM private key belonging to `client_cert`
    pub client_key: Option<PathBuf>,
    /// Accept invalid TLS certificates, for development setups only
    pub danger_accept_invalid_certs: bool,
}

impl TlsSettings {
    /// Read the referenced PEM files and build [`TlsOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`OidcError::Config`] when a referenced file cannot be read
    /// or parsed, or when only one of `client_cert`/`client_key` is set.
    pub fn to_tls_options(&self) -> Result<TlsOptions, OidcError> {
        let mut tls =
            TlsOptions::new().danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(path) = &self.ca_bundle {
            let pem = fs::read(path).map_err(|e| {
                OidcError::Config(format!("Failed to read CA bundle {}: {e}", path.display()))
            })?;
            let certificates = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
                OidcError::Config(format!("Failed to parse CA bundle {}: {e}", path.display()))
            })?;

            for certificate in certificates {
                tls = tls.with_root_certificate(certificate);
            }
        }

        match (&self.client_cert, &self.client_key) {
            (Some(cert_path), Some(key_path)) => {
                let cert = fs::read(cert_path).map_err(|e| {
                    OidcError::Config(format!(
                        "Failed to read client certificate {}: {e}",
                        cert_path.display()
                    ))
                })?;
                let key = fs::read(key_path).map_err(|e| {
                    OidcError::Config(format!(
                        "Failed to read client key {}: {e}",
                        key_path.display()
                    ))
                })?;
                let identity = reqwest::Identity::from_pkcs8_pem(&cert, &key).map_err(|e| {
                    OidcError::Config(format!("Failed to build client identity: {e}"))
                })?;

                tls = tls.with_identity(identity);
            }
            (None, None) => {}
            _ => {
                return Err(OidcError::Config(
                    "client_cert and client_key must be set together".to_string(),
                ));
            }
        }

        Ok(tls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_request_openid_scope() {
        let settings = OidcSettings::default();

        assert_eq!(settings.scopes, vec!["openid".to_string()]);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_names_missing_field() {
        let settings = OidcSettings {
            issuer: "https://idp.example.com".to_string(),
            ..Default::default()
        };

        let error = settings.validate().unwrap_err();

        assert!(error.to_string().contains("client_id"));
    }

    #[test]
    fn test_file_and_env_layers_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    issuer = "https://idp.example.com"
                    client_id = "from-file"
                    client_secret = "secret"
                    callback_url = "https://app.example.com/callback"
                "#,
            )?;
            jail.set_env("ACTON_OIDC_CLIENT_ID", "from-env");
            jail.set_env("ACTON_OIDC_TLS__DANGER_ACCEPT_INVALID_CERTS", "true");

            let settings = OidcSettings::load().expect("Failed to load settings");

            assert_eq!(settings.issuer, "https://idp.example.com");
            assert_eq!(settings.client_id, "from-env");
            assert_eq!(settings.client_secret, "secret");
            assert_eq!(settings.scopes, vec!["openid".to_string()]);
            assert!(settings.tls.danger_accept_invalid_certs);
            assert!(settings.validate().is_ok());

            Ok(())
        });
    }

    #[test]
    fn test_empty_tls_settings_build_strict_options() {
        assert!(TlsSettings::default().to_tls_options().is_ok());
    }

    #[test]
    fn test_tls_settings_require_cert_and_key_together() {
        let settings = TlsSettings {
            client_cert: Some(PathBuf::from("/tmp/client.pem")),
            ..Default::default()
        };

        let error = settings.to_tls_options().unwrap_err();

        assert!(error.to_string().contains("together"));
    }

    #[test]
    fn test_tls_settings_surface_unreadable_bundle() {
        let settings = TlsSettings {
            ca_bundle: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..Default::default()
        };

        assert!(matches!(settings.to_tls_options(), Err(OidcError::Config(_))));
    }
}
