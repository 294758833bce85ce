//! Authenticated access to the tenant.
//!
//! The credential handshake itself lives behind [`AuthProvider`]; this module
//! owns the value types that cross that boundary and keeps secrets out of
//! logs and `Debug` output.

use log::info;
use std::fmt;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

const REDACTED: &str = "[REDACTED]";

/// Client secret for the credential exchange. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(Zeroizing<String>);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        ClientSecret(Zeroizing::new(secret.into()))
    }

    /// The raw secret, for the exchange request only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientSecret").field(&REDACTED).finish()
    }
}

impl fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Operator signs in through a browser.
    Interactive,
    ClientCredentials {
        client_id: String,
        client_secret: ClientSecret,
    },
}

impl AuthMode {
    pub fn describe(&self) -> &'static str {
        match self {
            AuthMode::Interactive => "interactive login",
            AuthMode::ClientCredentials { .. } => "client credentials",
        }
    }
}

/// Handle to an authenticated tenant, reused for every request of a run.
pub struct Session {
    tenant: Url,
    access_token: Zeroizing<String>,
}

impl Session {
    pub fn new(tenant: Url, access_token: impl Into<String>) -> Self {
        Session {
            tenant,
            access_token: Zeroizing::new(access_token.into()),
        }
    }

    pub fn tenant(&self) -> &Url {
        &self.tenant
    }

    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tenant", &self.tenant.as_str())
            .field("access_token", &REDACTED)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid tenant url '{url}': {reason}")]
    InvalidTenant { url: String, reason: String },
    #[error("login was cancelled")]
    Cancelled,
    #[error("could not complete login prompt: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("could not reach tenant: {0}")]
    Transport(String),
    #[error("tenant rejected the credentials (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response from tenant: {0}")]
    InvalidResponse(String),
}

/// Performs the credential handshake for one [`AuthMode`].
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider {
    fn connect(&self, tenant: &Url, mode: AuthMode) -> Result<Session, AuthError>;
}

pub fn parse_tenant_url(raw: &str) -> Result<Url, AuthError> {
    let invalid = |reason: String| AuthError::InvalidTenant {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

/// Authenticates once against `tenant_url`. The mode, and any secret it
/// carries, is consumed by the provider.
pub fn establish(
    provider: &dyn AuthProvider,
    tenant_url: &str,
    mode: AuthMode,
) -> Result<Session, AuthError> {
    let tenant = parse_tenant_url(tenant_url)?;
    info!("authenticating against {} using {}", tenant, mode.describe());
    let session = provider.connect(&tenant, mode)?;
    info!("connected to {}", session.tenant());
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::always;

    fn credentials() -> AuthMode {
        AuthMode::ClientCredentials {
            client_id: "enroller".to_owned(),
            client_secret: ClientSecret::new("hunter2"),
        }
    }

    #[test]
    fn secret_is_redacted() {
        let mode = credentials();
        let rendered = format!("{:?}", mode);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains(REDACTED));
        assert_eq!(ClientSecret::new("hunter2").to_string(), REDACTED);
    }

    #[test]
    fn session_debug_hides_token() {
        let tenant = Url::parse("https://acme.example.com").unwrap();
        let session = Session::new(tenant, "tok-123");
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("tok-123"));
        assert_eq!(session.access_token(), "tok-123");
    }

    #[test]
    fn malformed_tenant_never_reaches_provider() {
        let mut provider = MockAuthProvider::new();
        provider.expect_connect().times(0);

        let err = establish(&provider, "not a url", AuthMode::Interactive).unwrap_err();
        assert!(matches!(err, AuthError::InvalidTenant { .. }));

        let err = establish(&provider, "ftp://acme.example.com", AuthMode::Interactive).unwrap_err();
        assert!(matches!(err, AuthError::InvalidTenant { .. }));
    }

    #[test]
    fn provider_receives_parsed_tenant_and_mode() {
        let mut provider = MockAuthProvider::new();
        provider
            .expect_connect()
            .withf(|tenant, mode| {
                tenant.host_str() == Some("acme.example.com") && *mode == credentials()
            })
            .times(1)
            .returning(|tenant, _| Ok(Session::new(tenant.clone(), "tok")));

        let session = establish(&provider, "https://acme.example.com", credentials()).unwrap();
        assert_eq!(session.access_token(), "tok");
    }

    #[test]
    fn provider_failure_is_returned() {
        let mut provider = MockAuthProvider::new();
        provider
            .expect_connect()
            .with(always(), always())
            .returning(|_, _| Err(AuthError::Cancelled));

        let err = establish(&provider, "https://acme.example.com", AuthMode::Interactive).unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
    }
}
