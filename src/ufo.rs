//! HTTP client for the UFO tenant API.
//!
//! One blocking [`ureq::Agent`] serves both the login handshake and the
//! identity calls. No request timeouts are configured.

use crate::remote::{IdentityAssigner, RemoteError};
use crate::session::{AuthError, AuthMode, AuthProvider, ClientSecret, Session};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use url::Url;
use zeroize::Zeroizing;

const TOKEN_PATH: &str = "oauth/token";
const SIGN_IN_PATH: &str = "login";
const IDENTITIES_PATH: &str = "api/v1/identities";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignIdentityRequest<'a> {
    email: &'a str,
    identity_type: &'a str,
    identity_value: &'a str,
}

#[derive(Clone)]
pub struct UfoClient {
    agent: ureq::Agent,
}

impl Default for UfoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UfoClient {
    pub fn new() -> Self {
        UfoClient {
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn exchange_client_credentials(
        &self,
        tenant: &Url,
        client_id: &str,
        client_secret: &ClientSecret,
    ) -> Result<Zeroizing<String>, AuthError> {
        let url = endpoint(tenant, TOKEN_PATH);
        debug!("requesting token from {} for client '{}'", url, client_id);

        let response = self
            .agent
            .post(&url)
            .send_form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret.expose()),
            ])
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => AuthError::Rejected {
                    status,
                    message: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(transport) => AuthError::Transport(transport.to_string()),
            })?;

        let token: TokenResponse = response
            .into_json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("empty access token".to_owned()));
        }
        Ok(Zeroizing::new(token.access_token))
    }
}

impl AuthProvider for UfoClient {
    fn connect(&self, tenant: &Url, mode: AuthMode) -> Result<Session, AuthError> {
        let token = match mode {
            AuthMode::Interactive => {
                let stdin = io::stdin();
                prompt_for_token(&endpoint(tenant, SIGN_IN_PATH), stdin.lock(), io::stderr())?
            }
            AuthMode::ClientCredentials {
                client_id,
                client_secret,
            } => self.exchange_client_credentials(tenant, &client_id, &client_secret)?,
        };
        Ok(Session::new(tenant.clone(), token.as_str()))
    }
}

impl IdentityAssigner for UfoClient {
    fn assign_identity(
        &self,
        session: &Session,
        email: &str,
        identity_type: &str,
        identity_value: &str,
    ) -> Result<(), RemoteError> {
        let url = endpoint(session.tenant(), IDENTITIES_PATH);
        let request = AssignIdentityRequest {
            email,
            identity_type,
            identity_value,
        };

        match self
            .agent
            .post(&url)
            .set(
                "Authorization",
                &format!("Bearer {}", session.access_token()),
            )
            .send_json(&request)
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => Err(RemoteError::new(format!(
                "HTTP {}: {}",
                status,
                response.into_string().unwrap_or_default().trim()
            ))),
            Err(ureq::Error::Transport(transport)) => Err(RemoteError::new(transport.to_string())),
        }
    }
}

fn endpoint(tenant: &Url, path: &str) -> String {
    format!("{}/{}", tenant.as_str().trim_end_matches('/'), path)
}

/// Sends the operator to `sign_in_url` and reads back the access token the
/// tenant shows after login. A blank line or end of input cancels.
pub fn prompt_for_token<R: BufRead, W: Write>(
    sign_in_url: &str,
    mut input: R,
    mut output: W,
) -> Result<Zeroizing<String>, AuthError> {
    writeln!(
        output,
        "Sign in at {} and paste the access token shown after login (leave empty to cancel):",
        sign_in_url
    )?;
    output.flush()?;

    let mut line = Zeroizing::new(String::new());
    if input.read_line(&mut line)? == 0 {
        return Err(AuthError::Cancelled);
    }
    let token = line.trim();
    if token.is_empty() {
        return Err(AuthError::Cancelled);
    }
    Ok(Zeroizing::new(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let tenant = Url::parse("https://acme.example.com/").unwrap();
        assert_eq!(
            endpoint(&tenant, IDENTITIES_PATH),
            "https://acme.example.com/api/v1/identities"
        );

        let tenant = Url::parse("https://acme.example.com/eu").unwrap();
        assert_eq!(
            endpoint(&tenant, TOKEN_PATH),
            "https://acme.example.com/eu/oauth/token"
        );
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = serde_json::to_value(AssignIdentityRequest {
            email: "abc1@example.com",
            identity_type: "CardNumber",
            identity_value: "1a2b3c4d",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "email": "abc1@example.com",
                "identityType": "CardNumber",
                "identityValue": "1a2b3c4d",
            })
        );
    }

    #[test]
    fn pasted_token_is_trimmed() {
        let mut shown = Vec::new();
        let token = prompt_for_token(
            "https://acme.example.com/login",
            Cursor::new("  tok-42 \n"),
            &mut shown,
        )
        .unwrap();
        assert_eq!(token.as_str(), "tok-42");
        assert!(String::from_utf8(shown)
            .unwrap()
            .contains("https://acme.example.com/login"));
    }

    #[test]
    fn blank_or_closed_input_cancels() {
        let err = prompt_for_token("u", Cursor::new("\n"), io::sink()).unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));

        let err = prompt_for_token("u", Cursor::new(""), io::sink()).unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
    }
}
