//! Service-account authentication for the Drive API.
//!
//! Implements the OAuth2 JWT-bearer flow: an RS256-signed assertion built
//! from the service-account key is exchanged at the token endpoint for a
//! short-lived bearer token, which is cached until near expiry.

use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::DriveError;

/// OAuth2 scope: read-only Drive access.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Grant type for the JWT-bearer assertion exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion (and token) lifetime in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the cached token this many seconds before it expires.
const EXPIRY_SLACK_SECS: i64 = 60;

/// The fields we use from a Google service-account JSON key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Load and parse a service-account key file.
    pub fn from_file(path: &Path) -> Result<Self, DriveError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DriveError::Credentials(format!(
                "cannot read service-account key file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DriveError::Credentials(format!("malformed service-account key file: {e}"))
        })
    }
}

/// Claims of the OAuth2 JWT-bearer assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// A bearer token with its expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Exchanges service-account assertions for bearer tokens, caching the
/// current token until near expiry.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, client: reqwest::Client) -> Self {
        Self {
            key,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, fetching a fresh one if the cached
    /// token is missing or about to expire.
    pub async fn bearer_token(&self) -> Result<String, DriveError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(ref token) = *cached {
            if token.expires_at - EXPIRY_SLACK_SECS > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    /// Sign an assertion and exchange it at the token endpoint.
    async fn fetch_token(&self, now: i64) -> Result<CachedToken, DriveError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DriveError::Credentials(format!("invalid private key: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| DriveError::Credentials(format!("cannot sign assertion: {e}")))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Obtained Drive bearer token");
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}
