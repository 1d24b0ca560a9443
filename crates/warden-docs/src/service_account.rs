//! Service-account credentials and JWT bearer assertions.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::docs_types::DocsError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DOCUMENT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];
const ASSERTION_LIFETIME_SECONDS: u64 = 3_600;

#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct JwtBearerClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

impl ServiceAccountCredentials {
    /// Parses the downloaded service-account key file contents.
    pub fn from_json(raw: &str) -> Result<Self, DocsError> {
        if raw.trim().is_empty() {
            return Err(DocsError::MissingCredentials);
        }
        let mut parsed: Self = serde_json::from_str(raw)
            .map_err(|error| DocsError::InvalidCredentials(error.to_string()))?;
        if parsed.client_email.trim().is_empty() {
            return Err(DocsError::InvalidCredentials(
                "client_email is empty".to_string(),
            ));
        }
        // Keys pasted into env files often keep the JSON escapes literally.
        if !parsed.private_key.contains('\n') && parsed.private_key.contains("\\n") {
            parsed.private_key = parsed.private_key.replace("\\n", "\n");
        }
        if !parsed.private_key.contains("PRIVATE KEY") {
            return Err(DocsError::InvalidCredentials(
                "private_key is not a PEM private key".to_string(),
            ));
        }
        Ok(parsed)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI)
    }

    /// Builds the RS256-signed assertion exchanged for an access token.
    pub fn signed_assertion(&self, issued_at_unix: u64) -> Result<String, DocsError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|error| {
            DocsError::InvalidCredentials(format!("private_key is not a valid RSA key: {error}"))
        })?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let claims = JwtBearerClaims {
            iss: self.client_email.as_str(),
            scope: DOCUMENT_SCOPES.join(" "),
            aud: self.token_uri(),
            iat: issued_at_unix,
            exp: issued_at_unix.saturating_add(ASSERTION_LIFETIME_SECONDS),
        };
        Ok(encode(&header, &claims, &key)?)
    }
}
