//! HS256 access tokens.

use async_trait::async_trait;
use roost_core::Principal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AuthError;
use crate::verifier::{principal_from_claims, TokenVerifier};

#[derive(Debug, Clone, Default)]
pub struct JwtOptions {
    pub secret: String,
    /// Required `iss`, when set.
    pub issuer: Option<String>,
    /// Accepted `aud` values. Empty disables the audience check.
    pub audience: Vec<String>,
}

/// What [`decode`] checks beyond the signature.
pub(crate) struct Checks<'a> {
    pub issuer: Option<&'a str>,
    pub audience: &'a [String],
    pub require_exp: bool,
}

/// Verifies access tokens signed with a shared secret and maps their claims
/// onto a [`Principal`].
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    options: JwtOptions,
}

impl JwtVerifier {
    pub fn new(options: JwtOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JwtOptions {
        &self.options
    }

    /// Sign `claims` as-is. `exp`, `iss` and `aud` are the caller's business.
    pub fn sign(&self, claims: &Map<String, Value>) -> Result<String, AuthError> {
        encode(&self.options.secret, claims)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Map<String, Value>, AuthError> {
        decode(
            &self.options.secret,
            token,
            Checks {
                issuer: self.options.issuer.as_deref(),
                audience: &self.options.audience,
                require_exp: true,
            },
        )
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.decode_claims(token).map_err(|e| {
            tracing::debug!(error = %e, "Token not valid");
            e
        })?;
        principal_from_claims(claims)
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
pub(crate) fn encode<T: Serialize>(secret: &str, claims: &T) -> Result<String, AuthError> {
    use jsonwebtoken::{EncodingKey, Header};

    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
pub(crate) fn decode<T: DeserializeOwned>(
    secret: &str,
    token: &str,
    checks: Checks<'_>,
) -> Result<T, AuthError> {
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};

    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = checks.issuer {
        validation.set_issuer(&[issuer]);
    }
    if checks.audience.is_empty() {
        validation.validate_aud = false;
    } else {
        validation.set_audience(checks.audience);
    }
    if !checks.require_exp {
        validation.required_spec_claims.clear();
    }

    jsonwebtoken::decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
pub(crate) fn encode<T: Serialize>(_secret: &str, _claims: &T) -> Result<String, AuthError> {
    Err(AuthError::Disabled)
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
pub(crate) fn decode<T: DeserializeOwned>(
    _secret: &str,
    _token: &str,
    _checks: Checks<'_>,
) -> Result<T, AuthError> {
    Err(AuthError::Disabled)
}
