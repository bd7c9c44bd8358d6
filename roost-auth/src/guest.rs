use serde::{Deserialize, Serialize};

use crate::errors::AuthError;
use crate::jwt::{decode, encode, Checks};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestClaims {
    pub stay_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Tokens handed to guests, binding the bearer to one stay.
///
/// Signed with their own secret, separate from staff access tokens. Expiry
/// is optional and checked only when present.
#[derive(Debug, Clone)]
pub struct GuestTokens {
    secret: String,
}

impl GuestTokens {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn sign(&self, stay_id: &str) -> Result<String, AuthError> {
        encode(
            &self.secret,
            &GuestClaims {
                stay_id: stay_id.to_string(),
                exp: None,
            },
        )
    }

    pub fn verify(&self, token: &str) -> Result<GuestClaims, AuthError> {
        let claims: GuestClaims = decode(
            &self.secret,
            token,
            Checks {
                issuer: None,
                audience: &[],
                require_exp: false,
            },
        )?;
        if claims.stay_id.trim().is_empty() {
            return Err(AuthError::MissingClaim("stayId"));
        }
        Ok(claims)
    }
}

#[cfg(all(test, any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
mod tests {
    use super::*;

    #[test]
    fn round_trips_stay_id() {
        let tokens = GuestTokens::new("guest-secret");
        let token = tokens.sign("S1").unwrap();
        assert_eq!(tokens.verify(&token).unwrap().stay_id, "S1");
    }

    #[test]
    fn rejects_foreign_and_blank_tokens() {
        let token = GuestTokens::new("a").sign("S1").unwrap();
        assert!(matches!(
            GuestTokens::new("b").verify(&token),
            Err(AuthError::InvalidToken(_))
        ));

        let blank = GuestTokens::new("a").sign(" ").unwrap();
        assert_eq!(
            GuestTokens::new("a").verify(&blank),
            Err(AuthError::MissingClaim("stayId"))
        );
    }
}
