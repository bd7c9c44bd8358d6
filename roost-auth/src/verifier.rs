use async_trait::async_trait;
use roost_core::{Principal, Role};
use serde_json::{Map, Value};

use crate::errors::AuthError;

pub const CLAIM_SUBJECT: &str = "sub";
pub const CLAIM_ROLE: &str = "custom:role";
pub const CLAIM_HOTEL: &str = "custom:hotelId";
pub const CLAIM_SUPER_ADMIN: &str = "custom:superAdmin";

/// Turns a bearer credential into the request's [`Principal`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Build a principal from identity-provider claims.
///
/// Boolean-ish claims may arrive as strings (`"true"`, `"1"`), as identity
/// providers tend to store custom attributes that way.
pub fn principal_from_claims(claims: Map<String, Value>) -> Result<Principal, AuthError> {
    let id = string_claim(&claims, CLAIM_SUBJECT).ok_or(AuthError::MissingClaim(CLAIM_SUBJECT))?;
    let role = string_claim(&claims, CLAIM_ROLE).ok_or(AuthError::MissingClaim(CLAIM_ROLE))?;
    let hotel_id = string_claim(&claims, CLAIM_HOTEL);
    let super_admin = match claims.get(CLAIM_SUPER_ADMIN) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    };

    Ok(Principal::new(id, Role::new(role), hotel_id)?
        .with_super_admin(super_admin)
        .with_claims(claims))
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
}
