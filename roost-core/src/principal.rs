//! The authenticated caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role name as configured in the grant table.
///
/// The well-known roles have constants; any other name is allowed and is
/// resolved (or rejected) by the grant table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const HOTELIER: &'static str = "hotelier";
    pub const GUEST: &'static str = "guest";

    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Roles that must carry a hotel affiliation.
    pub fn requires_hotel(&self) -> bool {
        self.0 == Self::HOTELIER
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    #[error("principal id must not be empty")]
    MissingId,
    #[error("role `{0}` requires a hotel affiliation")]
    MissingHotel(String),
}

/// Identity and claims of the caller, built once per request from a
/// verified token and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
    pub super_admin: bool,
    /// Remaining token claims, carried through for handlers that echo them.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        hotel_id: Option<String>,
    ) -> Result<Self, PrincipalError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PrincipalError::MissingId);
        }
        let hotel_id = hotel_id.filter(|h| !h.trim().is_empty());
        if role.requires_hotel() && hotel_id.is_none() {
            return Err(PrincipalError::MissingHotel(role.0));
        }
        Ok(Self {
            id,
            role,
            hotel_id,
            super_admin: false,
            claims: serde_json::Map::new(),
        })
    }

    pub fn with_super_admin(mut self, super_admin: bool) -> Self {
        self.super_admin = super_admin;
        self
    }

    pub fn with_claims(mut self, claims: serde_json::Map<String, serde_json::Value>) -> Self {
        self.claims = claims;
        self
    }

    pub fn hotel_id(&self) -> Option<&str> {
        self.hotel_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotelier_needs_a_hotel() {
        let err = Principal::new("u-1", Role::new(Role::HOTELIER), None).unwrap_err();
        assert_eq!(err, PrincipalError::MissingHotel("hotelier".into()));

        let blank = Principal::new("u-1", Role::new(Role::HOTELIER), Some("  ".into()));
        assert!(blank.is_err());

        let ok = Principal::new("u-1", Role::new(Role::HOTELIER), Some("h-1".into())).unwrap();
        assert_eq!(ok.hotel_id(), Some("h-1"));
        assert!(!ok.super_admin);
    }

    #[test]
    fn admin_without_hotel_is_fine() {
        let p = Principal::new("u-2", Role::new(Role::ADMIN), None)
            .unwrap()
            .with_super_admin(true);
        assert!(p.super_admin);
        assert_eq!(p.role.to_string(), "admin");
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(
            Principal::new(" ", Role::new(Role::GUEST), None).unwrap_err(),
            PrincipalError::MissingId
        );
    }
}
