//! roost-auth: who is calling.
//!
//! Staff requests carry an access token verified by a [`TokenVerifier`]
//! ([`JwtVerifier`] by default). Guests carry a [`GuestTokens`] token bound
//! to a single stay.

pub mod bearer;
pub mod errors;
pub mod guest;
pub mod jwt;
pub mod verifier;

pub use bearer::extract_bearer_token;
pub use errors::AuthError;
pub use guest::{GuestClaims, GuestTokens};
pub use jwt::{JwtOptions, JwtVerifier};
pub use verifier::{principal_from_claims, TokenVerifier};
