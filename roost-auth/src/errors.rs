use roost_core::{ErrorKind, PrincipalError, RoostError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no bearer token supplied")]
    MissingToken,

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("token has no `{0}` claim")]
    MissingClaim(&'static str),

    #[error(transparent)]
    InvalidPrincipal(#[from] PrincipalError),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)")]
    Disabled,
}

impl From<AuthError> for RoostError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::Signing(_) | AuthError::Disabled => ErrorKind::ServerError,
            _ => ErrorKind::Unauthorized,
        };
        RoostError::of(kind).with_source(err)
    }
}
