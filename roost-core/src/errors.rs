//! # Errors
//!
//! Roost uses one flat error taxonomy for every entity and route so that
//! clients can branch on a single numeric code.
//!
//! - every kind has an HTTP status and a stable `error` code
//! - a `RoostError` can travel inside `anyhow::Error`
//! - the transport crate decides how to render it (`to_json` is the default shape)

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

/// A convenience result type for Roost APIs that carry errors through `anyhow`.
pub type RoostResult<T> = std::result::Result<T, AnyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ServerError,              // 500 / 1
    ValidationError,          // 400 / 200
    MissingRequiredParameter, // 400 / 201
    AdditionalParameters,     // 400 / 202
    BadRequest,               // 400 / 400
    Unauthorized,             // 401 / 401
    Forbidden,                // 403 / 403
    NotFound,                 // 404 / 404
    NotAcceptable,            // 406 / 406
    Conflict,                 // 409 / 409
    InvalidRole,              // 403 / 410
    ForbiddenResource,        // 403 / 411
}

impl ErrorKind {
    /// HTTP status used when the error reaches a client.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::ServerError => 500,
            ErrorKind::ValidationError
            | ErrorKind::MissingRequiredParameter
            | ErrorKind::AdditionalParameters
            | ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden | ErrorKind::InvalidRole | ErrorKind::ForbiddenResource => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::NotAcceptable => 406,
            ErrorKind::Conflict => 409,
        }
    }

    /// Stable numeric code. Several kinds share a status, never a code.
    pub fn error_code(&self) -> u16 {
        match self {
            ErrorKind::ServerError => 1,
            ErrorKind::ValidationError => 200,
            ErrorKind::MissingRequiredParameter => 201,
            ErrorKind::AdditionalParameters => 202,
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::NotAcceptable => 406,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidRole => 410,
            ErrorKind::ForbiddenResource => 411,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::ServerError => "ServerError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::MissingRequiredParameter => "MissingRequiredParameter",
            ErrorKind::AdditionalParameters => "AdditionalParameters",
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NotAcceptable => "NotAcceptable",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InvalidRole => "InvalidRole",
            ErrorKind::ForbiddenResource => "ForbiddenResource",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::ServerError => "server-error",
            ErrorKind::ValidationError => "validation-error",
            ErrorKind::MissingRequiredParameter => "missing-required-parameter",
            ErrorKind::AdditionalParameters => "additional-parameters",
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::NotAcceptable => "not-acceptable",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidRole => "invalid-role",
            ErrorKind::ForbiddenResource => "forbidden-resource",
        }
    }

    /// Message used when the caller does not supply one.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::ServerError => {
                "System error: operation not completed, please try again later"
            }
            ErrorKind::ValidationError => "Validation Error",
            ErrorKind::MissingRequiredParameter => "Missing required parameters",
            ErrorKind::AdditionalParameters => "Additional parameters are not permitted",
            ErrorKind::BadRequest => "Bad request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden | ErrorKind::InvalidRole | ErrorKind::ForbiddenResource => {
                "Forbidden"
            }
            ErrorKind::NotFound => "Not found",
            ErrorKind::NotAcceptable => "Not acceptable",
            ErrorKind::Conflict => "Conflict",
        }
    }
}

/// A structured Roost error that can live inside `anyhow::Error`.
///
/// `data` is the optional diagnostic payload (for example the offending
/// field path `"/startTime"`); `source` never leaves the process.
#[derive(Debug)]
pub struct RoostError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
    pub source: Option<AnyError>,
}

impl RoostError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Error of `kind` carrying its default message.
    pub fn of(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<AnyError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn error_code(&self) -> u16 {
        self.kind.error_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `RoostError` anywhere in an `anyhow` chain.
    pub fn find_in(err: &AnyError) -> Option<&RoostError> {
        err.chain().find_map(|e| e.downcast_ref::<RoostError>())
    }

    /// Turn any error into a `RoostError`:
    /// - if it already is one, keep it
    /// - otherwise wrap it as `ServerError`
    pub fn normalize(err: AnyError) -> RoostError {
        match err.downcast::<RoostError>() {
            Ok(roost) => roost,
            Err(other) => RoostError::of(ErrorKind::ServerError).with_source(other),
        }
    }

    /// Copy without the `source` chain, safe to hand to a client.
    pub fn sanitize_for_client(&self) -> RoostError {
        RoostError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.status_code(),
            "className": self.class_name(),
            "error": self.error_code(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, msg)
    }
    pub fn validation(path: impl Into<String>) -> Self {
        Self::of(ErrorKind::ValidationError).with_data(path.into())
    }
    pub fn missing_parameter(path: impl Into<String>) -> Self {
        Self::of(ErrorKind::MissingRequiredParameter).with_data(path.into())
    }
    pub fn additional_parameter(path: impl Into<String>) -> Self {
        Self::of(ErrorKind::AdditionalParameters).with_data(path.into())
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn not_acceptable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAcceptable, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn invalid_role(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRole, msg)
    }
    pub fn forbidden_resource(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ForbiddenResource, msg)
    }
}

impl fmt::Display for RoostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}): {}",
            self.name(),
            self.status_code(),
            self.error_code(),
            self.message
        )
    }
}

impl std::error::Error for RoostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Return early with a `RoostError` converted into `anyhow::Error`.
#[macro_export]
macro_rules! bail_roost {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::RoostError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::RoostError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rbac_kinds_share_status_but_not_code() {
        for kind in [
            ErrorKind::Forbidden,
            ErrorKind::InvalidRole,
            ErrorKind::ForbiddenResource,
        ] {
            assert_eq!(kind.status_code(), 403);
        }
        assert_eq!(ErrorKind::Forbidden.error_code(), 403);
        assert_eq!(ErrorKind::InvalidRole.error_code(), 410);
        assert_eq!(ErrorKind::ForbiddenResource.error_code(), 411);
    }

    #[test]
    fn json_shape_carries_status_and_stable_code() {
        let err = RoostError::missing_parameter("/startTime");
        let body = err.to_json();
        assert_eq!(body["name"], "MissingRequiredParameter");
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], 201);
        assert_eq!(body["className"], "missing-required-parameter");
        assert_eq!(body["data"], "/startTime");
    }

    #[test]
    fn normalize_keeps_roost_errors_and_wraps_others() {
        let kept = RoostError::normalize(RoostError::not_found("gone").into_anyhow());
        assert_eq!(kept.kind, ErrorKind::NotFound);
        assert_eq!(kept.message, "gone");

        let wrapped = RoostError::normalize(anyhow::anyhow!("disk on fire"));
        assert_eq!(wrapped.kind, ErrorKind::ServerError);
        assert!(wrapped.source.is_some());
        assert!(wrapped.sanitize_for_client().source.is_none());
    }

    #[test]
    fn find_in_sees_through_context() {
        let err = RoostError::forbidden("nope")
            .into_anyhow()
            .context("while reading hotel");
        let found = RoostError::find_in(&err).unwrap();
        assert_eq!(found.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn bail_macro_returns_roost_error() {
        fn fails() -> RoostResult<()> {
            bail_roost!(conflict, "room {} already has an open stay", "r-1");
        }
        let err = fails().unwrap_err();
        let roost = RoostError::find_in(&err).unwrap();
        assert_eq!(roost.kind, ErrorKind::Conflict);
        assert!(roost.message.contains("r-1"));
    }
}
