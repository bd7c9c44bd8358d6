//! Request extractors that fail with structured errors.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use roost_auth::{extract_bearer_token, AuthError, GuestClaims, GuestTokens, TokenVerifier};
use roost_core::{Principal, RoostError};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::RoostAxumError;

/// State that can verify staff access tokens.
pub trait HasVerifier {
    fn verifier(&self) -> &Arc<dyn TokenVerifier>;
}

/// State that can verify guest tokens.
pub trait HasGuestTokens {
    fn guest_tokens(&self) -> &GuestTokens;
}

/// The verified caller. Missing or invalid credentials are `Unauthorized`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: HasVerifier + Send + Sync,
{
    type Rejection = RoostAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let principal = state.verifier().verify(token).await?;
        Ok(Self(principal))
    }
}

/// Claims of a guest token. A missing token is a missing parameter, an
/// invalid one is `Unauthorized`.
#[derive(Debug, Clone)]
pub struct Guest(pub GuestClaims);

impl<S> FromRequestParts<S> for Guest
where
    S: HasGuestTokens + Send + Sync,
{
    type Rejection = RoostAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| RoostError::missing_parameter("/authorization"))?;
        let claims = state.guest_tokens().verify(token)?;
        Ok(Self(claims))
    }
}

/// `{id}` path segment, which must be a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidId(pub String);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = RoostAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| RoostError::validation("/id"))?;
        let id = Uuid::parse_str(&raw).map_err(|_| RoostError::validation("/id"))?;
        Ok(Self(id.to_string()))
    }
}

/// JSON body whose deserialization failures map onto the validation kinds.
#[derive(Debug, Clone)]
pub struct Body<T>(pub T);

impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RoostAxumError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(map_json_rejection(rejection).into()),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> RoostError {
    match rejection {
        JsonRejection::JsonDataError(e) => classify_data_error(&e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            RoostError::bad_request("Expected request with `Content-Type: application/json`")
        }
        JsonRejection::JsonSyntaxError(_) => RoostError::validation("/"),
        other => RoostError::bad_request(other.body_text()),
    }
}

/// Map serde's message onto a field path: missing and unknown fields get
/// their own kinds, everything else is a plain validation error.
pub fn classify_data_error(text: &str) -> RoostError {
    if let Some(field) = backticked_after(text, "missing field ") {
        return RoostError::missing_parameter(format!("/{field}"));
    }
    if let Some(field) = backticked_after(text, "unknown field ") {
        return RoostError::additional_parameter(format!("/{field}"));
    }
    RoostError::validation(data_error_path(text))
}

fn backticked_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let rest = rest.strip_prefix('`')?;
    rest.split('`').next()
}

/// `"...target type: floor: invalid type..."` gives `/floor`; nested
/// paths like `a.b[0]` become `/a/b/0`.
fn data_error_path(text: &str) -> String {
    const MARKER: &str = "target type: ";
    let Some(start) = text.find(MARKER) else {
        return "/".to_string();
    };
    let rest = &text[start + MARKER.len()..];
    let Some((path, _)) = rest.split_once(": ") else {
        return "/".to_string();
    };
    if path.is_empty() || path == "." || path.contains(' ') {
        return "/".to_string();
    }
    let segments: Vec<&str> = path
        .split(['.', '[', ']'])
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::ErrorKind;
    use serde_json::json;

    #[test]
    fn missing_and_unknown_fields_get_their_own_kinds() {
        let e = classify_data_error(
            "Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 2",
        );
        assert_eq!(e.kind, ErrorKind::MissingRequiredParameter);
        assert_eq!(e.data, Some(json!("/name")));

        let e = classify_data_error(
            "Failed to deserialize the JSON body into the target type: unknown field `view`, expected `number` or `floor` at line 1 column 7",
        );
        assert_eq!(e.kind, ErrorKind::AdditionalParameters);
        assert_eq!(e.data, Some(json!("/view")));
    }

    #[test]
    fn type_errors_point_at_the_field() {
        let e = classify_data_error(
            "Failed to deserialize the JSON body into the target type: floor: invalid type: string \"x\", expected i64 at line 1 column 12",
        );
        assert_eq!(e.kind, ErrorKind::ValidationError);
        assert_eq!(e.data, Some(json!("/floor")));

        let e = classify_data_error("something else entirely");
        assert_eq!(e.data, Some(json!("/")));
    }
}
