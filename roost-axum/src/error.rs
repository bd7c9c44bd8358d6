use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roost_auth::AuthError;
use roost_core::RoostError;
use roost_queue::QueueError;
use roost_rbac::RbacError;
use roost_store::RepoError;

#[derive(Debug)]
pub struct RoostAxumError(pub anyhow::Error);

impl From<anyhow::Error> for RoostAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<RoostError> for RoostAxumError {
    fn from(e: RoostError) -> Self {
        Self(e.into_anyhow())
    }
}

macro_rules! via_roost_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RoostAxumError {
                fn from(e: $ty) -> Self {
                    RoostError::from(e).into()
                }
            }
        )*
    };
}

via_roost_error!(RbacError, RepoError, AuthError, QueueError);

impl IntoResponse for RoostAxumError {
    fn into_response(self) -> Response {
        // Structured errors keep their kind even when wrapped in anyhow contexts.
        let roost = match RoostError::find_in(&self.0) {
            Some(roost) => roost.sanitize_for_client(),
            None => RoostError::server_error(self.0.to_string()),
        };

        if roost.status_code() >= 500 {
            tracing::error!(error = ?self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        let status =
            StatusCode::from_u16(roost.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(roost.to_json())).into_response()
    }
}
