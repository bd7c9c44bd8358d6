pub mod guest;
pub mod hotels;
pub mod rooms;
pub mod stays;
pub mod status;

use axum::Router;
use roost_axum::extract::classify_data_error;
use roost_axum::RoostAxumError;
use roost_core::RoostError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::state::AppState;

pub type ApiResult<T> = Result<T, RoostAxumError>;

pub const DELETED: &str = "Successfully deleted!";

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(status::router())
        .nest("/hotels", hotels::router())
        .nest("/rooms", rooms::router())
        .nest("/stays", stays::router())
        .merge(guest::router())
}

/// Split a create body into the parent id under `field` and the entity
/// draft made of the remaining fields. The parent id comes back in the
/// hyphenated lowercase form the keys are written with.
pub(crate) fn take_parent<D>(mut body: Map<String, Value>, field: &str) -> Result<(String, D), RoostError>
where
    D: DeserializeOwned,
{
    let parent = match body.remove(field) {
        None | Some(Value::Null) => return Err(RoostError::missing_parameter(format!("/{field}"))),
        Some(Value::String(id)) => Uuid::parse_str(&id)
            .map_err(|_| RoostError::validation(format!("/{field}")))?
            .to_string(),
        Some(_) => return Err(RoostError::validation(format!("/{field}"))),
    };
    let draft = serde_json::from_value(Value::Object(body))
        .map_err(|e| classify_data_error(&e.to_string()))?;
    Ok((parent, draft))
}
