use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use roost_axum::Guest;
use roost_store::{Hotel, Room, Stay};
use serde::Serialize;

use super::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/guest", get(my_stay))
}

#[derive(Debug, Serialize)]
pub struct GuestView {
    pub hotel: Hotel,
    pub room: Room,
    pub stay: Stay,
}

/// Stay -> room -> hotel for the stay bound to the guest token.
async fn my_stay(
    State(state): State<AppState>,
    Guest(claims): Guest,
) -> ApiResult<Json<GuestView>> {
    let (hotel, room, stay) = state.repos.stay_chain(&claims.stay_id).await?;
    Ok(Json(GuestView { hotel, room, stay }))
}
