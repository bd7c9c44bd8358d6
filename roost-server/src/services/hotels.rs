use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use roost_axum::{Authenticated, Body, ValidId};
use roost_core::RoostError;
use roost_rbac::{check_scope, Resource};
use roost_store::{Hotel, HotelDraft, HotelPatch, Room, RoomDraft};

use super::{ApiResult, DELETED};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(find).patch(update).delete(remove))
        .route("/{id}/rooms", get(list_rooms).put(create_room))
}

/// ISO 3166-1 alpha-2.
fn check_country(country: Option<&str>) -> Result<(), RoostError> {
    match country {
        Some(c) if c.chars().count() != 2 => Err(RoostError::validation("/country")),
        _ => Ok(()),
    }
}

async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<Hotel>>> {
    state.rbac.authorize(&principal, Resource::Hotels, "read:any")?;
    Ok(Json(state.repos.hotels.list_all().await?))
}

// A hotel owns itself, so the scope check can run before the read.
async fn find(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Hotel>> {
    let grant = state.rbac.authorize(&principal, Resource::Hotels, "read")?;
    check_scope(&grant, &principal, &id)?;
    Ok(Json(state.repos.hotels.get_own(&id).await?))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Body(draft): Body<HotelDraft>,
) -> ApiResult<(StatusCode, Json<Hotel>)> {
    state.rbac.authorize(&principal, Resource::Hotels, "create")?;
    check_country(draft.country.as_deref())?;

    let hotel = state.repos.hotels.create(None, draft).await?;
    tracing::info!(hotel_id = %hotel.id, "Hotel created");
    Ok((StatusCode::CREATED, Json(hotel)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
    Body(patch): Body<HotelPatch>,
) -> ApiResult<Json<Hotel>> {
    let grant = state.rbac.authorize(&principal, Resource::Hotels, "update")?;
    check_scope(&grant, &principal, &id)?;
    check_country(patch.country.as_deref())?;

    let updated = state.repos.hotels.update(&id, patch).await?;
    Ok(Json(updated.current))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<&'static str>> {
    let grant = state.rbac.authorize(&principal, Resource::Hotels, "delete")?;
    check_scope(&grant, &principal, &id)?;

    state.repos.hotels.delete(&id).await?;
    tracing::info!(hotel_id = %id, "Hotel deleted");
    Ok(Json(DELETED))
}

async fn list_rooms(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Vec<Room>>> {
    let grant = state.rbac.authorize(&principal, Resource::Rooms, "read")?;
    check_scope(&grant, &principal, &id)?;

    let hotel = state.repos.hotels.get_own(&id).await?;
    Ok(Json(state.repos.rooms.list_by_parent(&hotel.id).await?))
}

async fn create_room(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
    Body(draft): Body<RoomDraft>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let grant = state.rbac.authorize(&principal, Resource::Rooms, "create")?;
    check_scope(&grant, &principal, &id)?;

    let room = state.repos.rooms.create(Some(&id), draft).await?;
    Ok((StatusCode::CREATED, Json(room)))
}
