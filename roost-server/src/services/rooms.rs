use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use roost_axum::{Authenticated, Body, ValidId};
use roost_core::Principal;
use roost_queue::StayEventKind;
use roost_rbac::{check_scope, Resource};
use roost_store::{Entity, RepoError, Room, RoomDraft, RoomPatch, Stay, StayDraft};
use serde_json::{Map, Value};

use super::{take_parent, ApiResult, DELETED};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(find).patch(update).delete(remove))
        .route("/{id}/stays", get(list_stays).put(check_in))
        .route("/{id}/stays/current", get(current_stay))
}

/// Authorize `action` on `resource`, then fetch the room and check it
/// belongs to the caller's hotel.
async fn owned_room(
    state: &AppState,
    principal: &Principal,
    resource: Resource,
    action: &str,
    id: &str,
) -> ApiResult<Room> {
    let grant = state.rbac.authorize(principal, resource, action)?;
    let room = state.repos.rooms.get_own(id).await?;
    check_scope(&grant, principal, &room.hotel_id)?;
    Ok(room)
}

async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<Room>>> {
    state.rbac.authorize(&principal, Resource::Rooms, "read:any")?;
    Ok(Json(state.repos.rooms.list_all().await?))
}

async fn find(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Room>> {
    let room = owned_room(&state, &principal, Resource::Rooms, "read", &id).await?;
    Ok(Json(room))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Body(body): Body<Map<String, Value>>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let grant = state.rbac.authorize(&principal, Resource::Rooms, "create")?;
    let (hotel_id, draft): (String, RoomDraft) = take_parent(body, "hotelId")?;
    check_scope(&grant, &principal, &hotel_id)?;

    let room = state.repos.rooms.create(Some(&hotel_id), draft).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
    Body(patch): Body<RoomPatch>,
) -> ApiResult<Json<Room>> {
    let room = owned_room(&state, &principal, Resource::Rooms, "update", &id).await?;
    let key = room.key().map_err(RepoError::from)?;
    let updated = state.repos.rooms.update_key(&key, room, patch).await?;
    Ok(Json(updated.current))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<&'static str>> {
    let room = owned_room(&state, &principal, Resource::Rooms, "delete", &id).await?;
    let key = room.key().map_err(RepoError::from)?;
    let stays = state.repos.rooms.delete_key(&key).await?;
    tracing::info!(room_id = %room.id, stays, "Room deleted");
    Ok(Json(DELETED))
}

async fn list_stays(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Vec<Stay>>> {
    let room = owned_room(&state, &principal, Resource::Stays, "read", &id).await?;
    Ok(Json(state.repos.stays.list_by_parent(&room.id).await?))
}

async fn check_in(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
    Body(draft): Body<StayDraft>,
) -> ApiResult<(StatusCode, Json<Stay>)> {
    let room = owned_room(&state, &principal, Resource::Stays, "create", &id).await?;
    let stay = state
        .repos
        .stays
        .check_in(&room.id, draft, state.exclusive_open)
        .await?;

    state
        .notifier
        .stay_event(StayEventKind::CheckIn, &room.hotel_id, &room.id, &stay.id);
    Ok((StatusCode::CREATED, Json(stay)))
}

/// The open stay, or `null`.
async fn current_stay(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Option<Stay>>> {
    let room = owned_room(&state, &principal, Resource::Stays, "read", &id).await?;
    Ok(Json(state.repos.stays.current_for_room(&room.id).await?))
}
