use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use roost_axum::{Authenticated, Body, ValidId};
use roost_core::Principal;
use roost_queue::StayEventKind;
use roost_rbac::{check_scope, Resource};
use roost_store::{Entity, RepoError, Room, Stay, StayDraft, StayPatch};
use serde_json::{Map, Value};

use super::{take_parent, ApiResult, DELETED};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(find).patch(update).delete(remove))
}

/// Fetch a stay and its room. Ownership is the room's hotel, so both
/// reads happen before the scope check.
async fn owned_stay(
    state: &AppState,
    principal: &Principal,
    action: &str,
    id: &str,
) -> ApiResult<(Room, Stay)> {
    let grant = state.rbac.authorize(principal, Resource::Stays, action)?;
    let stay = state.repos.stays.get_own(id).await?;
    let room = state.repos.rooms.get_own(&stay.room_id).await?;
    check_scope(&grant, principal, &room.hotel_id)?;
    Ok((room, stay))
}

async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<Stay>>> {
    state.rbac.authorize(&principal, Resource::Stays, "read:any")?;
    Ok(Json(state.repos.stays.list_all().await?))
}

async fn find(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<Stay>> {
    let (_, stay) = owned_stay(&state, &principal, "read", &id).await?;
    Ok(Json(stay))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Body(body): Body<Map<String, Value>>,
) -> ApiResult<(StatusCode, Json<Stay>)> {
    let grant = state.rbac.authorize(&principal, Resource::Stays, "create")?;
    let (room_id, draft): (String, StayDraft) = take_parent(body, "roomId")?;
    let room = state.repos.rooms.get_own(&room_id).await?;
    check_scope(&grant, &principal, &room.hotel_id)?;

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

async fn update(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
    Body(patch): Body<StayPatch>,
) -> ApiResult<Json<Stay>> {
    let (room, stay) = owned_stay(&state, &principal, "update", &id).await?;
    let key = stay.key().map_err(RepoError::from)?;
    let updated = state.repos.stays.update_key(&key, stay, patch).await?;

    if updated.checked_out() {
        state.notifier.stay_event(
            StayEventKind::CheckOut,
            &room.hotel_id,
            &room.id,
            &updated.current.id,
        );
    }
    Ok(Json(updated.current))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidId(id): ValidId,
) -> ApiResult<Json<&'static str>> {
    let (_, stay) = owned_stay(&state, &principal, "delete", &id).await?;
    let key = stay.key().map_err(RepoError::from)?;
    state.repos.stays.delete_key(&key).await?;
    Ok(Json(DELETED))
}
