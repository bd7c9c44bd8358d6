use axum::routing::get;
use axum::{Json, Router};
use roost_axum::Authenticated;
use roost_core::Principal;
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alive))
        .route("/auth/check", get(whoami))
}

async fn alive() -> Json<Value> {
    Json(json!({ "message": "RestAPI is alive!" }))
}

async fn whoami(Authenticated(principal): Authenticated) -> Json<Principal> {
    Json(principal)
}
