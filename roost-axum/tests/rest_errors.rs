use std::sync::Arc;

use axum::body::Body as HttpBody;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::routing::{get, post};
use axum::{Json, Router};
use roost_auth::{AuthError, GuestTokens, TokenVerifier};
use roost_axum::{
    Authenticated, AxumApp, Body, Guest, HasGuestTokens, HasVerifier, RoostAxumError, ValidId,
};
use roost_core::{Principal, Role, RoostError};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

struct StaticVerifier;

#[async_trait::async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        match token {
            "good" => Ok(Principal::new("u-1", Role::new("admin"), None)?),
            _ => Err(AuthError::InvalidToken("unknown token".into())),
        }
    }
}

#[derive(Clone)]
struct TestState {
    verifier: Arc<dyn TokenVerifier>,
    guest: GuestTokens,
}

impl HasVerifier for TestState {
    fn verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.verifier
    }
}

impl HasGuestTokens for TestState {
    fn guest_tokens(&self) -> &GuestTokens {
        &self.guest
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoomInput {
    number: String,
    floor: i64,
}

fn app() -> AxumApp {
    let state = TestState {
        verifier: Arc::new(StaticVerifier),
        guest: GuestTokens::new("guest-secret"),
    };

    let router = Router::new()
        .route(
            "/rooms",
            post(|_: State<TestState>, Body(input): Body<RoomInput>| async move {
                Json(json!({"number": input.number, "floor": input.floor}))
            }),
        )
        .route(
            "/rooms/{id}",
            get(|ValidId(id): ValidId| async move { Json(json!({"id": id})) }),
        )
        .route(
            "/me",
            get(|Authenticated(p): Authenticated| async move { Json(json!({"id": p.id})) }),
        )
        .route(
            "/guest",
            get(|Guest(claims): Guest| async move { Json(json!({"stayId": claims.stay_id})) }),
        )
        .route(
            "/conflict",
            get(|| async { Err::<Json<Value>, _>(RoostAxumError::from(RoostError::conflict("Room is occupied"))) }),
        )
        .route(
            "/boom",
            get(|| async { Err::<Json<Value>, _>(RoostAxumError::from(anyhow::anyhow!("boom"))) }),
        )
        .with_state(state);

    AxumApp::new(router)
        .service("/health", || async { "ok" })
        .with_standard_layers()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<HttpBody> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(HttpBody::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str, auth: Option<&str>) -> Request<HttpBody> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(HttpBody::empty()).unwrap()
}

#[tokio::test]
async fn malformed_json_is_a_validation_error_with_request_id() {
    let res = app()
        .router
        .oneshot(post_json("/rooms", "{\"number\":\"101\""))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "ValidationError");
    assert_eq!(body["error"], 200);
    assert_eq!(body["className"], "validation-error");
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let provided = HeaderValue::from_static("req-test-123");
    let mut req = post_json("/rooms", "{\"number\":\"101\",\"floor\":1}");
    req.headers_mut().insert("x-request-id", provided.clone());

    let res = app().router.oneshot(req).await.unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn body_errors_name_the_field() {
    let router = app().router;

    let res = router
        .clone()
        .oneshot(post_json("/rooms", "{\"floor\":1}"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(body["error"], 201);
    assert_eq!(body["data"], "/number");

    let res = router
        .clone()
        .oneshot(post_json("/rooms", "{\"number\":\"1\",\"floor\":1,\"view\":\"sea\"}"))
        .await
        .unwrap();
    let body = json_body(res).await;
    assert_eq!(body["error"], 202);
    assert_eq!(body["data"], "/view");

    let res = router
        .oneshot(post_json("/rooms", "{\"number\":\"1\",\"floor\":\"high\"}"))
        .await
        .unwrap();
    let body = json_body(res).await;
    assert_eq!(body["error"], 200);
    assert_eq!(body["data"], "/floor");
}

#[tokio::test]
async fn path_ids_must_be_uuids() {
    let router = app().router;

    let res = router
        .clone()
        .oneshot(get_req("/rooms/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(body["error"], 200);
    assert_eq!(body["data"], "/id");

    let id = "0190a5b4-8c1e-7d2a-9f00-3b6a1c2d4e5f";
    let res = router
        .oneshot(get_req(&format!("/rooms/{id}"), None))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await["id"], id);
}

#[tokio::test]
async fn callers_must_present_a_valid_token() {
    let router = app().router;

    let res = router.clone().oneshot(get_req("/me", None)).await.unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert_eq!(json_body(res).await["error"], 401);

    let res = router
        .clone()
        .oneshot(get_req("/me", Some("Bearer bad")))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);

    let res = router
        .oneshot(get_req("/me", Some("Bearer good")))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await["id"], "u-1");
}

#[tokio::test]
async fn guest_tokens_bind_a_stay() {
    let router = app().router;
    let token = GuestTokens::new("guest-secret").sign("S1").unwrap();

    let res = router
        .clone()
        .oneshot(get_req("/guest", Some(&format!("Bearer {token}"))))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(json_body(res).await["stayId"], "S1");

    let res = router.oneshot(get_req("/guest", None)).await.unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(json_body(res).await["error"], 201);
}

#[tokio::test]
async fn structured_errors_keep_their_shape() {
    let res = app()
        .router
        .oneshot(get_req("/conflict", None))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 409);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Conflict");
    assert_eq!(body["message"], "Room is occupied");
    assert_eq!(body["code"], 409);
    assert_eq!(body["error"], 409);
}

#[tokio::test]
async fn other_errors_become_server_errors() {
    let res = app().router.oneshot(get_req("/boom", None)).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "ServerError");
    assert_eq!(body["error"], 1);
}

#[tokio::test]
async fn health_answers_ok() {
    let res = app().router.oneshot(get_req("/health", None)).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}
