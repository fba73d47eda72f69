//! API surface tests driving the axum router directly

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use kinship::http::router;
use kinship::space::SpaceManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(SpaceManager::new()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": email, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_space(app: &Router, user: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/spaces",
        Some(user),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_person(app: &Router, user: &str, space: &str, first: &str) -> u64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/spaces/{space}/people"),
        Some(user),
        Some(json!({ "first_name": first, "last_name": "Api" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn status_reports_counts() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["spaces"], 0);
}

#[tokio::test]
async fn space_crud_round_trip() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;

    let person = create_person(&app, &owner, &space, "Ahmad").await;

    // Rename via PATCH
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/spaces/{space}/people/{person}"),
        Some(&owner),
        Some(json!({ "nickname": "Abu Wael" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "Abu Wael");

    // Listing reflects membership and counts
    let (status, body) = send(&app, "GET", "/api/spaces", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["role"], "OWNER");
    assert_eq!(body[0]["person_count"], 1);

    // Public overview works without identity
    let (status, body) = send(&app, "GET", &format!("/api/spaces/{space}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["person_count"], 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/spaces/{space}/people/{person}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn relationships_and_tree() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;

    let parent = create_person(&app, &owner, &space, "Parent").await;
    let child = create_person(&app, &owner, &space, "Child").await;

    let (status, rel) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/relationships"),
        Some(&owner),
        Some(json!({
            "type": "parent_child",
            "subtype": "biological",
            "from": parent,
            "to": child,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Duplicate edge is rejected
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/relationships"),
        Some(&owner),
        Some(json!({
            "type": "parent_child",
            "subtype": "step",
            "from": parent,
            "to": child,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, tree) = send(
        &app,
        "GET",
        &format!("/api/spaces/{space}/tree?focus={parent}&mode=descendants&generations=2"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["people"].as_array().unwrap().len(), 2);
    assert_eq!(tree["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(tree["edges"][0]["kind"], "parent_child");

    let rel_id = rel["id"].as_u64().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/spaces/{space}/relationships/{rel_id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn identity_and_permission_errors() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;

    // No identity header on a mutation
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/people"),
        None,
        Some(json!({ "first_name": "X", "last_name": "Y" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));

    // Unknown space
    let (status, _) = send(&app, "GET", "/api/spaces/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A registered user without membership may not add people
    let stranger = register(&app, "stranger@api.test", "S").await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/people"),
        Some(&stranger),
        Some(json!({ "first_name": "X", "last_name": "Y" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Duplicate registration conflicts
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "owner@api.test", "name": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invitation_flow_over_http() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;
    let guest = register(&app, "guest@api.test", "Guest").await;

    let (status, invite) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/invitations"),
        Some(&owner),
        Some(json!({ "role": "EDITOR" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = invite["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/invitations/{token}/accept"),
        Some(&guest),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["space_id"].as_str().unwrap(), space);

    // Second redemption fails
    let other = register(&app, "other@api.test", "Other").await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/invitations/{token}/accept"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The guest is now an editor
    let (status, members) = send(
        &app,
        "GET",
        &format!("/api/spaces/{space}/members"),
        Some(&guest),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let roles: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"EDITOR"));
}

#[tokio::test]
async fn claim_flow_over_http() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;
    let person = create_person(&app, &owner, &space, "Target").await;
    let claimer = register(&app, "me@api.test", "Me").await;

    let (status, claim) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/claims"),
        Some(&claimer),
        Some(json!({ "person_id": person })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(claim["status"], "PENDING");
    let claim_id = claim["id"].as_u64().unwrap();

    // Duplicate claim conflicts
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/claims"),
        Some(&claimer),
        Some(json!({ "person_id": person })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Review is owner-only
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/spaces/{space}/claims"),
        Some(&claimer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending) = send(
        &app,
        "GET",
        &format!("/api/spaces/{space}/claims"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/spaces/{space}/claims/{claim_id}/approve"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The linked claimer can now edit their person
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/spaces/{space}/people/{person}"),
        Some(&claimer),
        Some(json!({ "bio": "It's me" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_over_http() {
    let app = app();
    let owner = register(&app, "owner@api.test", "Owner").await;
    let space = create_space(&app, &owner, "Api Family").await;
    create_person(&app, &owner, &space, "Ahmad").await;
    create_person(&app, &owner, &space, "Sara").await;

    let (status, hits) = send(
        &app,
        "GET",
        &format!("/api/spaces/{space}/search?q=ahm"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["first_name"], "Ahmad");
}
