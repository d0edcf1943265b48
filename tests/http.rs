mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use common::{Fixture, JWT_SECRET};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use store_ratings::{
    app,
    config::Config,
    models::{Identity, Role, user::Claims},
};
use tower::ServiceExt;

fn router(fx: &Fixture) -> Router {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .unwrap();
    app(fx.state.clone(), &config)
}

fn bearer(identity: &Identity) -> String {
    let claims = Claims {
        sub: identity.id.to_string(),
        role: identity.role,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

async fn send(
    router: Router,
    method: &str,
    uri: &str,
    identity: Option<&Identity>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(identity) = identity {
        request = request.header(header::AUTHORIZATION, bearer(identity));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_needs_no_token() {
    let fx = Fixture::new();
    let (status, body) = send(router(&fx), "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let fx = Fixture::new();
    let (status, body) = send(router(&fx), "GET", "/stores", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthorized() {
    let fx = Fixture::new();
    let ghost = Identity::new(77, Role::Admin);

    let (status, body) = send(router(&fx), "GET", "/dashboard/admin", Some(&ghost), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn submit_returns_created_then_ok() {
    let fx = Fixture::new();
    let store = fx.store("Status Code Store", None).await;
    let rater = fx.users(1).await[0];
    let payload = json!({ "storeId": store.id, "rating": 4 });

    let (status, body) = send(
        router(&fx),
        "POST",
        "/ratings",
        Some(&rater),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], 4);

    let (status, body) = send(
        router(&fx),
        "POST",
        "/ratings",
        Some(&rater),
        Some(json!({ "storeId": store.id, "rating": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 2);
}

#[tokio::test]
async fn error_kinds_map_to_status_codes() {
    let fx = Fixture::new();
    let store = fx.store("Error Mapping Store", None).await;
    let rater = fx.users(1).await[0];
    let admin = fx.admin().await;

    let (status, body) = send(
        router(&fx),
        "POST",
        "/ratings",
        Some(&rater),
        Some(json!({ "storeId": store.id, "rating": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");

    let (status, body) = send(
        router(&fx),
        "POST",
        "/ratings",
        Some(&rater),
        Some(json!({ "storeId": 12345, "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, body) = send(router(&fx), "GET", "/dashboard/admin", Some(&rater), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, _) = send(router(&fx), "GET", "/dashboard/admin", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stats_endpoint_reports_average_as_text() {
    let fx = Fixture::new();
    let owner = fx.owner("Http Owner").await;
    let store = fx.store("Http Stats Store", Some(&owner)).await;
    fx.rate_with_new_users(&store, &[5, 5, 4, 3, 1]).await;

    let uri = format!("/ratings/store/{}/stats", store.id);
    let (status, body) = send(router(&fx), "GET", &uri, Some(&owner), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(body["average"], "3.60");
    assert_eq!(body["distribution"][0], json!({ "score": 5, "count": 2 }));
}

#[tokio::test]
async fn delete_by_stranger_is_forbidden() {
    let fx = Fixture::new();
    let store = fx.store("Guarded Rating Store", None).await;
    let raters = fx.rate_with_new_users(&store, &[4]).await;
    let stranger = fx.users(1).await[0];

    let uri = format!("/ratings/store/{}/mine", store.id);
    let (_, mine) = send(router(&fx), "GET", &uri, Some(&raters[0]), None).await;
    let rating_id = mine["id"].as_i64().unwrap();

    let uri = format!("/ratings/{rating_id}");
    let (status, _) = send(router(&fx), "DELETE", &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(router(&fx), "DELETE", &uri, Some(&raters[0]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn store_listing_accepts_query_parameters() {
    let fx = Fixture::new();
    let rater = fx.users(1).await[0];
    fx.store("Query Alpha Store", None).await;
    fx.store("Query Beta Store", None).await;

    let (status, body) = send(
        router(&fx),
        "GET",
        "/stores?name=query&sortBy=name&sortOrder=desc&page=1&limit=1",
        Some(&rater),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["name"], "Query Beta Store");
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);

    let (status, _) = send(router(&fx), "GET", "/stores?limit=500", Some(&rater), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_input_is_reported_as_invalid_argument() {
    let fx = Fixture::new();
    let store = fx.store("Malformed Input Store", None).await;
    let rater = fx.users(1).await[0];

    for rating in [json!(70000), json!(65541), json!(4.5), json!("four")] {
        let (status, body) = send(
            router(&fx),
            "POST",
            "/ratings",
            Some(&rater),
            Some(json!({ "storeId": store.id, "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_eq!(body["kind"], "invalid_argument", "rating {rating}");
        assert!(body["message"].is_string());
    }

    for uri in ["/stores?limit=abc", "/stores?sortBy=colour", "/stores/abc"] {
        let (status, body) = send(router(&fx), "GET", uri, Some(&rater), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["kind"], "invalid_argument", "{uri}");
    }

    let uri = format!("/ratings/store/{}/mine", store.id);
    let (_, mine) = send(router(&fx), "GET", &uri, Some(&rater), None).await;
    assert_eq!(mine, Value::Null);
}

#[tokio::test]
async fn user_directory_is_admin_only() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let owner = fx.owner("Directory Owner").await;
    let store = fx.store("Directory Owner Store", Some(&owner)).await;
    let raters = fx.rate_with_new_users(&store, &[4, 5]).await;

    let (status, body) = send(router(&fx), "GET", "/users?role=store_owner", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["name"], "Directory Owner");
    assert_eq!(body["items"][0]["averageRating"], "4.50");

    let uri = format!("/users/{}", raters[0].id);
    let (status, body) = send(router(&fx), "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    assert_eq!(body["averageRating"], Value::Null);

    let (status, body) = send(router(&fx), "GET", "/users", Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, body) = send(router(&fx), "GET", "/users/404404", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}
