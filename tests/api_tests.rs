use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mkulima::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Admin account seeded by migration (must match m20260801_initial.rs)
const ADMIN_EMAIL: &str = "admin@coop.com";
const ADMIN_PASSWORD: &str = "admin123";

const TEST_SECRET: &str = "integration-test-secret";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.auth.token_secret = TEST_SECRET.to_string();
    config.observability.metrics_enabled = false;

    let state = mkulima::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    mkulima::api::router(state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = if let Some(body) = body {
        builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "display_name": name,
            "email": email,
            "password": password,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"].clone()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = request(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    for uri in [
        "/api/users/profile",
        "/api/mycrops",
        "/api/farmers",
        "/api/system/status",
    ] {
        let (status, body) = request(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "no token: {uri}");
        assert_eq!(body["success"], false);
    }

    let (status, _) = request(&app, "GET", "/api/mycrops", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_roundtrip() {
    let app = spawn_app().await;

    let identity = register(&app, "Mercy", "mercy@x.com", "pw123").await;
    assert_eq!(identity["email"], "mercy@x.com");
    assert_eq!(identity["role"], "farmer");
    assert!(identity["password_hash"].is_null());

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "mercy@x.com", "password": "pw123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["identity"]["role"], "farmer");
}

#[tokio::test]
async fn test_seeded_admin_can_login() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identity"]["role"], "admin");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "display_name": "Imposter",
            "email": "mercy@x.com",
            "password": "other",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_failures() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "mercy@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["data"]["token"].is_null());
}

#[tokio::test]
async fn test_profile_get_and_update() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let token = login(&app, "mercy@x.com", "pw123").await;

    let (status, body) = request(&app, "GET", "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["display_name"], "Mercy");
    assert_eq!(body["data"]["farm_size"], 0.0);

    let (status, body) = request(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&token),
        Some(json!({ "display_name": "Mercy W.", "farm_size": 3.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["display_name"], "Mercy W.");
    assert_eq!(body["data"]["farm_size"], 3.5);

    // Unspecified fields are untouched
    let (_, body) = request(&app, "GET", "/api/users/profile", Some(&token), None).await;
    assert_eq!(body["data"]["email"], "mercy@x.com");
    assert_eq!(body["data"]["display_name"], "Mercy W.");
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "old-password").await;
    let token = login(&app, "mercy@x.com", "old-password").await;

    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/password",
        Some(&token),
        Some(json!({ "current_password": "wrong", "new_password": "brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/password",
        Some(&token),
        Some(json!({ "current_password": "old-password", "new_password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/password",
        Some(&token),
        Some(json!({ "current_password": "old-password", "new_password": "brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works; the new one does
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "mercy@x.com", "password": "old-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    login(&app, "mercy@x.com", "brand-new-password").await;
}

#[tokio::test]
async fn test_crop_create_defaults_and_ownership() {
    let app = spawn_app().await;

    let mercy = register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let mercy_token = login(&app, "mercy@x.com", "pw123").await;
    register(&app, "John", "john@x.com", "pw456").await;
    let john_token = login(&app, "john@x.com", "pw456").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&mercy_token),
        Some(json!({
            "crop_type": "Maize",
            "area": 2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "planted");
    assert_eq!(body["data"]["health_score"], 100);
    assert_eq!(body["data"]["owner_id"], mercy["id"]);

    let crop_id = body["data"]["id"].as_i64().unwrap();
    let crop_uri = format!("/api/mycrops/{crop_id}");

    // John cannot observe or mutate Mercy's crop
    let (status, body) = request(&app, "GET", &crop_uri, Some(&john_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["data"].is_null());

    let (status, _) = request(
        &app,
        "PUT",
        &crop_uri,
        Some(&john_token),
        Some(json!({ "status": "harvested" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(&app, "DELETE", &crop_uri, Some(&john_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Mercy still sees it untouched
    let (status, body) = request(&app, "GET", &crop_uri, Some(&mercy_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "planted");
}

#[tokio::test]
async fn test_crop_list_scoping() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let mercy_token = login(&app, "mercy@x.com", "pw123").await;
    register(&app, "John", "john@x.com", "pw456").await;
    let john_token = login(&app, "john@x.com", "pw456").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for (token, crop_type) in [
        (&mercy_token, "Maize"),
        (&mercy_token, "Beans"),
        (&john_token, "Wheat"),
    ] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/mycrops",
            Some(token),
            Some(json!({
                "crop_type": crop_type,
                "area": 1,
                "planting_date": "2024-02-01",
                "expected_harvest": "2024-07-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = request(&app, "GET", "/api/mycrops", Some(&mercy_token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = request(&app, "GET", "/api/mycrops", Some(&john_token), None).await;
    let john_crops = body["data"].as_array().unwrap();
    assert_eq!(john_crops.len(), 1);
    assert_eq!(john_crops[0]["crop_type"], "Wheat");

    // Admin sees the full set
    let (_, body) = request(&app, "GET", "/api/mycrops", Some(&admin_token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_crop_update_merges_fields() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let token = login(&app, "mercy@x.com", "pw123").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "variety": "Hybrid",
            "area": 2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
            "notes": "Healthy crop",
        })),
    )
    .await;
    let crop_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/mycrops/{crop_id}"),
        Some(&token),
        Some(json!({ "status": "growing", "health_score": 85 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "growing");
    assert_eq!(body["data"]["health_score"], 85);
    // Untouched fields survive the merge
    assert_eq!(body["data"]["variety"], "Hybrid");
    assert_eq!(body["data"]["notes"], "Healthy crop");

    // No monotonicity: any status can be written
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/mycrops/{crop_id}"),
        Some(&token),
        Some(json!({ "status": "planted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "planted");
}

#[tokio::test]
async fn test_crop_validation() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let token = login(&app, "mercy@x.com", "pw123").await;

    // Negative area
    let (status, _) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "area": -2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unparseable date
    let (status, _) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "area": 2,
            "planting_date": "next tuesday",
            "expected_harvest": "2024-06-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing required field
    let (status, _) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({ "area": 2 })),
    )
    .await;
    assert!(status.is_client_error());

    // Unknown fields are rejected, not silently dropped
    let (status, _) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "area": 2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
            "farmer_name": "Mercy",
        })),
    )
    .await;
    assert!(status.is_client_error());

    // Out-of-range health score on update
    let (_, body) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "area": 2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
        })),
    )
    .await;
    let crop_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/mycrops/{crop_id}"),
        Some(&token),
        Some(json!({ "health_score": 250 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_crop_delete_idempotence() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let token = login(&app, "mercy@x.com", "pw123").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&token),
        Some(json!({
            "crop_type": "Maize",
            "area": 2,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
        })),
    )
    .await;
    let crop_id = body["data"]["id"].as_i64().unwrap();
    let crop_uri = format!("/api/mycrops/{crop_id}");

    let (status, _) = request(&app, "DELETE", &crop_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&app, "DELETE", &crop_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_can_create_crop_for_farmer() {
    let app = spawn_app().await;

    let mercy = register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let mercy_token = login(&app, "mercy@x.com", "pw123").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Non-admin callers cannot choose an owner
    let (status, _) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&mercy_token),
        Some(json!({
            "crop_type": "Maize",
            "area": 1,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
            "owner_id": 999,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "POST",
        "/api/mycrops",
        Some(&admin_token),
        Some(json!({
            "crop_type": "Sorghum",
            "area": 1,
            "planting_date": "2024-01-01",
            "expected_harvest": "2024-06-01",
            "owner_id": mercy["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["owner_id"], mercy["id"]);

    // The crop shows up in Mercy's list
    let (_, body) = request(&app, "GET", "/api/mycrops", Some(&mercy_token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_farmers_roster_role_gate() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let farmer_token = login(&app, "mercy@x.com", "pw123").await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let new_farmer = json!({
        "name": "Grace",
        "email": "grace@coop.com",
        "location": "Nairobi",
        "farm_size": 2.5,
    });

    // Farmers cannot mutate the roster
    let (status, _) = request(
        &app,
        "POST",
        "/api/farmers",
        Some(&farmer_token),
        Some(new_farmer.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "POST",
        "/api/farmers",
        Some(&admin_token),
        Some(new_farmer.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let farmer_id = body["data"]["id"].as_i64().unwrap();

    // Duplicate roster email
    let (status, _) = request(
        &app,
        "POST",
        "/api/farmers",
        Some(&admin_token),
        Some(new_farmer),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Roster is readable by any authenticated caller
    let (status, body) = request(&app, "GET", "/api/farmers", Some(&farmer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/farmers/{farmer_id}"),
        Some(&farmer_token),
        Some(json!({ "location": "Kiambu" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/farmers/{farmer_id}"),
        Some(&admin_token),
        Some(json!({ "location": "Kiambu" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], "Kiambu");
    assert_eq!(body["data"]["name"], "Grace");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/farmers/{farmer_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/farmers/{farmer_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_and_forged_tokens_rejected() {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use mkulima::entities::users::Role;
    use mkulima::services::token::Claims;

    let app = spawn_app().await;

    let now = chrono::Utc::now().timestamp();

    // Correctly signed but expired
    let expired = encode(
        &Header::default(),
        &Claims {
            sub: 1,
            role: Role::Admin,
            iat: now - 7200,
            exp: now - 3600,
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = request(&app, "GET", "/api/mycrops", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unexpired but signed with the wrong secret
    let forged = encode(
        &Header::default(),
        &Claims {
            sub: 1,
            role: Role::Admin,
            iat: now,
            exp: now + 3600,
        },
        &EncodingKey::from_secret(b"attacker-secret"),
    )
    .unwrap();

    let (status, forged_body) = request(&app, "GET", "/api/mycrops", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Failure causes are indistinguishable to the caller
    assert_eq!(body["message"], forged_body["message"]);
}

#[tokio::test]
async fn test_system_status_and_unknown_route() {
    let app = spawn_app().await;

    register(&app, "Mercy", "mercy@x.com", "pw123").await;
    let token = login(&app, "mercy@x.com", "pw123").await;

    let (status, body) = request(&app, "GET", "/api/system/status", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database_ok"], true);
    // Seeded admin plus Mercy
    assert_eq!(body["data"]["identities"], 2);

    let (status, body) = request(&app, "GET", "/api/no/such/route", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}
