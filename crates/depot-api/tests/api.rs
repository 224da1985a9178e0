//! Router-level tests over the in-process adapters.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::DateTime;
use serde_json::{json, Value};
use tower::ServiceExt;

use depot_api::{build_router, Adapters, AppState};
use depot_core::domain::{Role, User};
use depot_core::repositories::UserRepository;
use depot_infrastructure::{
    MemoryBackupStore, MemoryLocationRepository, MemoryProductRepository, MemoryUserRepository,
    NoopSchemaManager, StaticHealthProbe,
};
use depot_security::{JwtService, PasswordService};
use depot_shared::config::{
    AppConfig, AppSettings, BootstrapSettings, DatabaseSettings, JwtSettings, StorageSettings,
};

const SECRET: &str = "integration-test-secret";
const PASSWORD: &str = "secret123";

struct TestApp {
    router: Router,
    state: AppState,
    users: Arc<MemoryUserRepository>,
    probe: Arc<StaticHealthProbe>,
    backups: Arc<MemoryBackupStore>,
}

fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            name: "depot-server".to_string(),
            cors_origins: vec![],
        },
        database: DatabaseSettings {
            url: "postgres://localhost/depot_test".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_seconds: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: SECRET.to_string(),
            token_expiry_hours: 1,
        },
        storage: StorageSettings {
            uploads_dir: "uploads".to_string(),
            backup_dir: "backups".to_string(),
        },
        bootstrap: BootstrapSettings::default(),
    }
}

async fn spawn_app() -> TestApp {
    let users = Arc::new(MemoryUserRepository::new());
    let probe = Arc::new(StaticHealthProbe::new(true));
    let backups = Arc::new(MemoryBackupStore::new());

    let state = AppState::new(
        test_config(),
        Adapters {
            users: users.clone(),
            locations: Arc::new(MemoryLocationRepository::new()),
            products: Arc::new(MemoryProductRepository::new()),
            schema: Arc::new(NoopSchemaManager),
            backups: backups.clone(),
            probe: probe.clone(),
        },
    );
    state.datastore.refresh().await;

    TestApp {
        router: build_router(state.clone()),
        state,
        users,
        probe,
        backups,
    }
}

impl TestApp {
    async fn seed_user(&self, name: &str, email: &str, role: Role) -> (User, String) {
        let hash = PasswordService::hash(PASSWORD).unwrap();
        let user = User::new(name, email, hash, role).unwrap();
        let user = self.users.create(&user).await.unwrap();
        let token = JwtService::from_hours(SECRET, 1)
            .generate_token(&user.id, &user.email, &user.name)
            .unwrap();
        (user, token)
    }

    async fn go_offline(&self) {
        self.probe.set_available(false);
        self.state.datastore.refresh().await;
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn timestamp(value: &Value) -> DateTime<chrono::FixedOffset> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_borrow_return_lifecycle() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;

    let (status, created) = app
        .send(Method::POST, "/api/products", Some(&token), Some(json!({"name": "Dell Latitude"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["status"], "in_stock");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, borrowed) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", id),
            Some(&token),
            Some(json!({"borrowedBy": "Alice"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed["data"]["status"], "borrowed");
    assert_eq!(borrowed["data"]["borrowedBy"], "Alice");
    let borrowed_at = timestamp(&borrowed["data"]["borrowedDate"]);

    let (status, again) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", id),
            Some(&token),
            Some(json!({"borrowedBy": "Bob"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["success"], false);
    assert!(again["message"].as_str().unwrap().contains("already borrowed"));

    let (status, returned) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/return", id),
            Some(&token),
            Some(json!({"location": "Shelf B"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["data"]["status"], "in_stock");
    assert!(returned["data"]["borrowedBy"].is_null());
    assert!(returned["data"]["borrowedDate"].is_null());
    assert_eq!(returned["data"]["location"], "Shelf B");
    assert!(timestamp(&returned["data"]["returnDate"]) >= borrowed_at);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/return", id),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_borrow_requires_active_linked_user() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;

    let (_, created) = app
        .send(Method::POST, "/api/products", Some(&token), Some(json!({"name": "Projector"})))
        .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", id),
            Some(&token),
            Some(json!({"borrowedBy": "Ghost", "borrowedByUserId": uuid_string()})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, product) = app
        .send(Method::GET, &format!("/api/products/{}", id), Some(&token), None)
        .await;
    assert_eq!(product["data"]["status"], "in_stock");
}

#[tokio::test]
async fn test_borrow_with_unknown_user_reports_product_state_first() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;
    let ghost = json!({"borrowedBy": "Bob", "borrowedByUserId": uuid_string()});

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", uuid_string()),
            Some(&token),
            Some(ghost.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = app
        .send(Method::POST, "/api/products", Some(&token), Some(json!({"name": "Camera"})))
        .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", id),
            Some(&token),
            Some(json!({"borrowedBy": "Alice"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/products/{}/borrow", id),
            Some(&token),
            Some(ghost),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already borrowed"));
}

#[tokio::test]
async fn test_barcode_lookup_skips_deleted_products() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({"name": "Barcode Scanner", "barcode": "BS-100"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, found) = app
        .send(Method::GET, "/api/products/barcode/BS-100", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["data"]["id"], id.as_str());

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/products/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::GET, "/api/products/barcode/BS-100", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, reused) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({"name": "Barcode Scanner v2", "barcode": "BS-100"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(reused["data"]["id"], id.as_str());
}

fn uuid_string() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[tokio::test]
async fn test_search_folds_diacritics() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;

    for name in ["Çanta", "Laptop Bag", "Monitor"] {
        app.send(Method::POST, "/api/products", Some(&token), Some(json!({"name": name})))
            .await;
    }

    let (status, found) = app
        .send(Method::GET, "/api/products?search=canta", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = found["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Çanta"]);
    assert_eq!(found["pagination"]["totalItems"], 1);
    assert_eq!(found["pagination"]["currentPage"], 1);
}

#[tokio::test]
async fn test_list_rejects_unknown_sort_field() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;

    let (status, body) = app
        .send(Method::GET, "/api/products?sortBy=password", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(Method::GET, "/api/products", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_is_forbidden_from_admin_routes() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Regular User", "user@example.com", Role::User).await;

    for (method, uri, body) in [
        (Method::GET, "/api/admin/users", None),
        (Method::GET, "/api/admin/stats", None),
        (Method::POST, "/api/admin/backup", None),
        (
            Method::POST,
            "/api/admin/users",
            Some(json!({"name": "Mallory", "email": "mallory@example.com", "password": "secret123", "role": "admin"})),
        ),
        (Method::POST, "/api/locations", Some(json!({"name": "Shelf A"}))),
    ] {
        let (status, _) = app.send(method, uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }

    assert!(app.users.find_by_email("mallory@example.com").await.unwrap().is_none());
    assert!(app.backups.snapshots().await.is_empty());
    let (_, locations) = app.send(Method::GET, "/api/locations", Some(&token), None).await;
    assert_eq!(locations["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_non_admin_sync_db_leaves_availability_untouched() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Regular User", "user@example.com", Role::User).await;

    app.probe.set_available(false);
    let (status, _) = app.send(Method::POST, "/api/admin/sync-db", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.state.datastore.is_available());
}

#[tokio::test]
async fn test_admin_manages_users_but_not_itself() {
    let app = spawn_app().await;
    let (admin, token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/admin/users",
            Some(&token),
            Some(json!({"name": "New Hire", "email": "hire@example.com", "password": "secret123"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["role"], "user");
    assert!(created["data"].get("passwordHash").is_none());

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/admin/users/{}", admin.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/users/{}/toggle-status", admin.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stats) = app.send(Method::GET, "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["users"]["total"], 2);
    assert_eq!(stats["data"]["users"]["admins"], 1);
    assert_eq!(stats["data"]["products"]["total"], 0);
}

#[tokio::test]
async fn test_admin_backup_writes_snapshot() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;

    let (status, body) = app.send(Method::POST, "/api/admin/backup", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(app.backups.snapshots().await.len(), 1);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;

    let (status, registered) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ayşe",
                "email": "Ayse@Example.com",
                "password": "secret123",
                "confirmPassword": "secret123"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(registered["token"].as_str().is_some());
    assert_eq!(registered["user"]["email"], "ayse@example.com");
    assert_eq!(registered["user"]["role"], "user");

    let (status, logged_in) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ayse@example.com", "password": "secret123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = logged_in["token"].as_str().unwrap().to_string();

    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["user"]["name"], "Ayşe");
    assert!(me.get("warning").is_none());

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ayse@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_active_users_lists_borrower_candidates() {
    let app = spawn_app().await;
    let (_, admin_token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;
    let (member, member_token) = app.seed_user("Member", "member@example.com", Role::User).await;
    let (away, _) = app.seed_user("Away", "away@example.com", Role::User).await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/users/{}/toggle-status", away.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/api/auth/users", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u["id"] == member.id.to_string()));
    assert!(users.iter().all(|u| u["email"] != "away@example.com"));
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let (status, body) = app.send(Method::POST, "/api/auth/logout", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let app = spawn_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Bob",
                "email": "bob@example.com",
                "password": "secret123",
                "confirmPassword": "secret124"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_degraded_mode_when_datastore_down() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Warehouse Clerk", "clerk@example.com", Role::User).await;
    app.go_offline().await;

    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["user"]["email"], "clerk@example.com");
    assert!(me["warning"].is_string());

    let (status, home) = app.send(Method::GET, "/api/home", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["data"]["stats"]["totalProducts"], 0);
    assert_eq!(home["data"]["welcomeMessage"], "Welcome, Warehouse Clerk!");
    assert!(home["warning"].is_string());

    let (status, body) = app.send(Method::GET, "/api/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "DATABASE_CONNECTION_FAILED");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "clerk@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, ready) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ready["database"], "disconnected");
}

#[tokio::test]
async fn test_sync_db_restores_availability() {
    let app = spawn_app().await;
    let (_, token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;
    app.go_offline().await;

    let (status, _) = app.send(Method::POST, "/api/admin/sync-db", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.probe.set_available(true);
    let (status, body) = app.send(Method::POST, "/api/admin/sync-db", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["databaseStatus"], "connected");
    assert!(app.state.datastore.is_available());
}

#[tokio::test]
async fn test_public_product_stats_and_health() {
    let app = spawn_app().await;

    let (status, stats) = app.send(Method::GET, "/api/products/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["totalCount"], 0);

    let (status, health) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "connected");

    let (status, _) = app.send(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
