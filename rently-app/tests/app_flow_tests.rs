//! End-to-end flows through the assembled application against a stub API

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use serde_json::{json, Value};
use tempfile::TempDir;

use rently_app::session::CookieJar;
use rently_app::{LoginForm, RentalForm, RentlyApp, Route, View};
use rently_core::{RentlyConfig, RentlyError, User};

struct StubApi {
    base_url: String,
    properties_hits: Arc<AtomicU64>,
    rentals_hits: Arc<AtomicU64>,
}

async fn spawn_stub(tenants_status: StatusCode) -> StubApi {
    let properties_hits = Arc::new(AtomicU64::new(0));
    let rentals_hits = Arc::new(AtomicU64::new(0));

    let p = properties_hits.clone();
    let r = rentals_hits.clone();

    let app = axum::Router::new()
        .route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "id": "u1",
                    "name": "Ana",
                    "email": body["email"],
                    "role": "user",
                    "token": "tok123",
                }))
            }),
        )
        .route("/auth/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/properties/owner",
            get(move || {
                let p = p.clone();
                async move {
                    p.fetch_add(1, Ordering::SeqCst);
                    Json(json!([
                        {"id": "p1", "name": "Casa Azul", "address": "Rua A, 1", "price": 1500.0, "rented": false}
                    ]))
                }
            }),
        )
        .route(
            "/rentals",
            get(move || {
                let r = r.clone();
                async move {
                    r.fetch_add(1, Ordering::SeqCst);
                    Json(json!([]))
                }
            })
            .post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "id": "r1",
                    "propertyId": body["propertyId"],
                    "startDate": body["startDate"],
                    "endDate": null,
                    "dueDay": body["dueDay"],
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z",
                }))
            }),
        )
        .route(
            "/users-owner",
            get(move || async move { tenants_status }),
        )
        .route(
            "/dashboard/my-stats",
            get(|| async {
                Json(json!({
                    "totalUsers": 2,
                    "totalProperties": 1,
                    "totalRentals": 1,
                    "activeRentals": 1,
                    "totalProperties_rented": 1,
                    "totalProperties_available": 0,
                    "totalPayments": 6,
                    "totalRevenue": 9000.0,
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubApi {
        base_url: format!("http://{}", addr),
        properties_hits,
        rentals_hits,
    }
}

fn app_against(stub: &StubApi, dir: &TempDir) -> RentlyApp {
    RentlyApp::builder(RentlyConfig::default())
        .with_base_url(stub.base_url.clone())
        .with_cookie_file(dir.path().join("cookies.json"))
        .build()
        .unwrap()
}

fn ana() -> User {
    User {
        id: "u1".to_string(),
        name: "Ana".to_string(),
        email: "a@b.com".to_string(),
        role: "user".to_string(),
    }
}

#[tokio::test]
async fn test_login_flow_returns_to_requested_screen() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();

    // Unauthenticated navigation bounces to login, remembering the target
    assert_eq!(app.router().navigate(Route::Properties), View::Screen(Route::Login));

    let next = app
        .auth()
        .login(LoginForm {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

    // Login returns the preserved location
    assert_eq!(next, Route::Properties);
    assert!(app.session().is_authenticated());
    assert_eq!(app.session().user().map(|u| u.name), Some("Ana".to_string()));

    // Persisted cookies carry the issued token
    let jar = CookieJar::open(dir.path().join("cookies.json"));
    assert_eq!(jar.get("token"), Some("tok123".to_string()));
    assert_eq!(jar.get("userName"), Some("Ana".to_string()));

    assert_eq!(
        app.router().navigate(Route::Properties),
        View::Screen(Route::Properties)
    );
}

#[tokio::test]
async fn test_login_form_validation_stays_local() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();

    let result = app
        .auth()
        .login(LoginForm {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        })
        .await;

    assert!(matches!(result, Err(RentlyError::Validation { .. })));
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn test_property_list_is_cached_within_freshness_window() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    let first = app.properties().list().await.unwrap();
    let second = app.properties().list().await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    // Two reads inside the two-minute window, one network call
    assert_eq!(stub.properties_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_creating_rental_invalidates_rentals_and_properties() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    // Warm both caches
    app.rentals().list().await.unwrap();
    app.properties().list().await.unwrap();
    assert_eq!(stub.rentals_hits.load(Ordering::SeqCst), 1);
    assert_eq!(stub.properties_hits.load(Ordering::SeqCst), 1);

    let rental = app
        .rentals()
        .create(RentalForm {
            property_id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            start_date: "2024-01-01".to_string(),
            due_day: 5,
        })
        .await
        .unwrap();
    assert_eq!(rental.id, "r1");
    assert_eq!(rental.property_id, "p1");

    // Both lists are stale now: the next reads serve old data and refetch
    app.rentals().list().await.unwrap();
    app.properties().list().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(stub.rentals_hits.load(Ordering::SeqCst), 2);
    assert_eq!(stub.properties_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rentals_by_property_requires_an_id() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    let state = app.rentals().by_property("").await.unwrap();
    assert!(state.is_not_ready());
}

#[tokio::test]
async fn test_dashboard_stats_decode_through_cache() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    let stats = app.dashboard().stats().await.unwrap();
    assert_eq!(stats.total_properties, 1);
    assert_eq!(stats.active_rentals, 1);
    assert!((stats.total_revenue - 9000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_forbidden_fetch_tears_down_session_and_redirects() {
    let stub = spawn_stub(StatusCode::FORBIDDEN).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    assert_eq!(
        app.router().navigate(Route::Tenants),
        View::Screen(Route::Tenants)
    );

    // A single 403 clears the whole session
    let result = app.tenants().list().await;
    assert!(matches!(result, Err(RentlyError::Unauthorized { .. })));
    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().token(), None);

    // Nothing restorable is left behind
    let jar = CookieJar::open(dir.path().join("cookies.json"));
    assert_eq!(jar.get("token"), None);

    // The next render lands on the login screen
    assert_eq!(app.router().render(), View::Screen(Route::Login));
}

#[tokio::test]
async fn test_logout_is_best_effort_and_local_teardown_always_runs() {
    let stub = spawn_stub(StatusCode::OK).await;
    let dir = TempDir::new().unwrap();
    let app = app_against(&stub, &dir);
    app.initialize();
    app.session().login(ana(), "tok123".to_string());

    let next = app.auth().logout().await;
    assert_eq!(next, Route::Login);
    assert!(!app.session().is_authenticated());

    let restored = app_against(&stub, &dir);
    restored.initialize();
    assert!(!restored.session().is_authenticated());
}
