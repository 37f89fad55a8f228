use std::net::SocketAddr;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, fuel, maintenance, reminders, settings, vehicles};

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(vehicles::router())
                .merge(maintenance::router())
                .merge(reminders::router())
                .merge(fuel::router())
                .merge(settings::router()),
        )
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Fleety API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "ok" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use http_body_util::BodyExt;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        state: AppState,
        router: Router,
    }

    impl TestApp {
        fn new() -> Self {
            let state = AppState::fake();
            let router = build_app(state.clone());
            Self { state, router }
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(t) = token {
                req = req.header("authorization", format!("Bearer {t}"));
            }
            let req = match body {
                Some(b) => req
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };

            let res = self.router.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        /// Signs up and returns (token, user id).
        async fn signup(&self, email: &str) -> (String, Uuid) {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/auth/signup",
                    None,
                    Some(json!({ "email": email, "password": "hunter22", "full_name": "Test Driver" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            let token = body["access_token"].as_str().unwrap().to_string();
            let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
            (token, id)
        }

        async fn create_vehicle(&self, token: &str) -> String {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/vehicles",
                    Some(token),
                    Some(json!({ "make": "Toyota", "model": "Corolla", "year": 2018, "current_mileage": 52000 })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["id"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn health_and_root() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "ok");

        let (status, body) = app.send("GET", "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("Fleety"));
    }

    #[tokio::test]
    async fn signup_returns_token_and_user() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({ "email": " New@Example.com ", "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].as_str().unwrap().len() > 20);
        assert_eq!(body["user"]["email"], "new@example.com");
        assert_eq!(body["user"]["full_name"], "");
        assert_eq!(body["user"]["is_active"], true);
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_fails() {
        let app = TestApp::new();
        app.signup("dup@example.com").await;
        let (status, body) = app
            .send(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({ "email": "DUP@example.com", "password": "another1" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Email already registered");
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let app = TestApp::new();
        let (status, _) = app
            .send(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({ "email": "not-an-email", "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({ "email": "short@example.com", "password": "123" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("at least 6"));
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let app = TestApp::new();
        let (_, user_id) = app.signup("login@example.com").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "login@example.com", "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id.to_string());
        let token = body["access_token"].as_str().unwrap().to_string();
        let (status, _) = app.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid email or password");

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "nobody@example.com", "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn inactive_account_cannot_login() {
        let app = TestApp::new();
        let (_, user_id) = app.signup("gone@example.com").await;
        let mut user = app.state.store.find_user_by_id(user_id).await.unwrap().unwrap();
        user.is_active = false;
        app.state.store.update_user(&user).await.unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "gone@example.com", "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn protected_routes_require_valid_token() {
        let app = TestApp::new();
        for uri in [
            "/api/auth/me",
            "/api/vehicles",
            "/api/maintenance/vehicle/abc",
            "/api/reminders/vehicle/abc",
        ] {
            let (status, body) = app.send("GET", uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["detail"], "Not authenticated");

            let (status, body) = app.send("GET", uri, Some("garbage"), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["detail"], "Invalid token");
        }

        let req = Request::builder()
            .uri("/api/vehicles")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let res = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Invalid token");
    }

    #[tokio::test]
    async fn token_older_than_a_day_is_rejected() {
        let app = TestApp::new();
        let (_, user_id) = app.signup("old@example.com").await;
        let keys = JwtKeys::from_ref(&app.state);

        let stale = keys
            .sign_at(user_id, OffsetDateTime::now_utc() - Duration::hours(25))
            .unwrap();
        let (status, _) = app.send("GET", "/api/vehicles", Some(&stale), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let fresh = keys
            .sign_at(user_id, OffsetDateTime::now_utc() - Duration::hours(23))
            .unwrap();
        let (status, _) = app.send("GET", "/api/vehicles", Some(&fresh), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn me_for_vanished_user_is_not_found() {
        let app = TestApp::new();
        let token = JwtKeys::from_ref(&app.state).sign(Uuid::new_v4()).unwrap();
        let (status, body) = app.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn vehicle_crud() {
        let app = TestApp::new();
        let (token, _) = app.signup("crud@example.com").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/vehicles",
                Some(&token),
                Some(json!({ "make": "Mazda", "model": "3", "year": 2020, "color": "Red" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_mileage"], 0);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, list) = app.send("GET", "/api/vehicles", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let uri = format!("/api/vehicles/{id}");
        let (status, body) = app
            .send("PUT", &uri, Some(&token), Some(json!({ "current_mileage": 12500 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_mileage"], 12500);
        assert_eq!(body["color"], "Red");
        assert_eq!(body["make"], "Mazda");

        let (status, body) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_mileage"], 12500);

        let (status, _) = app
            .send("PUT", &uri, Some(&token), Some(json!({ "make": "  " })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Vehicle not found");
        let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let app = TestApp::new();
        let (token, _) = app.signup("ids@example.com").await;
        for uri in [
            "/api/vehicles/not-an-id",
            "/api/maintenance/not-an-id",
            "/api/reminders/not-an-id",
            "/api/maintenance/vehicle/not-an-id",
        ] {
            let (status, _) = app.send("GET", uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_vehicle() {
        let app = TestApp::new();
        let (alice, _) = app.signup("alice@example.com").await;
        let (bob, _) = app.signup("bob@example.com").await;
        let vehicle_id = app.create_vehicle(&alice).await;

        let uri = format!("/api/vehicles/{vehicle_id}");
        let (status, _) = app.send("GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app
            .send("PUT", &uri, Some(&bob), Some(json!({ "make": "Stolen" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send("DELETE", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = app.send("GET", "/api/vehicles", Some(&bob), None).await;
        assert!(list.as_array().unwrap().is_empty());

        let maint = json!({ "date": "2024-01-01", "service_type": "Oil change", "mileage": 1000 });
        let (status, _) = app
            .send(
                "POST",
                &format!("/api/maintenance/vehicle/{vehicle_id}"),
                Some(&bob),
                Some(maint),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app
            .send(
                "GET",
                &format!("/api/reminders/vehicle/{vehicle_id}"),
                Some(&bob),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // still intact for the owner
        let (status, body) = app.send("GET", &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["make"], "Toyota");
    }

    #[tokio::test]
    async fn maintenance_records_flow() {
        let app = TestApp::new();
        let (token, _) = app.signup("maint@example.com").await;
        let (other, _) = app.signup("other@example.com").await;
        let vehicle_id = app.create_vehicle(&token).await;
        let base = format!("/api/maintenance/vehicle/{vehicle_id}");

        let (status, older) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "date": "2023-11-02", "service_type": "Brakes", "mileage": 48000, "cost": 320.5 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(older["date"], "2023-11-02T00:00:00Z");

        let (status, newer) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "date": "2024-04-20T10:00:00", "service_type": "Oil change", "mileage": 52000 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(newer["cost"], 0.0);
        assert_eq!(newer["vehicle_id"], vehicle_id);

        let (status, list) = app.send("GET", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["service_type"], "Oil change");
        assert_eq!(list[1]["service_type"], "Brakes");

        let (status, _) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "date": "someday", "service_type": "Wash", "mileage": 1 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/maintenance/{}", older["id"].as_str().unwrap());
        let (status, _) = app.send("GET", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send("PUT", &uri, Some(&token), Some(json!({ "notes": "front pads" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notes"], "front pads");
        assert_eq!(body["cost"], 320.5);

        let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Maintenance record not found");
    }

    #[tokio::test]
    async fn reminders_flow_and_vehicle_delete_cascades() {
        let app = TestApp::new();
        let (token, _) = app.signup("remind@example.com").await;
        let vehicle_id = app.create_vehicle(&token).await;

        let (status, reminder) = app
            .send(
                "POST",
                &format!("/api/reminders/vehicle/{vehicle_id}"),
                Some(&token),
                Some(json!({ "service_type": "Inspection", "due_by_date": "2025-06-01", "is_recurring": true, "recurring_interval_months": 12 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reminder["is_active"], true);
        assert_eq!(reminder["due_by_date"], "2025-06-01T00:00:00Z");
        assert_eq!(reminder["due_by_mileage"], Value::Null);

        let uri = format!("/api/reminders/{}", reminder["id"].as_str().unwrap());
        let (status, body) = app
            .send("PUT", &uri, Some(&token), Some(json!({ "is_active": false })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], false);
        assert_eq!(body["service_type"], "Inspection");

        let (status, list) = app
            .send(
                "GET",
                &format!("/api/reminders/vehicle/{vehicle_id}"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = app
            .send(
                "DELETE",
                &format!("/api/vehicles/{vehicle_id}"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Reminder not found");
    }

    #[tokio::test]
    async fn change_password_flow() {
        let app = TestApp::new();
        let (token, _) = app.signup("change@example.com").await;

        let (status, _) = app
            .send(
                "PUT",
                "/api/auth/change-password",
                Some(&token),
                Some(json!({ "current_password": "wrong-one", "new_password": "brandnew1" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .send(
                "PUT",
                "/api/auth/change-password",
                Some(&token),
                Some(json!({ "current_password": "hunter22", "new_password": "brandnew1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password changed successfully");

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "change@example.com", "password": "brandnew1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let app = TestApp::new();
        app.signup("reset@example.com").await;

        let (status, unknown) = app
            .send(
                "POST",
                "/api/auth/forgot-password",
                None,
                Some(json!({ "email": "nobody@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, known) = app
            .send(
                "POST",
                "/api/auth/forgot-password",
                None,
                Some(json!({ "email": "reset@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unknown, known);

        let user = app
            .state
            .store
            .find_user_by_email("reset@example.com")
            .await
            .unwrap()
            .unwrap();
        let token = user.reset_token.clone().unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/reset-password",
                None,
                Some(json!({ "token": "bogus", "new_password": "fresh-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/reset-password",
                None,
                Some(json!({ "token": token.as_str(), "new_password": "fresh-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // single use
        let (status, _) = app
            .send(
                "POST",
                "/api/auth/reset-password",
                None,
                Some(json!({ "token": token.as_str(), "new_password": "again-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "reset@example.com", "password": "fresh-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_reset_token_is_rejected() {
        let app = TestApp::new();
        let (_, user_id) = app.signup("late@example.com").await;
        let mut user = app.state.store.find_user_by_id(user_id).await.unwrap().unwrap();
        user.reset_token = Some("expired-token".into());
        user.reset_token_expires_at = Some(OffsetDateTime::now_utc() - Duration::minutes(1));
        app.state.store.update_user(&user).await.unwrap();

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/reset-password",
                None,
                Some(json!({ "token": "expired-token", "new_password": "fresh-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("expired"));
    }

    #[tokio::test]
    async fn malformed_bodies_answer_with_detail() {
        let app = TestApp::new();
        let (token, _) = app.signup("bodies@example.com").await;
        let vehicle_id = app.create_vehicle(&token).await;

        let (status, body) = app
            .send("POST", "/api/vehicles", Some(&token), Some(json!({ "make": "Mazda" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("model"), "{body}");

        let (status, body) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "bodies@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/vehicles/{vehicle_id}"),
                Some(&token),
                Some(json!({ "year": "abc" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        // no content-type at all
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/signup")
            .body(Body::from(r#"{"email":"x@example.com","password":"hunter22"}"#))
            .unwrap();
        let res = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().contains("Content-Type"));
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_reminder() {
        let app = TestApp::new();
        let (alice, _) = app.signup("alice.r@example.com").await;
        let (bob, _) = app.signup("bob.r@example.com").await;
        let vehicle_id = app.create_vehicle(&alice).await;

        let (status, reminder) = app
            .send(
                "POST",
                &format!("/api/reminders/vehicle/{vehicle_id}"),
                Some(&alice),
                Some(json!({ "service_type": "Tyre rotation", "due_by_mileage": 60000 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let uri = format!("/api/reminders/{}", reminder["id"].as_str().unwrap());

        let (status, body) = app.send("GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Reminder not found");
        let (status, _) = app
            .send("PUT", &uri, Some(&bob), Some(json!({ "service_type": "Hijacked" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send("DELETE", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.send("GET", &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service_type"], "Tyre rotation");
    }

    #[tokio::test]
    async fn fuel_logs_flow_and_stats() {
        let app = TestApp::new();
        let (token, _) = app.signup("fuel@example.com").await;
        let (other, _) = app.signup("fuel.other@example.com").await;
        let vehicle_id = app.create_vehicle(&token).await;
        let base = format!("/api/fuel/vehicle/{vehicle_id}");

        let five_days_ago = (OffsetDateTime::now_utc() - Duration::days(5))
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();
        let (status, first) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "date": five_days_ago, "odometer_reading": 10000, "liters": 20.0, "total_cost": 40.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{first}");
        assert_eq!(first["fuel_type"], "Petrol RON95");

        let (status, latest) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "mileage": 10450, "fuel_amount": 30.0, "total_price": 61.5, "fuel_type": "Diesel" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{latest}");
        assert_eq!(latest["odometer_reading"], 10450);

        let (status, _) = app
            .send(
                "POST",
                &base,
                Some(&token),
                Some(json!({ "date": "2020-01-01", "odometer_reading": 5000, "liters": 50.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, list) = app.send("GET", &base, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["id"], latest["id"]);
        assert_eq!(list[2]["odometer_reading"], 5000);

        let (status, stats) = app
            .send("GET", &format!("{base}/stats"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["logs_count"], 2);
        assert_eq!(stats["total_distance"], 450.0);
        assert_eq!(stats["total_fuel"], 50.0);
        assert_eq!(stats["total_cost"], 101.5);
        assert_eq!(stats["average_mpg"], 9.0);
        assert_eq!(stats["fuel_type"], "Petrol RON95");

        let (status, stats) = app
            .send("GET", &format!("{base}/stats?days=3650"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["logs_count"], 3);

        for query in ["days=0", "days=abc"] {
            let (status, body) = app
                .send("GET", &format!("{base}/stats?{query}"), Some(&token), None)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert!(body["detail"].is_string(), "{query}");
        }

        let (status, _) = app
            .send("GET", &format!("{base}/stats"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/fuel/{}", first["id"].as_str().unwrap());
        let (status, _) = app.send("GET", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send("PUT", &uri, Some(&token), Some(json!({ "notes": "highway run" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notes"], "highway run");
        assert_eq!(body["liters"], 20.0);

        let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Fuel log not found");

        let latest_uri = format!("/api/fuel/{}", latest["id"].as_str().unwrap());
        let (status, _) = app
            .send("DELETE", &format!("/api/vehicles/{vehicle_id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send("GET", &latest_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preferences_default_and_persist() {
        let app = TestApp::new();
        let (token, user_id) = app.signup("prefs@example.com").await;

        let (status, body) = app
            .send("GET", "/api/settings/preferences", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user_id.to_string());
        assert_eq!(body["preferences"]["theme"], "light");
        assert_eq!(body["preferences"]["email_notifications"], true);

        let (status, body) = app
            .send(
                "PUT",
                "/api/settings/preferences",
                Some(&token),
                Some(json!({ "theme": "dark", "distance_unit": "km" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preferences"]["theme"], "dark");
        assert_eq!(body["preferences"]["currency"], "USD");

        let (_, body) = app
            .send("GET", "/api/settings/preferences", Some(&token), None)
            .await;
        assert_eq!(body["preferences"]["distance_unit"], "km");

        let (status, body) = app
            .send(
                "PUT",
                "/api/settings/preferences",
                Some(&token),
                Some(json!({ "theme": 5 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn deleting_the_account_removes_everything() {
        let app = TestApp::new();
        let (token, user_id) = app.signup("leaving@example.com").await;
        let vehicle_id = app.create_vehicle(&token).await;

        let (status, body) = app
            .send("GET", "/api/settings/account", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "leaving@example.com");
        assert_eq!(body["is_active"], true);
        assert!(body["updated_at"].is_string());

        let (status, body) = app
            .send("DELETE", "/api/settings/account", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Account deleted successfully");

        assert!(app
            .state
            .store
            .find_vehicle(user_id, vehicle_id.parse().unwrap())
            .await
            .unwrap()
            .is_none());
        let (status, _) = app.send("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app
            .send("DELETE", "/api/settings/account", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // the address can register again
        app.signup("leaving@example.com").await;
    }

    #[test]
    fn cors_layer_accepts_lists() {
        // smoke: neither shape panics
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }
}
