//! Integration tests for the HTTP surface
//!
//! These tests verify end-to-end functionality including:
//! - CORS configuration
//! - Route registration
//! - Session cookies and authentication
//! - Full game flow over HTTP

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use ludo_duel::{
    auth::session_cookie_name,
    core::ScriptedDice,
    routes,
    state::AppState,
    store::MemoryStore,
};
use serde_json::Value;
use std::sync::Arc;

const SECRET: &str = "test_secret_key_for_integration_tests";

/// Helper to create a test server with the full router and scripted dice
fn create_test_server(rolls: Vec<u8>) -> TestServer {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ScriptedDice::new(rolls)),
        SECRET.to_string(),
    );
    let app = routes::build_router(state, &["http://localhost:8000".to_string()]);

    TestServer::new(app).unwrap()
}

/// Cookie header value carrying the session from a join response
fn session_cookie(room_id: &str, join: &TestResponse) -> HeaderValue {
    let body: Value = join.json();
    let token = body["token"].as_str().expect("Should have token in response");
    HeaderValue::from_str(&format!("{}={}", session_cookie_name(room_id), token)).unwrap()
}

async fn join(server: &TestServer, room_id: &str, identity: &str) -> TestResponse {
    server
        .post(&format!("/api/rooms/{}/join", room_id))
        .form(&[("identity", identity)])
        .await
}

mod route_registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_all_api_routes_registered() {
        let server = create_test_server(vec![]);

        let routes = vec![
            ("POST", "/api/rooms/test123/join"),
            ("POST", "/api/rooms/test123/ready"),
            ("POST", "/api/rooms/test123/roll"),
            ("GET", "/api/rooms/test123/view"),
        ];

        for (method, path) in routes {
            let response = match method {
                "POST" => server.post(path).await,
                "GET" => server.get(path).await,
                _ => panic!("Unknown method: {}", method),
            };

            assert_ne!(
                response.status_code(),
                StatusCode::NOT_FOUND,
                "Route {} {} should exist (got 404)",
                method,
                path
            );
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = create_test_server(vec![]);

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "ok");
    }
}

mod cors_configuration_tests {
    use super::*;

    #[tokio::test]
    async fn test_cors_allows_configured_origins() {
        let server = create_test_server(vec![]);

        let response = server
            .get("/health")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:8000"))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "http://localhost:8000"
        );
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            "true"
        );
    }
}

mod join_tests {
    use super::*;

    #[tokio::test]
    async fn test_join_assigns_slots_in_order() {
        let server = create_test_server(vec![]);

        let first = join(&server, "table", "alice").await;
        let second = join(&server, "table", "bob").await;

        assert_eq!(first.status_code(), StatusCode::OK);
        assert_eq!(second.status_code(), StatusCode::OK);
        assert_eq!(first.json::<Value>()["slot"], "p1");
        assert_eq!(second.json::<Value>()["slot"], "p2");
        assert_eq!(second.json::<Value>()["player_number"], 2);
    }

    #[tokio::test]
    async fn test_join_sets_session_cookie() {
        let server = create_test_server(vec![]);

        let response = join(&server, "table", "alice").await;

        let cookie = response
            .iter_headers()
            .find(|(name, _)| *name == header::SET_COOKIE)
            .map(|(_, value)| value.to_str().unwrap().to_string())
            .expect("Should have set-cookie header");
        assert!(cookie.starts_with(&session_cookie_name("table")));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_join_without_identity_generates_one() {
        let server = create_test_server(vec![]);

        let response = server.post("/api/rooms/table/join").form(&[("identity", "")]).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let identity = response.json::<Value>()["identity"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(identity.starts_with("u_"));
    }

    #[tokio::test]
    async fn test_rejoin_keeps_slot() {
        let server = create_test_server(vec![]);
        join(&server, "table", "alice").await;
        join(&server, "table", "bob").await;

        let again = join(&server, "table", "bob").await;

        assert_eq!(again.status_code(), StatusCode::OK);
        assert_eq!(again.json::<Value>()["slot"], "p2");
    }

    #[tokio::test]
    async fn test_third_player_gets_room_full() {
        let server = create_test_server(vec![]);
        join(&server, "table", "alice").await;
        join(&server, "table", "bob").await;

        let response = join(&server, "table", "carol").await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "room_full");
    }

    #[tokio::test]
    async fn test_blank_room_id_is_rejected() {
        let server = create_test_server(vec![]);

        let response = join(&server, "%20%20", "alice").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "invalid_room_id");
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_actions_require_session_cookie() {
        let server = create_test_server(vec![]);
        join(&server, "table", "alice").await;

        for path in ["/api/rooms/table/ready", "/api/rooms/table/roll"] {
            let response = server.post(path).await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }
        let response = server.get("/api/rooms/table/view").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let server = create_test_server(vec![]);
        let alice = join(&server, "table", "alice").await;
        let token = alice.json::<Value>()["token"].as_str().unwrap().to_string();
        let forged = token.replacen(":p1:", ":p2:", 1);

        let response = server
            .post("/api/rooms/table/roll")
            .add_header(
                header::COOKIE,
                HeaderValue::from_str(&format!("{}={}", session_cookie_name("table"), forged))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cookie_is_scoped_to_its_room() {
        let server = create_test_server(vec![]);
        let alice = join(&server, "table", "alice").await;
        let token = alice.json::<Value>()["token"].as_str().unwrap().to_string();

        // A valid token presented under another room's cookie name
        let response = server
            .get("/api/rooms/other/view")
            .add_header(
                header::COOKIE,
                HeaderValue::from_str(&format!("{}={}", session_cookie_name("other"), token))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}

mod end_to_end_tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_roll_and_view_flow() {
        let server = create_test_server(vec![4]);

        // Step 1: Both players join
        let alice = join(&server, "table", "alice").await;
        let bob = join(&server, "table", "bob").await;
        let alice_cookie = session_cookie("table", &alice);
        let bob_cookie = session_cookie("table", &bob);

        // Step 2: Rolling before the game starts is rejected
        let early = server
            .post("/api/rooms/table/roll")
            .add_header(header::COOKIE, alice_cookie.clone())
            .await;
        assert_eq!(early.status_code(), StatusCode::CONFLICT);
        assert_eq!(early.json::<Value>()["error"], "game_not_started");

        // Step 3: Both press ready
        let ready = server
            .post("/api/rooms/table/ready")
            .add_header(header::COOKIE, alice_cookie.clone())
            .await;
        assert_eq!(ready.json::<Value>()["status"], "waiting_for_opponent");

        let ready = server
            .post("/api/rooms/table/ready")
            .add_header(header::COOKIE, bob_cookie.clone())
            .await;
        assert_eq!(ready.json::<Value>()["status"], "started");

        // Step 4: Out-of-turn roll is rejected
        let wrong = server
            .post("/api/rooms/table/roll")
            .add_header(header::COOKIE, bob_cookie.clone())
            .await;
        assert_eq!(wrong.status_code(), StatusCode::CONFLICT);
        assert_eq!(wrong.json::<Value>()["error"], "not_your_turn");

        // Step 5: Player 1 rolls a 4
        let roll = server
            .post("/api/rooms/table/roll")
            .add_header(header::COOKIE, alice_cookie.clone())
            .await;
        assert_eq!(roll.status_code(), StatusCode::OK);
        let report: Value = roll.json();
        assert_eq!(report["dice"], 4);
        assert_eq!(report["movement"]["to"], 4);
        assert_eq!(report["turn_passed"], true);

        // Step 6: Each viewer sees the same room from their side
        let alice_view: Value = server
            .get("/api/rooms/table/view")
            .add_header(header::COOKIE, alice_cookie)
            .await
            .json();
        let bob_view: Value = server
            .get("/api/rooms/table/view")
            .add_header(header::COOKIE, bob_cookie)
            .await
            .json();

        assert_eq!(alice_view["current_player"], 2);
        assert_eq!(alice_view["p1_points"], 4);
        assert_eq!(alice_view["dice"], 4);
        assert_eq!(alice_view["roll_enabled"], false);
        assert_eq!(bob_view["roll_enabled"], true);
        assert_eq!(bob_view["my_slot"], "p2");
    }
}
