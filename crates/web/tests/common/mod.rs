//! In-process test harness.
//!
//! Drives the real router (memory storage, memory sessions) with
//! `tower::ServiceExt::oneshot`, carrying the session cookie like a browser.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use krishop_web::config::WebConfig;
use krishop_web::middleware::SESSION_COOKIE_NAME;
use krishop_web::state::AppState;

pub const PASSWORD: &str = "password123";

fn test_config() -> WebConfig {
    let mut config = WebConfig::in_memory();
    config.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
    config
}

/// A response with its body read to a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// The session `Set-Cookie` header, if this response sent one.
    pub fn session_cookie_header(&self) -> Option<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
    }
}

/// One browser talking to a fresh application instance.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    client_ip: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// An application with the login/registration rate limiter switched on.
    pub fn with_auth_rate_limit() -> Self {
        let mut config = test_config();
        config.auth_rate_limit = true;
        Self::with_config(config)
    }

    fn with_config(config: WebConfig) -> Self {
        let state = AppState::in_memory(config);

        Self {
            router: krishop_web::app(state, MemoryStore::default()),
            cookie: None,
            client_ip: None,
        }
    }

    /// A second browser against the same application and data.
    pub fn second_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            client_ip: None,
        }
    }

    /// Send requests as if relayed by a proxy for `ip`.
    pub fn via_proxy_for(mut self, ip: &str) -> Self {
        self.client_ip = Some(ip.to_owned());
        self
    }

    pub fn has_session_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(ip) = &self.client_ip {
            request
                .headers_mut()
                .insert("x-forwarded-for", ip.parse().unwrap());
        }
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                format!("{SESSION_COOKIE_NAME}={cookie}").parse().unwrap(),
            );
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };
        self.track_cookie(&response);
        response
    }

    fn track_cookie(&mut self, response: &TestResponse) {
        let Some(set_cookie) = response.session_cookie_header() else {
            return;
        };
        let pair = set_cookie.split(';').next().unwrap_or_default();
        let value = pair
            .split_once('=')
            .map(|(_, v)| v.trim())
            .unwrap_or_default();

        if value.is_empty() || set_cookie.contains("Max-Age=0") {
            self.cookie = None;
        } else {
            self.cookie = Some(value.to_owned());
        }
    }

    // =========================================================================
    // Flows
    // =========================================================================

    pub async fn register(&mut self, username: &str, email: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Register and log in; panics if either step fails.
    pub async fn signed_up(username: &str) -> Self {
        let mut app = Self::new();
        app.sign_up_as(username).await;
        app
    }

    pub async fn sign_up_as(&mut self, username: &str) {
        let email = format!("{username}@example.com");
        let response = self.register(username, &email).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        let response = self.login(&email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    }

    /// Post a listing and return its id, read back from the home page.
    pub async fn post_listing(&mut self, name: &str) -> i32 {
        let response = self
            .post_form(
                "/post/new",
                &[("name", name), ("price", "19.99"), ("store", "Corner Shop")],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        assert_eq!(response.location(), "/");

        let home = self.get("/").await;
        let marker = format!("\">{name}</a>");
        let end = home.body.find(&marker).unwrap();
        let start = home.body[..end].rfind("/post/new/").unwrap() + "/post/new/".len();
        home.body[start..end].parse().unwrap()
    }
}
