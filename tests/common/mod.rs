#![allow(dead_code)]

use media_ranker::config::database::DatabaseConfig;
use media_ranker::config::session::{SameSite, SessionConfig};
use reqwest::{header, redirect, Client, Response};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let _ = media_ranker::utils::init_session_config(SessionConfig {
            secret: "integration_test_secret_that_is_at_least_32_characters_long".to_string(),
            ttl: 3600,
            cookie_secure: false,
            same_site: SameSite::Lax,
        });
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Fresh in-memory store with migrations applied.
pub async fn test_db() -> DatabaseConnection {
    init_env();

    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let db = config
        .connect()
        .await
        .expect("Failed to open in-memory database");
    media_ranker::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn spawn_app() -> TestApp {
    let db = test_db().await;

    let app = media_ranker::routes::create_routes().layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to build client");

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
    }
}

/// `name=value` pair from the response's session cookie, if one was set.
pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Response has no Location header")
        .to_string()
}

/// Log in as `username` and return the session cookie.
pub async fn login(app: &TestApp, username: &str) -> String {
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({ "username": username }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), 303);
    session_cookie(&resp).expect("Login did not set a session cookie")
}

/// Create a work and return its id.
pub async fn create_work(app: &TestApp, title: &str, category: &str) -> i64 {
    let resp = app
        .client
        .post(app.url("/works"))
        .json(&serde_json::json!({ "title": title, "category": category }))
        .send()
        .await
        .expect("Failed to create work");
    assert_eq!(resp.status(), 303, "create did not redirect");

    let loc = location(&resp);
    loc.trim_start_matches("/works/")
        .parse()
        .unwrap_or_else(|_| panic!("Unexpected redirect target {loc}"))
}

pub async fn flash(resp: Response) -> (String, String) {
    let body: Value = resp.json().await.expect("Failed to parse body");
    (
        body["flash"]["kind"].as_str().unwrap_or_default().to_string(),
        body["flash"]["message"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    )
}
