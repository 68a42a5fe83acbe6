use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use media_ranker::{
    config::{database::DatabaseConfig, session::SessionConfig},
    migration, routes, utils,
};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Works
        media_ranker::handlers::work::home,
        media_ranker::handlers::work::list_works,
        media_ranker::handlers::work::new_work,
        media_ranker::handlers::work::show_work,
        media_ranker::handlers::work::create_work,
        media_ranker::handlers::work::edit_work,
        media_ranker::handlers::work::update_work,
        media_ranker::handlers::work::destroy_work,
        // Votes
        media_ranker::handlers::work::upvote_work,
        // Session
        media_ranker::handlers::user::login_form,
        media_ranker::handlers::user::login,
        media_ranker::handlers::user::logout,
        // Users
        media_ranker::handlers::user::current_user,
        media_ranker::handlers::user::list_users,
        media_ranker::handlers::user::show_user,
    ),
    components(
        schemas(
            media_ranker::error::AppError,
            media_ranker::models::WorkModel,
            media_ranker::models::UserModel,
            media_ranker::models::VoteModel,
            media_ranker::response::Flash,
            media_ranker::response::FlashKind,
            media_ranker::response::Form,
            media_ranker::handlers::work::WorkParams,
            media_ranker::handlers::user::LoginRequest,
        )
    ),
    tags(
        (name = "works", description = "Catalog of books, movies and albums"),
        (name = "votes", description = "Upvoting works"),
        (name = "session", description = "Logging in and out"),
        (name = "users", description = "User directory"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_ranker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fail fast on bad configuration before touching the database
    let session_config = SessionConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    utils::init_session_config(session_config)?;

    tracing::info!("Starting Media Ranker v{}...", env!("CARGO_PKG_VERSION"));

    let db = db_config.connect().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app().layer(Extension(db));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db.ping().await.is_ok();
    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Media Ranker",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
