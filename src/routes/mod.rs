use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use axum::{routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    let config = RateLimitConfig::from_env();

    session_routes(&config)
        .merge(read_routes(&config))
        .merge(write_routes(&config))
}

/// Login and logout.
fn session_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/login", routing::post(handlers::user::login))
        .route("/logout", routing::post(handlers::user::logout));

    with_optional_rate_limit(router, config.enabled, config.session)
}

/// Every GET page.
fn read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/", routing::get(handlers::work::home))
        // Works
        .route("/works", routing::get(handlers::work::list_works))
        .route("/works/new", routing::get(handlers::work::new_work))
        .route("/works/{id}", routing::get(handlers::work::show_work))
        .route("/works/{id}/edit", routing::get(handlers::work::edit_work))
        // Users
        .route("/login", routing::get(handlers::user::login_form))
        .route("/users", routing::get(handlers::user::list_users))
        .route("/users/current", routing::get(handlers::user::current_user))
        .route("/users/{id}", routing::get(handlers::user::show_user));

    with_optional_rate_limit(router, config.enabled, config.read)
}

/// Catalog mutations and votes.
fn write_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/works", routing::post(handlers::work::create_work))
        .route(
            "/works/{id}",
            routing::put(handlers::work::update_work)
                .patch(handlers::work::update_work)
                .delete(handlers::work::destroy_work),
        )
        .route(
            "/works/{id}/upvote",
            routing::post(handlers::work::upvote_work),
        );

    with_optional_rate_limit(router, config.enabled, config.write)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    match GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    {
        Some(governor_conf) => router.layer(GovernorLayer::new(governor_conf)),
        None => {
            tracing::warn!(?rule, "Invalid rate limit rule, serving without a limit");
            router
        }
    }
}
