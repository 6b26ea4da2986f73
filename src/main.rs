use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use petitions_api::database::DatabaseManager;
use petitions_api::handlers;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = petitions_api::config::config();
    tracing::info!("Starting petitions API in {:?} mode", config.environment);

    // Apply schema migrations; keep serving (degraded) if the database is
    // not reachable yet so the health endpoint can report it.
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("Skipping migrations, database unavailable: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PETITIONS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4941);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Petitions API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(user_image_routes())
        .merge(petition_routes())
        .merge(support_tier_routes())
        .merge(supporter_routes())
        .merge(petition_image_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::users;

    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/logout", post(users::logout))
        .route("/users/:id", get(users::view).patch(users::update))
}

fn user_image_routes() -> Router {
    use handlers::user_images;

    Router::new().route(
        "/users/:id/image",
        get(user_images::get)
            .put(user_images::put)
            .delete(user_images::delete),
    )
}

fn petition_routes() -> Router {
    use handlers::petitions;

    Router::new()
        .route("/petitions", get(petitions::list).post(petitions::create))
        .route("/petitions/categories", get(petitions::list_categories))
        .route(
            "/petitions/:id",
            get(petitions::get_one)
                .patch(petitions::edit)
                .delete(petitions::delete),
        )
}

fn support_tier_routes() -> Router {
    use axum::routing::{patch, post};
    use handlers::support_tiers;

    Router::new()
        .route("/petitions/:id/supportTiers", post(support_tiers::add))
        .route(
            "/petitions/:id/supportTiers/:tierId",
            patch(support_tiers::edit).delete(support_tiers::delete),
        )
}

fn supporter_routes() -> Router {
    use handlers::supporters;

    Router::new().route(
        "/petitions/:id/supporters",
        get(supporters::list).post(supporters::add),
    )
}

fn petition_image_routes() -> Router {
    use handlers::petition_images;

    Router::new().route(
        "/petitions/:id/image",
        get(petition_images::get)
            .put(petition_images::put)
            .delete(petition_images::delete),
    )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Petitions API",
        "version": version,
        "endpoints": {
            "users": "/users/register, /users/login, /users/logout, /users/:id[/image]",
            "petitions": "/petitions[/:id], /petitions/categories, /petitions/:id/image",
            "supportTiers": "/petitions/:id/supportTiers[/:tierId]",
            "supporters": "/petitions/:id/supporters",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
