//! HTTP API for the storefront back office.
//!
//! Public routes serve page content. Routes under `/api/admin` and the
//! session routes need an `Authorization: Bearer <token>` header obtained
//! from `POST /api/login`.

mod admin;
mod content;
mod response;
mod session;

pub use response::{ApiError, SaveResponse};
pub use session::AuthSession;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{Argon2Hasher, Authenticator, SessionStore};
use crate::db::{
    CatalogRepository, CategoryRepository, CollectionRepository, PageRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pages: PageRepository,
    pub categories: CategoryRepository,
    pub collections: CollectionRepository,
    pub catalog: CatalogRepository,
    pub auth: Authenticator,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(pool: SqlitePool, hasher: Argon2Hasher, sessions: Arc<SessionStore>) -> Self {
        Self {
            pages: PageRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            collections: CollectionRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            auth: Authenticator::new(UserRepository::new(pool), hasher),
            sessions,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/login", post(session::login))
        .route("/api/categories", get(content::categories))
        .route("/api/slides", get(content::slides))
        .route("/api/main", get(content::main_page))
        .route("/api/about", get(content::about))
        .route("/api/rooms/{room}", get(content::room))
        .route("/api/collections", get(content::collection_previews))
        .route("/api/collections/{id}", get(content::collection))
        .route(
            "/api/collections/by-name/{name}",
            get(content::collection_by_name),
        )
        .route("/api/catalog/products", get(content::products))
        .route("/api/catalog/products/{id}", get(content::product))
        .route("/api/catalog/filters", get(content::filters))
        .route("/api/catalog/banner", get(content::catalog_banner));

    let protected_routes = Router::new()
        .route("/api/logout", post(session::logout))
        .route("/api/me", get(session::me))
        .route("/api/admin/categories", put(admin::save_categories))
        .route("/api/admin/slides", put(admin::save_slides))
        .route("/api/admin/main", put(admin::save_main))
        .route("/api/admin/about", put(admin::save_about))
        .route("/api/admin/rooms/{room}", put(admin::save_room))
        .route(
            "/api/admin/collections",
            put(admin::save_collection_previews),
        )
        .route("/api/admin/collections/{id}", put(admin::save_collection))
        .route("/api/admin/catalog/products", put(admin::save_products))
        .route("/api/admin/catalog/filters", put(admin::save_filters))
        .route("/api/admin/catalog/banner", put(admin::save_catalog_banner))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
