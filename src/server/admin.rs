//! Session-protected save routes. Each one submits a complete list (or a
//! single page) and answers with a [`SaveResponse`](super::response::SaveResponse).

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::content::{parse_room, CategoryQuery};
use super::response::saved;
use super::AppState;
use crate::db::SubcategoryPolicy;
use crate::models::{
    persisted_id, AboutPage, CatalogBanner, CatalogFilter, CatalogProduct, Category, Collection,
    CollectionPreview, ImageSlide, MainSection, RoomSection,
};

#[derive(Debug, Default, Deserialize)]
pub struct PolicyQuery {
    #[serde(default)]
    pub policy: SubcategoryPolicy,
}

pub async fn save_categories(
    State(state): State<AppState>,
    Query(query): Query<PolicyQuery>,
    Json(categories): Json<Vec<Category>>,
) -> Response {
    saved(
        "categories",
        state.categories.save(&categories, query.policy).await,
    )
}

pub async fn save_slides(
    State(state): State<AppState>,
    Json(slides): Json<Vec<ImageSlide>>,
) -> Response {
    saved("slides", state.pages.save_slides(&slides).await)
}

pub async fn save_main(
    State(state): State<AppState>,
    Json(sections): Json<Vec<MainSection>>,
) -> Response {
    saved(
        "main page sections",
        state.pages.save_main_sections(&sections).await,
    )
}

pub async fn save_about(State(state): State<AppState>, Json(page): Json<AboutPage>) -> Response {
    saved("about page", state.pages.save_about_page(&page).await)
}

pub async fn save_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(sections): Json<Vec<RoomSection>>,
) -> Response {
    let room = match parse_room(&room) {
        Ok(room) => room,
        Err(err) => return err.into_response(),
    };
    let what = format!("{} sections", room);
    saved(&what, state.pages.save_room_sections(room, &sections).await)
}

pub async fn save_collection_previews(
    State(state): State<AppState>,
    Json(previews): Json<Vec<CollectionPreview>>,
) -> Response {
    saved(
        "collection previews",
        state.collections.save_previews(&previews).await,
    )
}

/// `id` 0 creates a new collection.
pub async fn save_collection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut collection): Json<Collection>,
) -> Response {
    collection.id = persisted_id(Some(id));
    saved(
        "collection",
        state.collections.save_collection(&collection).await,
    )
}

pub async fn save_products(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
    Json(products): Json<Vec<CatalogProduct>>,
) -> Response {
    saved(
        "products",
        state.catalog.save_products(query.category, &products).await,
    )
}

pub async fn save_filters(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
    Json(filters): Json<Vec<CatalogFilter>>,
) -> Response {
    saved(
        "filters",
        state.catalog.save_filters(query.category, &filters).await,
    )
}

pub async fn save_catalog_banner(
    State(state): State<AppState>,
    Json(banner): Json<CatalogBanner>,
) -> Response {
    saved("catalog banner", state.catalog.save_banner(&banner).await)
}
