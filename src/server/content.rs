//! Public read routes for the storefront.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::response::ApiError;
use super::AppState;
use crate::models::{
    AboutPage, CatalogBanner, CatalogFilter, CatalogProduct, Category, Collection,
    CollectionPreview, ImageSlide, MainPage, MainSection, Room, RoomPage,
};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<i64>,
}

pub(crate) fn parse_room(room: &str) -> Result<Room, ApiError> {
    room.parse().map_err(ApiError::not_found)
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.categories.list().await?))
}

pub async fn slides(State(state): State<AppState>) -> Result<Json<Vec<ImageSlide>>, ApiError> {
    Ok(Json(state.pages.list_slides().await?))
}

#[derive(Debug, Serialize)]
pub struct MainResponse {
    pub sections: Vec<MainSection>,
    pub page: MainPage,
}

pub async fn main_page(State(state): State<AppState>) -> Result<Json<MainResponse>, ApiError> {
    let sections = state.pages.list_main_sections().await?;
    let page = state.pages.main_page().await?;
    Ok(Json(MainResponse { sections, page }))
}

pub async fn about(State(state): State<AppState>) -> Result<Json<Option<AboutPage>>, ApiError> {
    Ok(Json(state.pages.about_page().await?))
}

pub async fn room(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<RoomPage>, ApiError> {
    let room = parse_room(&room)?;
    Ok(Json(state.pages.room_page(room).await?))
}

pub async fn collection_previews(
    State(state): State<AppState>,
) -> Result<Json<Vec<CollectionPreview>>, ApiError> {
    Ok(Json(state.collections.list_previews().await?))
}

pub async fn collection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Collection>, ApiError> {
    state
        .collections
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Collection {} not found", id)))
}

pub async fn collection_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Collection>, ApiError> {
    state
        .collections
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Collection '{}' not found", name)))
}

pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<CatalogProduct>>, ApiError> {
    Ok(Json(state.catalog.list_products(query.category).await?))
}

pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CatalogProduct>, ApiError> {
    state
        .catalog
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Product {} not found", id)))
}

pub async fn filters(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<CatalogFilter>>, ApiError> {
    Ok(Json(state.catalog.list_filters(query.category).await?))
}

pub async fn catalog_banner(
    State(state): State<AppState>,
) -> Result<Json<Option<CatalogBanner>>, ApiError> {
    Ok(Json(state.catalog.banner().await?))
}
