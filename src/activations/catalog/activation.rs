//! Catalog HTTP routes
//!
//! Handlers only parse identifiers at the boundary and hand off to
//! [`CatalogService`]; no tree logic lives here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::CatalogService;
use super::types::{CategoryInput, ItemInput, NodePatch, SubcategoryInput};
use crate::errors::{ApiJson, ApiQuery, ApiResult};
use crate::types::CatalogId;

/// Build the catalog router (categories, products, items)
pub fn catalog_router(service: CatalogService) -> Router {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/categories/:id/subcategories", post(add_subcategory))
        .route(
            "/api/categories/:id/subcategories/:sub_id",
            put(update_subcategory).delete(remove_subcategory),
        )
        .route("/api/categories/:id/products", get(legacy_products))
        .route("/api/products/by-category/:id", get(products_by_category))
        .route("/api/products/by-subcategory/:id", get(products_by_subcategory))
        .route("/api/debug/category-hierarchy/:id", get(category_hierarchy))
        .route("/api/items", get(list_items).post(create_item))
        .route(
            "/api/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery {
    #[serde(default = "default_include")]
    include_subcategories: bool,
}

fn default_include() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProductQuery {
    #[serde(default)]
    subcategory_id: Option<String>,
}

fn parse_id(raw: &str) -> ApiResult<CatalogId> {
    Ok(CatalogId::parse_str(raw)?)
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(service): State<CatalogService>) -> ApiResult<impl IntoResponse> {
    Ok(Json(service.list_categories().await?))
}

async fn get_category(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_category(id).await?))
}

async fn create_category(
    State(service): State<CatalogService>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.update_category(id, input).await?))
}

async fn delete_category(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    service.delete_category(id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}

// ============================================================================
// Nested subcategories
// ============================================================================

async fn add_subcategory(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SubcategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let category = service.add_subcategory(id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_subcategory(
    State(service): State<CatalogService>,
    Path((id, sub_id)): Path<(String, String)>,
    ApiJson(patch): ApiJson<NodePatch>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let sub_id = parse_id(&sub_id)?;
    Ok(Json(service.update_subcategory(id, sub_id, patch).await?))
}

async fn remove_subcategory(
    State(service): State<CatalogService>,
    Path((id, sub_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let sub_id = parse_id(&sub_id)?;
    Ok(Json(service.remove_subcategory(id, sub_id).await?))
}

// ============================================================================
// Product queries
// ============================================================================

async fn products_by_category(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.resolve_products(id, query.include_subcategories).await?))
}

async fn products_by_subcategory(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.resolve_products(id, query.include_subcategories).await?))
}

async fn legacy_products(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<LegacyProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let subcategory_id = match query.subcategory_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw)?),
        _ => None,
    };
    Ok(Json(service.legacy_products(id, subcategory_id).await?))
}

async fn category_hierarchy(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.category_hierarchy(id).await?))
}

// ============================================================================
// Items
// ============================================================================

async fn list_items(State(service): State<CatalogService>) -> ApiResult<impl IntoResponse> {
    Ok(Json(service.list_items().await?))
}

async fn get_item(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_item(id).await?))
}

async fn create_item(
    State(service): State<CatalogService>,
    ApiJson(input): ApiJson<ItemInput>,
) -> ApiResult<impl IntoResponse> {
    let item = service.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ItemInput>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(service.update_item(id, input).await?))
}

async fn delete_item(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    service.delete_item(id).await?;
    Ok(Json(json!({ "message": "Item deleted" })))
}
