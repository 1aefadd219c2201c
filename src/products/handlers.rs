//! HTTP handlers for product endpoints
//!
//! Every route requires an authenticated user via the [`AuthUser`]
//! extractor. Handlers stay thin: parse/validate, delegate to
//! [`ProductService`](crate::products::service::ProductService), wrap the
//! response envelope.

use crate::core::auth::AuthUser;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::query::Paged;
use crate::products::model::{CreateProduct, Product, ProductQuery, UpdateProduct};
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use validator::Validate;

/// Product routes, to be merged into the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

fn parse_object_id(raw: &str) -> CatalogResult<ObjectId> {
    ObjectId::parse_str(raw)
        .map_err(|_| CatalogError::bad_request(format!("invalid product id '{raw}'")))
}

async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    input.validate()?;
    let product = state.products.create_product(&user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    ))
}

async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> CatalogResult<Json<Paged<Product>>> {
    Ok(Json(state.products.find_all(&query).await?))
}

async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> CatalogResult<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    let product = state.products.find_one(id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<UpdateProduct>,
) -> CatalogResult<impl IntoResponse> {
    patch.validate()?;
    let id = parse_object_id(&id)?;
    let product = state
        .products
        .update_product_by_id(&user, id, patch)
        .await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> CatalogResult<impl IntoResponse> {
    let id = parse_object_id(&id)?;
    state.products.delete_product_by_id(&user, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}
