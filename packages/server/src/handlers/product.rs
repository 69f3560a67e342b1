use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{product, product_size, size};
use crate::error::{AppError, ErrorBody};
use crate::extractors::request::{AppPath, AppQuery};
use crate::models::product::{
    ProductDetail, ProductDetailResponse, ProductListQuery, ProductListResponse, ProductResponse,
    SizeResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products",
    description = "Returns every product, optionally narrowed by exact `category` and/or `brand` \
        (both filters are ANDed). Not paginated.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Matching products", body = ProductListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(category = ?query.category, brand = ?query.brand))]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductListQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let mut select = product::Entity::find_live();

    if let Some(category) = query.category() {
        select = select.filter(product::Column::Category.eq(category));
    }
    if let Some(brand) = query.brand() {
        select = select.filter(product::Column::Brand.eq(brand));
    }

    let products = select
        .order_by_asc(product::Column::CreatedAt)
        .order_by_asc(product::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ProductListResponse { products }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product with its sizes",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ProductDetailResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(product_id = %id))]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let product = product::Entity::find_live()
        .filter(product::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let sizes = product_size::Entity::find()
        .filter(product_size::Column::ProductId.eq(id))
        .find_also_related(size::Entity)
        .order_by_asc(size::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, size)| size)
        .filter(|size| !size.deleted)
        .map(SizeResponse::from)
        .collect();

    Ok(Json(ProductDetailResponse {
        product: ProductDetail {
            product: ProductResponse::from(product),
            sizes,
        },
    }))
}
