use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{product, size};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::cart::{
    AddToCartRequest, AddToCartResponse, CartItem, CartResponse, validate_add_to_cart,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Cart",
    operation_id = "addToCart",
    summary = "Add a product to the cart",
    description = "Checks that the product and size exist and echoes the item back. \
        Nothing is persisted.",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item accepted", body = AddToCartResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product or size not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(user_id = %auth_user.user_id, product_id = %payload.product_id, size_id = %payload.size_id)
)]
pub async fn add_to_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>, AppError> {
    validate_add_to_cart(&payload)?;

    product::Entity::find_live()
        .filter(product::Column::Id.eq(payload.product_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    size::Entity::find_live()
        .filter(size::Column::Id.eq(payload.size_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Size not found".into()))?;

    Ok(Json(AddToCartResponse {
        message: "Product added to cart".into(),
        cart_item: CartItem {
            product_id: payload.product_id,
            size_id: payload.size_id,
            quantity: payload.quantity,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Cart",
    operation_id = "getCart",
    summary = "Get the caller's cart",
    description = "Carts are not stored yet, so this is always empty.",
    responses(
        (status = 200, description = "Cart contents", body = CartResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart(auth_user: AuthUser) -> Json<CartResponse> {
    Json(CartResponse {
        cart_items: Vec::new(),
    })
}
