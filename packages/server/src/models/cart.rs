use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub size_id: Uuid,
    #[schema(example = 1)]
    pub quantity: i32,
}

pub fn validate_add_to_cart(payload: &AddToCartRequest) -> Result<(), AppError> {
    if payload.quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AddToCartResponse {
    #[schema(example = "Product added to cart")]
    pub message: String,
    pub cart_item: CartItem,
}

/// The cart is not persisted; this is always empty.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CartResponse {
    pub cart_items: Vec<CartItem>,
}
