use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{product, size};

/// Equality filters for the product list. Empty values are ignored.
#[derive(Deserialize, Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Exact category, e.g. `shirts`.
    pub category: Option<String>,
    /// Exact brand name.
    pub brand: Option<String>,
}

impl ProductListQuery {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref().filter(|b| !b.is_empty())
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    #[schema(example = "Linen shirt")]
    pub name: String,
    pub description: String,
    #[schema(example = 49.9)]
    pub price: f64,
    #[schema(example = "shirts")]
    pub category: String,
    #[schema(example = "Acme")]
    pub brand: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            brand: model.brand,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SizeResponse {
    pub id: Uuid,
    #[schema(example = "M")]
    pub name: String,
}

impl From<size::Model> for SizeResponse {
    fn from(model: size::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// A product together with the sizes it is offered in.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub sizes: Vec<SizeResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductDetailResponse {
    pub product: ProductDetail,
}
