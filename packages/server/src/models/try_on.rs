use chrono::{DateTime, Utc};
use common::TryOnStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::try_on;

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadPhotoResponse {
    #[schema(example = "Photo uploaded successfully")]
    pub message: String,
    pub try_on_id: Uuid,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProcessTryOnRequest {
    pub try_on_id: Uuid,
    pub product_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProcessTryOnResponse {
    #[schema(example = "Try-on processing started")]
    pub message: String,
    pub try_on_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TryOnResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    #[schema(example = "uploads/4f1c..._9b2e....jpg")]
    pub original_image: String,
    pub result_image: Option<String>,
    pub status: TryOnStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<try_on::Model> for TryOnResponse {
    fn from(model: try_on::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            original_image: model.original_image,
            result_image: model.result_image,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TryOnHistoryResponse {
    pub try_ons: Vec<TryOnResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TryOnDetailResponse {
    pub try_on: TryOnResponse,
}

/// Which stored image of a try-on to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Original,
    Result,
}
