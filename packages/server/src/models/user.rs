use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{validate_name, validate_password};
use crate::entity::user_profile;
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileUser {
    pub id: Uuid,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

/// Partial profile update. Absent or empty fields are left unchanged.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(example = "Alice Liddell")]
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

pub fn validate_update_profile(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(name) = payload.name() {
        validate_name(name)?;
    }
    if let Some(password) = payload.password() {
        validate_password(password)?;
    }
    Ok(())
}

/// Body measurements of the caller.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BodyProfileResponse {
    pub id: Uuid,
    #[schema(example = 172.5)]
    pub height: Option<f64>,
    #[schema(example = 64.0)]
    pub weight: Option<f64>,
    #[schema(example = "athletic")]
    pub body_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<user_profile::Model> for BodyProfileResponse {
    fn from(profile: user_profile::Model) -> Self {
        Self {
            id: profile.id,
            height: profile.height,
            weight: profile.weight,
            body_type: profile.body_type,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateBodyProfileRequest {
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub body_type: Option<String>,
}

pub fn validate_update_body_profile(payload: &UpdateBodyProfileRequest) -> Result<(), AppError> {
    for (field, value) in [("Height", payload.height), ("Weight", payload.weight)] {
        if let Some(v) = value
            && !(v.is_finite() && v > 0.0)
        {
            return Err(AppError::Validation(format!(
                "{field} must be a positive number"
            )));
        }
    }
    if let Some(body_type) = &payload.body_type
        && body_type.chars().count() > 50
    {
        return Err(AppError::Validation(
            "Body type must be at most 50 characters".into(),
        ));
    }
    Ok(())
}
