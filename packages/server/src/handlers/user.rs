use axum::{Json, extract::State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{user, user_profile};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::shared::MessageResponse;
use crate::models::user::{
    BodyProfileResponse, ProfileResponse, ProfileUser, UpdateBodyProfileRequest,
    UpdateProfileRequest, validate_update_body_profile, validate_update_profile,
};
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    get,
    path = "/profile",
    tag = "User",
    operation_id = "getProfile",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;

    Ok(Json(ProfileResponse {
        user: ProfileUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "User",
    operation_id = "updateProfile",
    summary = "Update the caller's name and/or password",
    description = "Both fields are optional; absent or empty fields are left unchanged. \
        A new password is hashed before storage.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_update_profile(&payload)?;

    let user = find_user(&state.db, auth_user.user_id).await?;
    let mut active: user::ActiveModel = user.into();

    if let Some(name) = payload.name() {
        active.name = Set(name.to_string());
    }
    if let Some(password) = payload.password() {
        let hash = hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
        active.password = Set(hash);
    }
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(Json(MessageResponse::new("Profile updated")))
}

#[utoipa::path(
    get,
    path = "/body-profile",
    tag = "User",
    operation_id = "getBodyProfile",
    summary = "Get the caller's body measurements",
    responses(
        (status = 200, description = "Body profile", body = BodyProfileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No body profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_body_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BodyProfileResponse>, AppError> {
    let profile = find_body_profile(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Body profile not found".into()))?;

    Ok(Json(BodyProfileResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/body-profile",
    tag = "User",
    operation_id = "updateBodyProfile",
    summary = "Create or update the caller's body measurements",
    description = "Only the supplied fields change. The profile is created on first use.",
    request_body = UpdateBodyProfileRequest,
    responses(
        (status = 200, description = "Body profile saved", body = BodyProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_body_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateBodyProfileRequest>,
) -> Result<Json<BodyProfileResponse>, AppError> {
    validate_update_body_profile(&payload)?;

    let txn = state.db.begin().await?;
    find_user(&txn, auth_user.user_id).await?;

    let now = Utc::now();
    let saved = match find_body_profile(&txn, auth_user.user_id).await? {
        Some(existing) => {
            let mut active: user_profile::ActiveModel = existing.into();
            if let Some(height) = payload.height {
                active.height = Set(Some(height));
            }
            if let Some(weight) = payload.weight {
                active.weight = Set(Some(weight));
            }
            if let Some(body_type) = payload.body_type {
                active.body_type = Set(Some(body_type.trim().to_string()));
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let new_profile = user_profile::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(auth_user.user_id),
                height: Set(payload.height),
                weight: Set(payload.weight),
                body_type: Set(payload.body_type.map(|b| b.trim().to_string())),
                created_at: Set(now),
                updated_at: Set(now),
                deleted: Set(false),
                deleted_at: Set(None),
            };
            new_profile.insert(&txn).await?
        }
    };

    txn.commit().await?;

    Ok(Json(BodyProfileResponse::from(saved)))
}

async fn find_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_live()
        .filter(user::Column::Id.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// The first live profile of the user. The schema does not enforce one per user.
async fn find_body_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<user_profile::Model>, AppError> {
    Ok(user_profile::Entity::find_live()
        .filter(user_profile::Column::UserId.eq(user_id))
        .order_by_asc(user_profile::Column::CreatedAt)
        .one(db)
        .await?)
}
