use std::io;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::{Json, body::Body};
use chrono::Utc;
use common::TryOnStatus;
use common::storage::{StorageError, photo_file_name};
use futures::TryStreamExt;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::*;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{product, try_on};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::shared::MessageResponse;
use crate::models::try_on::{
    ImageKind, ProcessTryOnRequest, ProcessTryOnResponse, TryOnDetailResponse,
    TryOnHistoryResponse, TryOnResponse, UploadPhotoResponse,
};
use crate::state::AppState;

/// Multipart framing allowance on top of the photo itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn upload_body_limit(max_photo_size: u64) -> DefaultBodyLimit {
    let limit = max_photo_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Try-On",
    operation_id = "uploadPhoto",
    summary = "Upload a photo and start a try-on",
    description = "Stores the `photo` multipart field (other fields are ignored) as \
        `<user_id>_<uuid><ext>` and creates a `pending` try-on for it. When a content type is \
        sent with the field it must be `image/*`.",
    request_body(content_type = "multipart/form-data", description = "Photo upload"),
    responses(
        (status = 200, description = "Photo stored, try-on created", body = UploadPhotoResponse),
        (status = 400, description = "Missing, empty, oversized or non-image photo (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id, try_on_id))]
pub async fn upload_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadPhotoResponse>, AppError> {
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        if let Some(content_type) = field.content_type()
            && !content_type.starts_with("image/")
        {
            return Err(AppError::Validation(format!(
                "Photo must be an image, got '{content_type}'"
            )));
        }

        let file_name = photo_file_name(auth_user.user_id, field.file_name());
        let mut reader = StreamReader::new(
            field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        );
        let photo = state
            .photo_store
            .put_stream(&file_name, &mut reader)
            .await
            .map_err(upload_error)?;

        if photo.size == 0 {
            discard_photo(&state, &photo.path).await;
            return Err(AppError::Validation("Photo must not be empty".into()));
        }

        stored = Some(photo);
        break;
    }

    let stored = stored.ok_or_else(|| AppError::Validation("Missing 'photo' field".into()))?;

    let now = Utc::now();
    let id = Uuid::new_v4();
    let new_try_on = try_on::ActiveModel {
        id: Set(id),
        user_id: Set(auth_user.user_id),
        product_id: Set(None),
        original_image: Set(stored.path.clone()),
        result_image: Set(None),
        status: Set(TryOnStatus::Pending),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        deleted: Set(false),
        deleted_at: Set(None),
    };
    if let Err(e) = new_try_on.insert(&state.db).await {
        discard_photo(&state, &stored.path).await;
        return Err(e.into());
    }

    tracing::Span::current().record("try_on_id", tracing::field::display(id));
    tracing::info!(size = stored.size, "Photo uploaded");

    Ok(Json(UploadPhotoResponse {
        message: "Photo uploaded successfully".into(),
        try_on_id: id,
    }))
}

#[utoipa::path(
    post,
    path = "/process",
    tag = "Try-On",
    operation_id = "processTryOn",
    summary = "Start processing a try-on with a product",
    description = "Moves the caller's try-on to `processing` before responding, then completes it \
        in the background after a fixed delay. Poll the try-on or the history to observe \
        `completed`. Re-issuing the request restarts processing; only the latest request's job \
        completes the record.",
    request_body = ProcessTryOnRequest,
    responses(
        (status = 200, description = "Processing started", body = ProcessTryOnResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Try-on or product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(user_id = %auth_user.user_id, try_on_id = %payload.try_on_id, product_id = %payload.product_id)
)]
pub async fn process_try_on(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProcessTryOnRequest>,
) -> Result<Json<ProcessTryOnResponse>, AppError> {
    let txn = state.db.begin().await?;

    let record = try_on::Entity::find_owned(payload.try_on_id, auth_user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Try-on not found".into()))?;

    product::Entity::find_live()
        .filter(product::Column::Id.eq(payload.product_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let version = record.version + 1;
    let mut active: try_on::ActiveModel = record.into();
    active.product_id = Set(Some(payload.product_id));
    active.status = Set(TryOnStatus::Processing);
    active.result_image = Set(None);
    active.version = Set(version);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;

    state.processor.schedule(payload.try_on_id, version);

    Ok(Json(ProcessTryOnResponse {
        message: "Try-on processing started".into(),
        try_on_id: payload.try_on_id,
    }))
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "Try-On",
    operation_id = "getTryOnHistory",
    summary = "List the caller's try-ons, newest first",
    description = "Deleted try-ons are not included.",
    responses(
        (status = 200, description = "Try-on history", body = TryOnHistoryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TryOnHistoryResponse>, AppError> {
    let try_ons = try_on::Entity::find_live()
        .filter(try_on::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(try_on::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(TryOnResponse::from)
        .collect();

    Ok(Json(TryOnHistoryResponse { try_ons }))
}

#[utoipa::path(
    delete,
    path = "/history/{id}",
    tag = "Try-On",
    operation_id = "deleteTryOn",
    summary = "Delete a try-on from the caller's history",
    description = "Soft-deletes the record; it disappears from every read. The stored photos are kept.",
    params(("id" = Uuid, Path, description = "Try-on ID")),
    responses(
        (status = 200, description = "Try-on deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Try-on not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, try_on_id = %id))]
pub async fn delete_try_on(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let now = Utc::now();
    let result = try_on::Entity::update_many()
        .col_expr(try_on::Column::Deleted, Expr::value(true))
        .col_expr(try_on::Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(try_on::Column::UpdatedAt, Expr::value(now))
        .filter(try_on::Column::Id.eq(id))
        .filter(try_on::Column::UserId.eq(auth_user.user_id))
        .filter(try_on::Column::Deleted.eq(false))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Try-on not found".into()));
    }

    Ok(Json(MessageResponse::new("Try-on deleted")))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Try-On",
    operation_id = "getTryOn",
    summary = "Get one of the caller's try-ons",
    params(("id" = Uuid, Path, description = "Try-on ID")),
    responses(
        (status = 200, description = "Try-on", body = TryOnDetailResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Try-on not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, try_on_id = %id))]
pub async fn get_try_on(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TryOnDetailResponse>, AppError> {
    let record = find_owned(&state.db, id, auth_user.user_id).await?;

    Ok(Json(TryOnDetailResponse {
        try_on: TryOnResponse::from(record),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/image/{kind}",
    tag = "Try-On",
    operation_id = "getTryOnImage",
    summary = "Download the original or result image of a try-on",
    params(
        ("id" = Uuid, Path, description = "Try-on ID"),
        ("kind" = ImageKind, Path, description = "`original` or `result`"),
    ),
    responses(
        (status = 200, description = "Image content"),
        (status = 400, description = "Malformed ID or kind (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Try-on or image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, try_on_id = %id))]
pub async fn get_try_on_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((id, kind)): AppPath<(Uuid, ImageKind)>,
) -> Result<Response, AppError> {
    let record = find_owned(&state.db, id, auth_user.user_id).await?;

    let path = match kind {
        ImageKind::Original => record.original_image,
        ImageKind::Result => record
            .result_image
            .ok_or_else(|| AppError::NotFound("Result image not available yet".into()))?,
    };

    let size = state.photo_store.size(&path).await?;
    let reader = state.photo_store.open(&path).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<try_on::Model, AppError> {
    try_on::Entity::find_owned(id, user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Try-on not found".into()))
}

/// Multipart read failures are the client's fault; everything else is ours.
fn upload_error(err: StorageError) -> AppError {
    match err {
        StorageError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
            AppError::Validation(format!("Upload read error: {e}"))
        }
        other => other.into(),
    }
}

/// Best-effort removal of a photo that no try-on will reference.
async fn discard_photo(state: &AppState, path: &str) {
    if let Err(e) = state.photo_store.delete(path).await {
        tracing::warn!(path, error = %e, "Failed to remove orphaned photo");
    }
}
