use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    services::batches::{
        BatchSummary, CreateBatchRequest, CreateBatchResponse, DeleteBatchResponse,
    },
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct BatchListQuery {
    pub status: Option<String>,
}

pub async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<CreateBatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateBatchResponse>>), ServiceError> {
    let created = state.batch_service().create_batch(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::created(created)
                .with_message("Delivery batch created and parcels updated successfully"),
        ),
    ))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<crate::services::batches::BatchDetail>>, ServiceError> {
    let batch = state.batch_service().get_batch(id).await?;
    Ok(Json(
        ApiResponse::success(batch).with_message("Delivery batch retrieved successfully"),
    ))
}

pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> Result<Json<ApiResponse<Vec<BatchSummary>>>, ServiceError> {
    let batches = state.batch_service().list_batches(query.status).await?;
    Ok(Json(ApiResponse::success(batches)))
}

pub async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteBatchResponse>>, ServiceError> {
    let deleted = state.batch_service().delete_batch(id).await?;
    Ok(Json(ApiResponse::success(deleted).with_message(
        "Delivery batch deleted successfully, and associated parcels reverted to pending.",
    )))
}
