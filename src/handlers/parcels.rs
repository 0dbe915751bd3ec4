use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::Parcel,
    services::parcels::{
        CreateParcelRequest, DeleteParcelsRequest, DeleteParcelsResponse, ListParcelsQuery,
        ParcelListRow, UpdateDeliveryStatusRequest, UpdateParcelRequest,
    },
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
}

pub async fn create_parcel(
    State(state): State<AppState>,
    Json(request): Json<CreateParcelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Parcel>>), ServiceError> {
    let parcel = state.parcel_service().create_parcel(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(parcel).with_message("Successfully added new parcel")),
    ))
}

pub async fn list_parcels(
    State(state): State<AppState>,
    Query(query): Query<ListParcelsQuery>,
) -> Result<Json<ApiResponse<Vec<ParcelListRow>>>, ServiceError> {
    let rows = state.parcel_service().list_parcels(query).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn search_parcels(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Parcel>>>, ServiceError> {
    let needle = query.query.unwrap_or_default();
    let parcels = state.parcel_service().search_parcels(&needle).await?;
    Ok(Json(
        ApiResponse::success(parcels).with_message(format!("Search results for '{}'", needle)),
    ))
}

pub async fn get_parcel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Parcel>>, ServiceError> {
    let parcel = state.parcel_service().get_parcel(id).await?;
    Ok(Json(ApiResponse::success(parcel)))
}

pub async fn update_parcel_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateParcelRequest>,
) -> Result<Json<ApiResponse<Parcel>>, ServiceError> {
    let parcel = state
        .parcel_service()
        .update_parcel_details(id, request)
        .await?;
    Ok(Json(
        ApiResponse::success(parcel).with_message("Parcel details updated successfully"),
    ))
}

pub async fn update_delivery_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryStatusRequest>,
) -> Result<Json<ApiResponse<Parcel>>, ServiceError> {
    let parcel = state
        .parcel_service()
        .update_delivery_status(id, request)
        .await?;
    Ok(Json(
        ApiResponse::success(parcel).with_message("Parcel delivery status updated successfully"),
    ))
}

pub async fn delete_parcels(
    State(state): State<AppState>,
    Json(request): Json<DeleteParcelsRequest>,
) -> Result<Json<ApiResponse<DeleteParcelsResponse>>, ServiceError> {
    let deleted = state.parcel_service().delete_parcels(request).await?;
    let message = format!(
        "{} parcel(s) successfully deleted, and their IDs removed from associated delivery batches.",
        deleted.deleted_count
    );
    Ok(Json(ApiResponse::success(deleted).with_message(message)))
}
