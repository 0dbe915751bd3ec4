use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::{
    errors::ServiceError,
    services::reports::{BatchDeliveryRow, ReportQuery, SalesReport},
    ApiResponse, AppState,
};

pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<SalesReport>>, ServiceError> {
    let report = state.report_service().sales_report(query).await?;
    let message = format!(
        "Sales report generated successfully for the period from {} to {}.",
        report.period_start, report.period_end
    );
    Ok(Json(ApiResponse::success(report).with_message(message)))
}

pub async fn delivery_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<BatchDeliveryRow>>>, ServiceError> {
    let rows = state.report_service().delivery_report(query).await?;
    Ok(Json(ApiResponse::success(rows).with_message(
        "Successfully retrieved delivery batches with parcel counts.",
    )))
}
