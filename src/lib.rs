//! Parcel tracking API library
//!
//! Tracks parcels from intake through delivery outcome, groups them into
//! dispatch batches, and produces time-windowed sales reports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared application state for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    pub fn parcel_service(&self) -> Arc<services::ParcelService> {
        self.services.parcels.clone()
    }

    pub fn batch_service(&self) -> Arc<services::BatchService> {
        self.services.batches.clone()
    }

    pub fn report_service(&self) -> Arc<services::ReportService> {
        self.services.reports.clone()
    }
}

/// Success envelope: `{code, status: "success", message?, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            status: "success".to_string(),
            message: None,
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            code: 201,
            status: "success".to_string(),
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Full route table. Paths match the wire contract of the original service.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Parcel lifecycle
        .route("/parcel", post(handlers::parcels::create_parcel))
        .route("/parcels/range", get(handlers::parcels::list_parcels))
        .route("/parcels/search", get(handlers::parcels::search_parcels))
        .route("/parcels", delete(handlers::parcels::delete_parcels))
        .route("/parcel/:id", get(handlers::parcels::get_parcel))
        .route("/parcel/:id", patch(handlers::parcels::update_parcel_details))
        .route(
            "/parcel/status/:id",
            patch(handlers::parcels::update_delivery_status),
        )
        // Batch orchestration
        .route("/parcel-batch", post(handlers::batches::create_batch))
        .route("/parcel-batch", get(handlers::batches::list_batches))
        .route("/parcel-batch/:id", get(handlers::batches::get_batch))
        .route("/parcel-batch/:id", delete(handlers::batches::delete_batch))
        // Reporting
        .route("/sales-report", get(handlers::reports::sales_report))
        .route("/delivery-report", get(handlers::reports::delivery_report))
        .with_state(state)
}
