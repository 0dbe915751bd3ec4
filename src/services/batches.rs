use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{BatchStatus, DeliveryBatch, DeliveryType, Parcel},
    store::{BatchStore, ParcelStore},
};

/// Request/response types for the batching orchestrator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub parcel_ids: Vec<Uuid>,
    /// Raw string so an out-of-enum value yields a validation error with
    /// the allowed values instead of a deserialization failure.
    pub delivery_type: Option<String>,
    pub batch_created_at: Option<DateTime<Utc>>,
}

/// A batch with its membership resolved to full parcel records.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetail {
    pub id: Uuid,
    pub batch_name: String,
    pub delivery_type: Option<DeliveryType>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub parcels: Vec<Parcel>,
    pub total_parcels: usize,
}

impl BatchDetail {
    fn new(batch: DeliveryBatch, parcels: Vec<Parcel>) -> Self {
        Self {
            id: batch.id,
            batch_name: batch.batch_name,
            delivery_type: batch.delivery_type,
            status: batch.status,
            created_at: batch.created_at,
            updated_at: batch.updated_at,
            total_parcels: parcels.len(),
            parcels,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponse {
    pub batch: BatchDetail,
    /// Number of parcels actually transitioned to OnDelivery. A value below
    /// `requested_parcel_count` means some ids were skipped (not Pending, or
    /// unknown) and is a normal outcome, not an error.
    pub updated_parcel_count: u64,
    pub requested_parcel_count: usize,
}

/// Listing row: batch record annotated with its live member count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    #[serde(flatten)]
    pub batch: DeliveryBatch,
    pub parcel_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBatchResponse {
    pub batch_id: Uuid,
    pub reverted_parcel_count: u64,
}

/// Orchestrates the parcel/batch lifecycle: batch creation claims pending
/// parcels, batch deletion reverts them. These are the only two paths that
/// move a parcel into or out of `OnDelivery` via a batch, and each is a
/// two-step write sequence with no cross-document transaction (see the
/// store module docs).
#[derive(Clone)]
pub struct BatchService {
    parcels: Arc<dyn ParcelStore>,
    batches: Arc<dyn BatchStore>,
    event_sender: Option<Arc<EventSender>>,
    /// Civil timezone used for the human-readable clock label in batch names.
    civil_offset: FixedOffset,
}

impl BatchService {
    pub fn new(
        parcels: Arc<dyn ParcelStore>,
        batches: Arc<dyn BatchStore>,
        event_sender: Option<Arc<EventSender>>,
        civil_offset: FixedOffset,
    ) -> Self {
        Self {
            parcels,
            batches,
            event_sender,
            civil_offset,
        }
    }

    /// 12-hour clock label, e.g. `2:05 PM`; midnight renders as `12:00 AM`.
    fn clock_label(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.civil_offset);
        let (is_pm, hour) = local.hour12();
        format!(
            "{}:{:02} {}",
            hour,
            local.minute(),
            if is_pm { "PM" } else { "AM" }
        )
    }

    /// Creates a batch from a set of parcel ids and claims every parcel in
    /// the set that is still `Pending`.
    ///
    /// The batch is persisted with the full requested membership before the
    /// parcels are updated. If the second step partially applies, the batch
    /// still lists the unclaimed ids; callers detect this through
    /// `updated_parcel_count`.
    #[instrument(skip(self, request), fields(requested = request.parcel_ids.len()))]
    pub async fn create_batch(
        &self,
        request: CreateBatchRequest,
    ) -> Result<CreateBatchResponse, ServiceError> {
        if request.parcel_ids.is_empty() {
            return Err(ServiceError::invalid_input(
                "Please provide a non-empty array of parcel IDs to create a batch.",
            ));
        }

        let delivery_type = match request.delivery_type.as_deref() {
            Some(raw) => Some(raw.parse::<DeliveryType>().map_err(|_| {
                ServiceError::invalid_enum("Invalid deliveryType.", DeliveryType::ALLOWED_VALUES)
            })?),
            None => None,
        };

        let created_at = request.batch_created_at.unwrap_or_else(Utc::now);
        let label = self.clock_label(created_at);
        let batch_name = match delivery_type {
            Some(dt) => format!("{} {}", dt, label),
            None => format!("Batch {}", label),
        };

        let batch = self
            .batches
            .insert_batch(DeliveryBatch {
                id: Uuid::new_v4(),
                batch_name,
                delivery_type,
                parcels: request.parcel_ids.clone(),
                status: BatchStatus::OnDeliver,
                created_at,
                updated_at: None,
            })
            .await?;

        let updated = self
            .parcels
            .assign_pending_to_batch(&request.parcel_ids, batch.id)
            .await?;

        if updated as usize != request.parcel_ids.len() {
            warn!(
                batch_id = %batch.id,
                requested = request.parcel_ids.len(),
                updated,
                "Some parcels were not claimed; they were not in Pending status or the IDs were unknown"
            );
        }

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::BatchCreated {
                    batch_id: batch.id,
                    requested: request.parcel_ids.len(),
                    updated,
                })
                .await;
        }

        let resolved = self.parcels.find_parcels(&request.parcel_ids).await?;
        let requested_parcel_count = request.parcel_ids.len();
        Ok(CreateBatchResponse {
            batch: BatchDetail::new(batch, resolved),
            updated_parcel_count: updated,
            requested_parcel_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_batch(&self, id: Uuid) -> Result<BatchDetail, ServiceError> {
        let batch = self
            .batches
            .find_batch(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Delivery batch not found with ID: {}", id)))?;
        let parcels = self.parcels.find_parcels(&batch.parcels).await?;
        Ok(BatchDetail::new(batch, parcels))
    }

    /// Lists batches newest first (created, then updated), optionally
    /// filtered by status.
    #[instrument(skip(self))]
    pub async fn list_batches(
        &self,
        status_filter: Option<String>,
    ) -> Result<Vec<BatchSummary>, ServiceError> {
        let status = match status_filter.as_deref() {
            Some(raw) => Some(raw.parse::<BatchStatus>().map_err(|_| {
                ServiceError::invalid_enum(
                    "Invalid batch status filter.",
                    BatchStatus::ALLOWED_VALUES,
                )
            })?),
            None => None,
        };

        let batches = self.batches.list_batches(status).await?;
        Ok(batches
            .into_iter()
            .map(|batch| BatchSummary {
                parcel_count: batch.parcels.len(),
                batch,
            })
            .collect())
    }

    /// Deletes a batch and reverts every member parcel to `Pending` with a
    /// cleared back-reference, regardless of the parcel's current status.
    /// This is the accepted inverse of `create_batch`'s assignment effect.
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, id: Uuid) -> Result<DeleteBatchResponse, ServiceError> {
        let batch = self
            .batches
            .find_batch(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Delivery batch not found with ID: {}", id)))?;

        let reverted = self.parcels.revert_to_pending(&batch.parcels).await?;
        self.batches.delete_batch(id).await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::BatchDeleted {
                    batch_id: id,
                    reverted,
                })
                .await;
        }

        Ok(DeleteBatchResponse {
            batch_id: id,
            reverted_parcel_count: reverted,
        })
    }
}
