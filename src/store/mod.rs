//! Abstract document store for parcels and batches.
//!
//! The service layer talks to these traits only. No cross-document
//! transaction is assumed: multi-document operations in the orchestrator are
//! sequences of independent writes. The one atomicity guarantee a backend
//! must provide is the per-parcel conditional claim in
//! [`ParcelStore::assign_pending_to_batch`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{BatchStatus, DeliveryBatch, DeliveryStatus, Parcel};

pub use memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Filter for windowed parcel listings.
#[derive(Debug, Default, Clone)]
pub struct ParcelFilter {
    pub delivery_status: Option<DeliveryStatus>,
    /// Inclusive `created_at` window.
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

#[async_trait]
pub trait ParcelStore: Send + Sync {
    async fn insert_parcel(&self, parcel: Parcel) -> Result<Parcel, StoreError>;

    async fn find_parcel(&self, id: Uuid) -> Result<Option<Parcel>, StoreError>;

    /// Resolves ids to parcel records, preserving the order of `ids` and
    /// silently dropping ids that no longer exist (dangling membership
    /// entries are possible, see the weak back-reference note on
    /// [`Parcel::batch_id`]).
    async fn find_parcels(&self, ids: &[Uuid]) -> Result<Vec<Parcel>, StoreError>;

    /// Full-record replace keyed on `parcel.id`. Returns false if the parcel
    /// no longer exists.
    async fn put_parcel(&self, parcel: Parcel) -> Result<bool, StoreError>;

    /// Conditionally claims each listed parcel for a batch: only parcels
    /// currently `Pending` are moved to `OnDelivery` with `batch_id` set.
    /// Per parcel this check-and-set is atomic, so two racing batches can
    /// never both claim the same parcel. Returns the number actually moved.
    async fn assign_pending_to_batch(
        &self,
        ids: &[Uuid],
        batch_id: Uuid,
    ) -> Result<u64, StoreError>;

    /// Reverts the listed parcels to `Pending` with `batch_id` cleared,
    /// regardless of their current status. Returns the number reverted.
    async fn revert_to_pending(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn delete_parcels(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    /// Windowed listing sorted by customer name ascending.
    async fn list_parcels(&self, filter: ParcelFilter) -> Result<Vec<Parcel>, StoreError>;

    /// Case-insensitive substring match on customer name, newest first then
    /// name ascending.
    async fn search_parcels_by_customer(&self, query: &str) -> Result<Vec<Parcel>, StoreError>;

    /// Success parcels with `updated_at` in the half-open window
    /// `[start, end)`. Feeds the per-seller sales aggregation.
    async fn find_success_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Parcel>, StoreError>;

    /// Count of parcels with `updated_at` in the inclusive window
    /// `[start, end]`, optionally restricted to one status. The inclusive
    /// end bound intentionally differs from the aggregation window above.
    async fn count_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<DeliveryStatus>,
    ) -> Result<u64, StoreError>;

    /// Count of a batch's members currently in the given status, going by
    /// the parcels' live `batch_id` back-reference.
    async fn count_by_batch_and_status(
        &self,
        batch_id: Uuid,
        status: DeliveryStatus,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn insert_batch(&self, batch: DeliveryBatch) -> Result<DeliveryBatch, StoreError>;

    async fn find_batch(&self, id: Uuid) -> Result<Option<DeliveryBatch>, StoreError>;

    /// All batches (optionally filtered by status), sorted by `created_at`
    /// descending then `updated_at` descending.
    async fn list_batches(
        &self,
        status: Option<BatchStatus>,
    ) -> Result<Vec<DeliveryBatch>, StoreError>;

    /// Batches whose `created_at` falls in the half-open window
    /// `[start, end)`, in the store's natural order.
    async fn find_batches_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeliveryBatch>, StoreError>;

    /// Returns false if the batch did not exist.
    async fn delete_batch(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Removes the given parcel ids from every batch's membership list.
    /// Cascade step of parcel deletion. Returns the number of batches
    /// touched.
    async fn pull_members(&self, parcel_ids: &[Uuid]) -> Result<u64, StoreError>;
}
