//! In-process store used by the binary and the test suites.
//!
//! Parcels live in a map keyed by id; batches keep insertion order in a Vec
//! so "natural order" reads mean creation order. Each trait method takes the
//! relevant lock once, which is what makes the conditional claim in
//! `assign_pending_to_batch` atomic per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::cmp::Reverse;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{BatchStatus, DeliveryBatch, DeliveryStatus, Parcel};

use super::{BatchStore, ParcelFilter, ParcelStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    parcels: RwLock<HashMap<Uuid, Parcel>>,
    batches: RwLock<Vec<DeliveryBatch>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParcelStore for InMemoryStore {
    async fn insert_parcel(&self, parcel: Parcel) -> Result<Parcel, StoreError> {
        let mut parcels = self.parcels.write().await;
        parcels.insert(parcel.id, parcel.clone());
        Ok(parcel)
    }

    async fn find_parcel(&self, id: Uuid) -> Result<Option<Parcel>, StoreError> {
        let parcels = self.parcels.read().await;
        Ok(parcels.get(&id).cloned())
    }

    async fn find_parcels(&self, ids: &[Uuid]) -> Result<Vec<Parcel>, StoreError> {
        let parcels = self.parcels.read().await;
        Ok(ids.iter().filter_map(|id| parcels.get(id).cloned()).collect())
    }

    async fn put_parcel(&self, parcel: Parcel) -> Result<bool, StoreError> {
        let mut parcels = self.parcels.write().await;
        match parcels.get_mut(&parcel.id) {
            Some(slot) => {
                *slot = parcel;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn assign_pending_to_batch(
        &self,
        ids: &[Uuid],
        batch_id: Uuid,
    ) -> Result<u64, StoreError> {
        let mut parcels = self.parcels.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(parcel) = parcels.get_mut(id) {
                if parcel.delivery_status == DeliveryStatus::Pending {
                    parcel.delivery_status = DeliveryStatus::OnDelivery;
                    parcel.batch_id = Some(batch_id);
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }

    async fn revert_to_pending(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut parcels = self.parcels.write().await;
        let mut reverted = 0;
        for id in ids {
            if let Some(parcel) = parcels.get_mut(id) {
                parcel.delivery_status = DeliveryStatus::Pending;
                parcel.batch_id = None;
                reverted += 1;
            }
        }
        Ok(reverted)
    }

    async fn delete_parcels(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut parcels = self.parcels.write().await;
        let mut deleted = 0;
        for id in ids {
            if parcels.remove(id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn list_parcels(&self, filter: ParcelFilter) -> Result<Vec<Parcel>, StoreError> {
        let parcels = self.parcels.read().await;
        let mut matched: Vec<Parcel> = parcels
            .values()
            .filter(|p| {
                filter
                    .delivery_status
                    .map_or(true, |status| p.delivery_status == status)
            })
            .filter(|p| {
                filter
                    .created_between
                    .map_or(true, |(start, end)| p.created_at >= start && p.created_at <= end)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase())
        });
        Ok(matched)
    }

    async fn search_parcels_by_customer(&self, query: &str) -> Result<Vec<Parcel>, StoreError> {
        let needle = query.to_lowercase();
        let parcels = self.parcels.read().await;
        let mut matched: Vec<Parcel> = parcels
            .values()
            .filter(|p| p.customer_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.customer_name.to_lowercase().cmp(&b.customer_name.to_lowercase()))
        });
        Ok(matched)
    }

    async fn find_success_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Parcel>, StoreError> {
        let parcels = self.parcels.read().await;
        Ok(parcels
            .values()
            .filter(|p| p.delivery_status == DeliveryStatus::Success)
            .filter(|p| {
                p.updated_at
                    .map_or(false, |at| at >= start && at < end)
            })
            .cloned()
            .collect())
    }

    async fn count_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<DeliveryStatus>,
    ) -> Result<u64, StoreError> {
        let parcels = self.parcels.read().await;
        Ok(parcels
            .values()
            .filter(|p| status.map_or(true, |s| p.delivery_status == s))
            .filter(|p| {
                p.updated_at
                    .map_or(false, |at| at >= start && at <= end)
            })
            .count() as u64)
    }

    async fn count_by_batch_and_status(
        &self,
        batch_id: Uuid,
        status: DeliveryStatus,
    ) -> Result<u64, StoreError> {
        let parcels = self.parcels.read().await;
        Ok(parcels
            .values()
            .filter(|p| p.batch_id == Some(batch_id) && p.delivery_status == status)
            .count() as u64)
    }
}

#[async_trait]
impl BatchStore for InMemoryStore {
    async fn insert_batch(&self, batch: DeliveryBatch) -> Result<DeliveryBatch, StoreError> {
        let mut batches = self.batches.write().await;
        batches.push(batch.clone());
        Ok(batch)
    }

    async fn find_batch(&self, id: Uuid) -> Result<Option<DeliveryBatch>, StoreError> {
        let batches = self.batches.read().await;
        Ok(batches.iter().find(|b| b.id == id).cloned())
    }

    async fn list_batches(
        &self,
        status: Option<BatchStatus>,
    ) -> Result<Vec<DeliveryBatch>, StoreError> {
        let batches = self.batches.read().await;
        let mut matched: Vec<DeliveryBatch> = batches
            .iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        matched.sort_by_key(|b| (Reverse(b.created_at), Reverse(b.updated_at)));
        Ok(matched)
    }

    async fn find_batches_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DeliveryBatch>, StoreError> {
        let batches = self.batches.read().await;
        Ok(batches
            .iter()
            .filter(|b| b.created_at >= start && b.created_at < end)
            .cloned()
            .collect())
    }

    async fn delete_batch(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut batches = self.batches.write().await;
        let before = batches.len();
        batches.retain(|b| b.id != id);
        Ok(batches.len() < before)
    }

    async fn pull_members(&self, parcel_ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut batches = self.batches.write().await;
        let mut touched = 0;
        for batch in batches.iter_mut() {
            let before = batch.parcels.len();
            batch.parcels.retain(|id| !parcel_ids.contains(id));
            if batch.parcels.len() < before {
                touched += 1;
            }
        }
        Ok(touched)
    }
}
