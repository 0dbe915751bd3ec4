use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{DeliveryStatus, Parcel, PaymentStatus},
    store::{BatchStore, ParcelFilter, ParcelStore},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelRequest {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "seller is required"))]
    pub seller: String,
    pub price: Decimal,
    pub delivery_fee: Decimal,
    /// Raw string, validated against the payment enum with allowed values
    /// reported on failure.
    pub payment_status: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParcelsQuery {
    pub delivery_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Listing row with the owning batch's creation time denormalized through
/// the weak back-reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelListRow {
    pub id: Uuid,
    pub customer_name: String,
    pub seller: String,
    pub price: Decimal,
    pub delivery_fee: Decimal,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub batch_created_at: Option<DateTime<Utc>>,
}

/// Detail patch. Identity, attribution and lifecycle fields (`created_at`,
/// `batch_id`, `seller`, `delivery_status`) are deliberately absent; they
/// are not patchable through this path.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelRequest {
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub price: Option<Decimal>,
    pub delivery_fee: Option<Decimal>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryStatusRequest {
    pub delivery_status: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParcelsRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParcelsResponse {
    pub deleted_count: u64,
}

/// Parcel intake and lifecycle service.
///
/// The delivery-status transition rules live here: nothing in the data
/// model stops an arbitrary status write, so this service is the explicit
/// guard. `OnDelivery` is only reachable through batch assignment (see
/// `BatchService`), terminal outcomes only from `OnDelivery`, and `Pending`
/// only as an explicit override that also clears the batch back-reference.
#[derive(Clone)]
pub struct ParcelService {
    parcels: Arc<dyn ParcelStore>,
    batches: Arc<dyn BatchStore>,
    event_sender: Option<Arc<EventSender>>,
}

impl ParcelService {
    pub fn new(
        parcels: Arc<dyn ParcelStore>,
        batches: Arc<dyn BatchStore>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            parcels,
            batches,
            event_sender,
        }
    }

    fn require_non_negative(value: Decimal, field: &str) -> Result<(), ServiceError> {
        if value < Decimal::ZERO {
            return Err(ServiceError::invalid_input(format!(
                "{} must be a non-negative number",
                field
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(customer = %request.customer_name))]
    pub async fn create_parcel(&self, request: CreateParcelRequest) -> Result<Parcel, ServiceError> {
        request.validate()?;
        Self::require_non_negative(request.price, "Price")?;
        Self::require_non_negative(request.delivery_fee, "Delivery fee")?;
        let payment_status = PaymentStatus::from_str(&request.payment_status).map_err(|_| {
            ServiceError::invalid_enum("Invalid paymentStatus.", PaymentStatus::ALLOWED_VALUES)
        })?;

        let parcel = self
            .parcels
            .insert_parcel(Parcel {
                id: Uuid::new_v4(),
                customer_name: request.customer_name,
                address: request.address,
                seller: request.seller,
                price: request.price,
                delivery_fee: request.delivery_fee,
                payment_status,
                delivery_status: DeliveryStatus::Pending,
                batch_id: None,
                created_at: Utc::now(),
                updated_at: None,
            })
            .await?;

        if let Some(sender) = &self.event_sender {
            sender.send(Event::ParcelCreated(parcel.id)).await;
        }
        Ok(parcel)
    }

    #[instrument(skip(self))]
    pub async fn get_parcel(&self, id: Uuid) -> Result<Parcel, ServiceError> {
        self.parcels
            .find_parcel(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Parcel not found."))
    }

    /// Windowed listing (UTC day bounds, inclusive) sorted by customer name,
    /// with the owning batch's creation time attached where assigned.
    #[instrument(skip(self, query))]
    pub async fn list_parcels(
        &self,
        query: ListParcelsQuery,
    ) -> Result<Vec<ParcelListRow>, ServiceError> {
        let delivery_status = match query.delivery_status.as_deref() {
            Some(raw) => Some(DeliveryStatus::from_str(raw).map_err(|_| {
                ServiceError::invalid_enum(
                    "Invalid deliveryStatus filter.",
                    DeliveryStatus::ALLOWED_VALUES,
                )
            })?),
            None => None,
        };

        let created_between = match (query.start_date.as_deref(), query.end_date.as_deref()) {
            (Some(start), Some(end)) => {
                let start = utc_day_start(start)?;
                let end = utc_day_end(end)?;
                if start > end {
                    return Err(ServiceError::invalid_input(
                        "startDate must be before or equal to endDate.",
                    ));
                }
                Some((start, end))
            }
            (None, None) => None,
            _ => {
                return Err(ServiceError::invalid_input(
                    "Both startDate and endDate are required when filtering by date.",
                ))
            }
        };

        let parcels = self
            .parcels
            .list_parcels(ParcelFilter {
                delivery_status,
                created_between,
            })
            .await?;

        let mut rows = Vec::with_capacity(parcels.len());
        for parcel in parcels {
            let batch_created_at = match parcel.batch_id {
                Some(batch_id) => self
                    .batches
                    .find_batch(batch_id)
                    .await?
                    .map(|b| b.created_at),
                None => None,
            };
            rows.push(ParcelListRow {
                id: parcel.id,
                customer_name: parcel.customer_name,
                seller: parcel.seller,
                price: parcel.price,
                delivery_fee: parcel.delivery_fee,
                delivery_status: parcel.delivery_status,
                created_at: parcel.created_at,
                updated_at: parcel.updated_at,
                batch_created_at,
            });
        }
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn search_parcels(&self, query: &str) -> Result<Vec<Parcel>, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::invalid_input(
                "Query parameter 'query' is required",
            ));
        }
        Ok(self.parcels.search_parcels_by_customer(query).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_parcel_details(
        &self,
        id: Uuid,
        request: UpdateParcelRequest,
    ) -> Result<Parcel, ServiceError> {
        let mut parcel = self
            .parcels
            .find_parcel(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Parcel not found with ID: {}", id)))?;

        if let Some(customer_name) = request.customer_name {
            parcel.customer_name = customer_name;
        }
        if let Some(address) = request.address {
            parcel.address = address;
        }
        if let Some(price) = request.price {
            Self::require_non_negative(price, "Price")?;
            parcel.price = price;
        }
        if let Some(delivery_fee) = request.delivery_fee {
            Self::require_non_negative(delivery_fee, "Delivery fee")?;
            parcel.delivery_fee = delivery_fee;
        }
        if let Some(raw) = request.payment_status {
            parcel.payment_status = PaymentStatus::from_str(&raw).map_err(|_| {
                ServiceError::invalid_enum("Invalid paymentStatus.", PaymentStatus::ALLOWED_VALUES)
            })?;
        }

        self.parcels.put_parcel(parcel.clone()).await?;
        Ok(parcel)
    }

    /// Guarded delivery-status transition.
    ///
    /// Allowed: OnDelivery → Success, OnDelivery → Cancel, and an explicit
    /// reversion to Pending from any state (clears the batch
    /// back-reference). Entering OnDelivery is rejected here outright; only
    /// batch assignment may do that.
    #[instrument(skip(self, request))]
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        request: UpdateDeliveryStatusRequest,
    ) -> Result<Parcel, ServiceError> {
        let new_status = DeliveryStatus::from_str(&request.delivery_status).map_err(|_| {
            ServiceError::invalid_enum("Invalid deliveryStatus.", DeliveryStatus::ALLOWED_VALUES)
        })?;

        let mut parcel = self
            .parcels
            .find_parcel(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Parcel not found with ID: {}", id)))?;

        let old_status = parcel.delivery_status;
        match new_status {
            DeliveryStatus::Success | DeliveryStatus::Cancel => {
                if old_status != DeliveryStatus::OnDelivery {
                    return Err(ServiceError::invalid_input(format!(
                        "Cannot move a parcel from '{}' to '{}'; outcomes may only be recorded while on delivery.",
                        old_status, new_status
                    )));
                }
            }
            DeliveryStatus::Pending => {
                parcel.batch_id = None;
            }
            DeliveryStatus::OnDelivery => {
                return Err(ServiceError::invalid_input(
                    "A parcel enters 'On Deli' only through batch assignment.",
                ));
            }
        }

        parcel.delivery_status = new_status;
        parcel.updated_at = Some(request.updated_at.unwrap_or_else(Utc::now));
        self.parcels.put_parcel(parcel.clone()).await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::ParcelStatusChanged {
                    parcel_id: id,
                    old_status,
                    new_status,
                })
                .await;
        }
        Ok(parcel)
    }

    /// Bulk delete. All ids must exist; deletion cascades removal of the
    /// ids from every batch's membership list.
    #[instrument(skip(self, request), fields(count = request.ids.len()))]
    pub async fn delete_parcels(
        &self,
        request: DeleteParcelsRequest,
    ) -> Result<DeleteParcelsResponse, ServiceError> {
        if request.ids.is_empty() {
            return Err(ServiceError::invalid_input(
                "The 'ids' field must be a non-empty array.",
            ));
        }

        let existing = self.parcels.find_parcels(&request.ids).await?;
        let missing: Vec<String> = request
            .ids
            .iter()
            .filter(|id| !existing.iter().any(|p| p.id == **id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::not_found(format!(
                "No parcels found with the following ID(s): {}",
                missing.join(", ")
            )));
        }

        let deleted = self.parcels.delete_parcels(&request.ids).await?;
        if deleted > 0 {
            self.batches.pull_members(&request.ids).await?;
        }

        if let Some(sender) = &self.event_sender {
            sender.send(Event::ParcelsDeleted(request.ids)).await;
        }
        Ok(DeleteParcelsResponse {
            deleted_count: deleted,
        })
    }
}

/// 00:00:00.000 UTC on the civil date named by an ISO input.
fn utc_day_start(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    parse_date(raw).map(|d| {
        DateTime::from_naive_utc_and_offset(d.and_time(NaiveTime::MIN), Utc)
    })
}

/// 23:59:59.999 UTC on the civil date named by an ISO input.
fn utc_day_end(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    parse_date(raw).map(|d| DateTime::from_naive_utc_and_offset(d.and_time(end_of_day), Utc))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ServiceError::invalid_input(format!("Invalid date: {}", raw)))
}
