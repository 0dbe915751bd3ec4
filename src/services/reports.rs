use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{DeliveryBatch, DeliveryStatus},
    store::{BatchStore, ParcelStore},
};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSales {
    pub seller_name: String,
    /// Σ(price − deliveryFee) over the seller's successful parcels.
    pub seller_total_sale_amount: Decimal,
    pub success_parcel_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_sales_value: Decimal,
    /// Parcels of any status updated in the inclusive window; denominator
    /// context for the success/cancel counts.
    pub total_parcel_count: u64,
    pub seller_sales_data: Vec<SellerSales>,
    pub top_seller: Option<SellerSales>,
    pub success_count: u64,
    pub cancel_count: u64,
    /// Formatted local dates, display only.
    pub period_start: String,
    pub period_end: String,
}

/// Batch record annotated with terminal-outcome member counts. Members
/// still Pending or OnDelivery appear in neither count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeliveryRow {
    #[serde(flatten)]
    pub batch: DeliveryBatch,
    pub success_parcel_count: u64,
    pub cancel_parcel_count: u64,
}

/// Read-only reporting over the parcel and batch stores.
///
/// Both reports window their bounds on the same fixed civil offset
/// (UTC+6:30 by default): the start floors to 00:00:00.000 local and the
/// end ceils to 23:59:59.999 local before converting back to absolute
/// time, so a "July 1 to July 1" request covers the whole local day no
/// matter what zone the server clock runs in. Reports are not
/// point-in-time snapshots; writes racing a report may or may not be
/// included.
#[derive(Clone)]
pub struct ReportService {
    parcels: Arc<dyn ParcelStore>,
    batches: Arc<dyn BatchStore>,
    civil_offset: FixedOffset,
}

impl ReportService {
    pub fn new(
        parcels: Arc<dyn ParcelStore>,
        batches: Arc<dyn BatchStore>,
        civil_offset: FixedOffset,
    ) -> Self {
        Self {
            parcels,
            batches,
            civil_offset,
        }
    }

    /// Resolves raw query bounds to an adjusted absolute-time window.
    fn civil_day_window(
        &self,
        query: &ReportQuery,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
        let (start_raw, end_raw) = match (query.start_date.as_deref(), query.end_date.as_deref()) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(ServiceError::invalid_input(
                    "Start date and end date are required",
                ))
            }
        };

        let start = self.floor_to_local_day(parse_instant(start_raw)?);
        let end = self.ceil_to_local_day(parse_instant(end_raw)?);
        if start > end {
            return Err(ServiceError::invalid_input(
                "startDate must be before or equal to endDate.",
            ));
        }
        Ok((start, end))
    }

    fn floor_to_local_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let local = at.with_timezone(&self.civil_offset);
        let floored = local.date_naive().and_time(NaiveTime::MIN);
        DateTime::from_naive_utc_and_offset(floored - self.civil_offset, Utc)
    }

    fn ceil_to_local_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        let local = at.with_timezone(&self.civil_offset);
        let ceiled = local.date_naive().and_time(end_of_day);
        DateTime::from_naive_utc_and_offset(ceiled - self.civil_offset, Utc)
    }

    fn format_local_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.civil_offset)
            .format("%-m/%-d/%Y")
            .to_string()
    }

    /// Seller-level and aggregate sales statistics over a local-civil-day
    /// window.
    ///
    /// The seller aggregation covers Success parcels with `updated_at` in
    /// the half-open `[start, end)` window; the total/success/cancel counts
    /// use the inclusive `[start, end]` window over all statuses. The two
    /// bounds intentionally differ (both derive from the same adjusted
    /// instants).
    #[instrument(skip(self, query))]
    pub async fn sales_report(&self, query: ReportQuery) -> Result<SalesReport, ServiceError> {
        let (start, end) = self.civil_day_window(&query)?;

        let matching = self.parcels.find_success_updated_between(start, end).await?;

        let mut by_seller: HashMap<String, (Decimal, u64)> = HashMap::new();
        for parcel in &matching {
            let entry = by_seller
                .entry(parcel.seller.clone())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += parcel.sale_amount();
            entry.1 += 1;
        }

        let mut seller_sales_data: Vec<SellerSales> = by_seller
            .into_iter()
            .map(|(seller_name, (total, count))| SellerSales {
                seller_name,
                seller_total_sale_amount: total,
                success_parcel_count: count,
            })
            .collect();
        seller_sales_data.sort_by(|a, b| b.seller_total_sale_amount.cmp(&a.seller_total_sale_amount));

        let total_sales_value = seller_sales_data
            .iter()
            .map(|s| s.seller_total_sale_amount)
            .sum();
        let top_seller = seller_sales_data.first().cloned();

        let total_parcel_count = self.parcels.count_updated_between(start, end, None).await?;
        let success_count = self
            .parcels
            .count_updated_between(start, end, Some(DeliveryStatus::Success))
            .await?;
        let cancel_count = self
            .parcels
            .count_updated_between(start, end, Some(DeliveryStatus::Cancel))
            .await?;

        Ok(SalesReport {
            total_sales_value,
            total_parcel_count,
            seller_sales_data,
            top_seller,
            success_count,
            cancel_count,
            period_start: self.format_local_date(start),
            period_end: self.format_local_date(end),
        })
    }

    /// Batches created in the window, each annotated with Success and
    /// Cancel member counts, in the store's natural order.
    #[instrument(skip(self, query))]
    pub async fn delivery_report(
        &self,
        query: ReportQuery,
    ) -> Result<Vec<BatchDeliveryRow>, ServiceError> {
        let (start, end) = self.civil_day_window(&query)?;

        let batches = self.batches.find_batches_created_between(start, end).await?;
        let mut rows = Vec::with_capacity(batches.len());
        for batch in batches {
            let success_parcel_count = self.count_members(batch.id, DeliveryStatus::Success).await?;
            let cancel_parcel_count = self.count_members(batch.id, DeliveryStatus::Cancel).await?;
            rows.push(BatchDeliveryRow {
                batch,
                success_parcel_count,
                cancel_parcel_count,
            });
        }
        Ok(rows)
    }

    async fn count_members(
        &self,
        batch_id: Uuid,
        status: DeliveryStatus,
    ) -> Result<u64, ServiceError> {
        Ok(self
            .parcels
            .count_by_batch_and_status(batch_id, status)
            .await?)
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| DateTime::from_naive_utc_and_offset(d.and_time(NaiveTime::MIN), Utc))
        .map_err(|_| ServiceError::invalid_input(format!("Invalid date: {}", raw)))
}
