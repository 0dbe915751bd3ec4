mod common;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use parceltrack_api::{
    services::batches::CreateBatchRequest,
    services::parcels::UpdateDeliveryStatusRequest,
    services::reports::ReportQuery,
};

fn window(start: &str, end: &str) -> ReportQuery {
    ReportQuery {
        start_date: Some(start.to_string()),
        end_date: Some(end.to_string()),
    }
}

/// Full pipeline: intake, batch, record outcomes, then report on the day.
#[tokio::test]
async fn single_day_report_covers_the_local_civil_day() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();
    let reports = state.report_service();

    let mut ids = Vec::new();
    for customer in ["Aye", "Hla", "Zaw"] {
        let parcel = parcels
            .create_parcel(common::intake_request(customer, "Shwe Shop"))
            .await
            .unwrap();
        ids.push(parcel.id);
    }
    batches
        .create_batch(CreateBatchRequest {
            parcel_ids: ids.clone(),
            delivery_type: Some("Express".to_string()),
            batch_created_at: Some(Utc.with_ymd_and_hms(2024, 7, 1, 4, 0, 0).unwrap()),
        })
        .await
        .unwrap();

    // Two delivered, one cancelled, all on July 1 local time.
    let delivered_at = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
    for id in &ids[..2] {
        parcels
            .update_delivery_status(
                *id,
                UpdateDeliveryStatusRequest {
                    delivery_status: "Success".to_string(),
                    updated_at: Some(delivered_at),
                },
            )
            .await
            .unwrap();
    }
    parcels
        .update_delivery_status(
            ids[2],
            UpdateDeliveryStatusRequest {
                delivery_status: "Cancel".to_string(),
                updated_at: Some(delivered_at),
            },
        )
        .await
        .unwrap();

    let report = reports
        .sales_report(window("2024-07-01", "2024-07-01"))
        .await
        .unwrap();

    assert_eq!(report.success_count, 2);
    assert_eq!(report.cancel_count, 1);
    assert_eq!(report.total_parcel_count, 3);
    let top = report.top_seller.unwrap();
    assert_eq!(top.seller_name, "Shwe Shop");
    // Two parcels at price 100, fee 10.
    assert_eq!(top.seller_total_sale_amount, dec!(180));
    assert_eq!(report.total_sales_value, dec!(180));

    // The day before sees none of it.
    let empty = reports
        .sales_report(window("2024-06-30", "2024-06-30"))
        .await
        .unwrap();
    assert_eq!(empty.success_count, 0);
    assert!(empty.top_seller.is_none());
}

#[tokio::test]
async fn delivery_report_annotates_batches_in_creation_order() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();
    let reports = state.report_service();

    let day = |h| Utc.with_ymd_and_hms(2024, 7, 1, h, 0, 0).unwrap();
    let mut batch_ids = Vec::new();
    for hour in [2, 5] {
        let parcel = parcels
            .create_parcel(common::intake_request("Customer", "Shwe Shop"))
            .await
            .unwrap();
        let created = batches
            .create_batch(CreateBatchRequest {
                parcel_ids: vec![parcel.id],
                delivery_type: None,
                batch_created_at: Some(day(hour)),
            })
            .await
            .unwrap();
        parcels
            .update_delivery_status(
                parcel.id,
                UpdateDeliveryStatusRequest {
                    delivery_status: if hour == 2 { "Success" } else { "Cancel" }.to_string(),
                    updated_at: Some(day(hour + 1)),
                },
            )
            .await
            .unwrap();
        batch_ids.push(created.batch.id);
    }

    let rows = reports
        .delivery_report(window("2024-07-01", "2024-07-01"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    // Natural (creation) order is preserved.
    assert_eq!(rows[0].batch.id, batch_ids[0]);
    assert_eq!(rows[0].success_parcel_count, 1);
    assert_eq!(rows[0].cancel_parcel_count, 0);
    assert_eq!(rows[1].success_parcel_count, 0);
    assert_eq!(rows[1].cancel_parcel_count, 1);
}

#[tokio::test]
async fn listing_is_idempotent_between_writes() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    for i in 0..3 {
        let parcel = parcels
            .create_parcel(common::intake_request(&format!("C{}", i), "Shwe Shop"))
            .await
            .unwrap();
        batches
            .create_batch(CreateBatchRequest {
                parcel_ids: vec![parcel.id],
                delivery_type: None,
                batch_created_at: Some(Utc.with_ymd_and_hms(2024, 7, 1, i, 0, 0).unwrap()),
            })
            .await
            .unwrap();
    }

    let first: Vec<_> = batches
        .list_batches(None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.batch.id)
        .collect();
    let second: Vec<_> = batches
        .list_batches(None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.batch.id)
        .collect();
    assert_eq!(first, second);
}
