mod common;

use chrono::{TimeZone, Utc};

use parceltrack_api::{
    models::DeliveryStatus,
    services::batches::CreateBatchRequest,
};

#[tokio::test]
async fn all_pending_batch_claims_every_parcel() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    let mut ids = Vec::new();
    for i in 0..4 {
        let parcel = parcels
            .create_parcel(common::intake_request(&format!("Customer {}", i), "Shwe Shop"))
            .await
            .unwrap();
        ids.push(parcel.id);
    }

    let created = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: ids.clone(),
            delivery_type: Some("Ninja Van".to_string()),
            batch_created_at: None,
        })
        .await
        .unwrap();

    assert_eq!(created.updated_parcel_count as usize, ids.len());
    for id in &ids {
        let parcel = parcels.get_parcel(*id).await.unwrap();
        assert_eq!(parcel.delivery_status, DeliveryStatus::OnDelivery);
        assert_eq!(parcel.batch_id, Some(created.batch.id));
    }
    assert!(created.batch.batch_name.starts_with("Ninja Van "));
}

#[tokio::test]
async fn delete_batch_restores_intake_state() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    let mut ids = Vec::new();
    for i in 0..3 {
        let parcel = parcels
            .create_parcel(common::intake_request(&format!("Customer {}", i), "City Store"))
            .await
            .unwrap();
        ids.push(parcel.id);
    }

    let created = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: ids.clone(),
            delivery_type: None,
            batch_created_at: None,
        })
        .await
        .unwrap();

    // One member reaches Success out on the road.
    parcels
        .update_delivery_status(
            ids[0],
            parceltrack_api::services::parcels::UpdateDeliveryStatusRequest {
                delivery_status: "Success".to_string(),
                updated_at: None,
            },
        )
        .await
        .unwrap();

    let deleted = batches.delete_batch(created.batch.id).await.unwrap();
    assert_eq!(deleted.reverted_parcel_count, 3);
    for id in &ids {
        let parcel = parcels.get_parcel(*id).await.unwrap();
        assert_eq!(parcel.delivery_status, DeliveryStatus::Pending);
        assert_eq!(parcel.batch_id, None);
    }
}

#[tokio::test]
async fn overlapping_batches_claim_each_parcel_at_most_once() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    let shared = parcels
        .create_parcel(common::intake_request("Shared", "Shwe Shop"))
        .await
        .unwrap();
    let own = parcels
        .create_parcel(common::intake_request("Own", "Shwe Shop"))
        .await
        .unwrap();

    let first = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: vec![shared.id],
            delivery_type: None,
            batch_created_at: None,
        })
        .await
        .unwrap();
    let second = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: vec![shared.id, own.id],
            delivery_type: None,
            batch_created_at: None,
        })
        .await
        .unwrap();

    assert_eq!(first.updated_parcel_count, 1);
    // The loser still lists the shared parcel but only claimed its own.
    assert_eq!(second.requested_parcel_count, 2);
    assert_eq!(second.updated_parcel_count, 1);

    let claimed = parcels.get_parcel(shared.id).await.unwrap();
    assert_eq!(claimed.batch_id, Some(first.batch.id));
}

#[tokio::test]
async fn midnight_batch_label_reads_twelve_am() {
    let (state, _store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    let parcel = parcels
        .create_parcel(common::intake_request("Night owl", "Shwe Shop"))
        .await
        .unwrap();

    // 17:30 UTC is 00:00 at UTC+6:30.
    let midnight_local = Utc.with_ymd_and_hms(2024, 6, 30, 17, 30, 0).unwrap();
    let created = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: vec![parcel.id],
            delivery_type: None,
            batch_created_at: Some(midnight_local),
        })
        .await
        .unwrap();

    assert_eq!(created.batch.batch_name, "Batch 12:00 AM");
}

#[tokio::test]
async fn deleting_parcels_pulls_them_from_memberships() {
    let (state, store) = common::build_state();
    let parcels = state.parcel_service();
    let batches = state.batch_service();

    let keep = parcels
        .create_parcel(common::intake_request("Keep", "Shwe Shop"))
        .await
        .unwrap();
    let gone = parcels
        .create_parcel(common::intake_request("Gone", "Shwe Shop"))
        .await
        .unwrap();

    let created = batches
        .create_batch(CreateBatchRequest {
            parcel_ids: vec![keep.id, gone.id],
            delivery_type: None,
            batch_created_at: None,
        })
        .await
        .unwrap();

    parcels
        .delete_parcels(parceltrack_api::services::parcels::DeleteParcelsRequest {
            ids: vec![gone.id],
        })
        .await
        .unwrap();

    use parceltrack_api::store::BatchStore;
    let batch = store.find_batch(created.batch.id).await.unwrap().unwrap();
    assert_eq!(batch.parcels, vec![keep.id]);
}
