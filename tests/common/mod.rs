use std::sync::Arc;

use chrono::FixedOffset;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use parceltrack_api::{
    config::AppConfig,
    events::EventSender,
    services::{
        parcels::CreateParcelRequest, AppServices, BatchService, ParcelService, ReportService,
    },
    store::InMemoryStore,
    AppState,
};

pub fn civil_offset() -> FixedOffset {
    FixedOffset::east_opt(6 * 3600 + 30 * 60).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        report_utc_offset_minutes: 390,
    }
}

pub fn build_state() -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let (event_tx, mut event_rx) = mpsc::channel(64);
    // Drain events so senders never block in tests.
    tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
    let event_sender = EventSender::new(event_tx);
    let sender = Some(Arc::new(event_sender.clone()));
    let offset = civil_offset();

    let services = AppServices {
        parcels: Arc::new(ParcelService::new(
            store.clone(),
            store.clone(),
            sender.clone(),
        )),
        batches: Arc::new(BatchService::new(
            store.clone(),
            store.clone(),
            sender,
            offset,
        )),
        reports: Arc::new(ReportService::new(store.clone(), store.clone(), offset)),
    };

    (
        AppState {
            config: test_config(),
            event_sender,
            services,
        },
        store,
    )
}

pub fn intake_request(customer: &str, seller: &str) -> CreateParcelRequest {
    CreateParcelRequest {
        customer_name: customer.to_string(),
        address: "No. 5, Bogyoke Rd, Yangon".to_string(),
        seller: seller.to_string(),
        price: dec!(100),
        delivery_fee: dec!(10),
        payment_status: "COD".to_string(),
    }
}
