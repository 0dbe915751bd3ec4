use std::{sync::Arc, time::Duration};

use tokio::{signal, sync::mpsc};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use parceltrack_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Single in-process store backs both document collections.
    let store = Arc::new(api::store::InMemoryStore::new());

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    let sender = Some(Arc::new(event_sender.clone()));
    let offset = cfg.report_offset();
    let services = api::services::AppServices {
        parcels: Arc::new(api::services::ParcelService::new(
            store.clone(),
            store.clone(),
            sender.clone(),
        )),
        batches: Arc::new(api::services::BatchService::new(
            store.clone(),
            store.clone(),
            sender,
            offset,
        )),
        reports: Arc::new(api::services::ReportService::new(
            store.clone(),
            store.clone(),
            offset,
        )),
    };

    let app_state = api::AppState {
        config: cfg.clone(),
        event_sender,
        services,
    };

    let app = api::app_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive());

    let addr = cfg.server_addr();
    info!("parceltrack-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
