pub mod batches;
pub mod parcels;
pub mod reports;

pub use batches::BatchService;
pub use parcels::ParcelService;
pub use reports::ReportService;

use std::sync::Arc;

/// Bundle of service handles shared through application state.
#[derive(Clone)]
pub struct AppServices {
    pub parcels: Arc<ParcelService>,
    pub batches: Arc<BatchService>,
    pub reports: Arc<ReportService>,
}
