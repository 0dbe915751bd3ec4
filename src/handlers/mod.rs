//! Thin HTTP handlers over the service layer. Routing is scaffolding; all
//! lifecycle and reporting rules live in `crate::services`.
pub mod batches;
pub mod parcels;
pub mod reports;
