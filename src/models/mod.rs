// Domain models for parcels and delivery batches
pub mod delivery_batch;
pub mod parcel;

pub use delivery_batch::{BatchStatus, DeliveryBatch, DeliveryType};
pub use parcel::{DeliveryStatus, Parcel, PaymentStatus};
