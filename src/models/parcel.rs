use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payment arrangement agreed with the customer at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "COD")]
    Cod,

    #[serde(rename = "Delivery Only")]
    DeliveryOnly,

    #[serde(rename = "Fully Paid")]
    FullyPaid,

    #[serde(rename = "Gate Drop Off")]
    GateDropOff,
}

impl PaymentStatus {
    pub const ALLOWED_VALUES: &'static [&'static str] =
        &["COD", "Delivery Only", "Fully Paid", "Gate Drop Off"];
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Cod => write!(f, "COD"),
            PaymentStatus::DeliveryOnly => write!(f, "Delivery Only"),
            PaymentStatus::FullyPaid => write!(f, "Fully Paid"),
            PaymentStatus::GateDropOff => write!(f, "Gate Drop Off"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentStatus::Cod),
            "Delivery Only" => Ok(PaymentStatus::DeliveryOnly),
            "Fully Paid" => Ok(PaymentStatus::FullyPaid),
            "Gate Drop Off" => Ok(PaymentStatus::GateDropOff),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// Delivery lifecycle state of a parcel.
///
/// `Pending` is the intake state. `OnDelivery` is reachable only through
/// batch assignment; `Success` and `Cancel` are terminal outcomes recorded
/// while the parcel is out on delivery. Deleting a batch reverts its members
/// to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "Pending")]
    Pending,

    // The source system abbreviates this on the wire.
    #[serde(rename = "On Deli")]
    OnDelivery,

    #[serde(rename = "Success")]
    Success,

    #[serde(rename = "Cancel")]
    Cancel,
}

impl DeliveryStatus {
    pub const ALLOWED_VALUES: &'static [&'static str] =
        &["Pending", "On Deli", "Success", "Cancel"];

    /// Terminal outcomes cannot be left except by batch deletion or an
    /// explicit reversion to `Pending`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Success | DeliveryStatus::Cancel)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::OnDelivery => write!(f, "On Deli"),
            DeliveryStatus::Success => write!(f, "Success"),
            DeliveryStatus::Cancel => write!(f, "Cancel"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DeliveryStatus::Pending),
            "On Deli" => Ok(DeliveryStatus::OnDelivery),
            "Success" => Ok(DeliveryStatus::Success),
            "Cancel" => Ok(DeliveryStatus::Cancel),
            other => Err(format!("Unknown delivery status: {}", other)),
        }
    }
}

/// A single shipment record.
///
/// `batch_id` is a weak back-reference to the owning delivery batch. It is
/// kept in sync with the batch's membership list only by the orchestrator's
/// explicit write sequence; nothing enforces the link structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub seller: String,
    pub price: Decimal,
    pub delivery_fee: Decimal,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Parcel {
    /// Net sale value attributed to the seller for a delivered parcel.
    pub fn sale_amount(&self) -> Decimal {
        self.price - self.delivery_fee
    }
}
