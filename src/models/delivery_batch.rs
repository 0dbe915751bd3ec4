use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Carrier or method a batch is dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "Ninja Van")]
    NinjaVan,

    #[serde(rename = "Express")]
    Express,

    #[serde(rename = "Own Delivery")]
    OwnDelivery,
}

impl DeliveryType {
    pub const ALLOWED_VALUES: &'static [&'static str] =
        &["Ninja Van", "Express", "Own Delivery"];
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryType::NinjaVan => write!(f, "Ninja Van"),
            DeliveryType::Express => write!(f, "Express"),
            DeliveryType::OwnDelivery => write!(f, "Own Delivery"),
        }
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ninja Van" => Ok(DeliveryType::NinjaVan),
            "Express" => Ok(DeliveryType::Express),
            "Own Delivery" => Ok(DeliveryType::OwnDelivery),
            other => Err(format!("Unknown delivery type: {}", other)),
        }
    }
}

/// Dispatch state of a batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    #[serde(rename = "On Deliver")]
    OnDeliver,

    #[serde(rename = "Finished")]
    Finished,
}

impl BatchStatus {
    pub const ALLOWED_VALUES: &'static [&'static str] = &["On Deliver", "Finished"];
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::OnDeliver => write!(f, "On Deliver"),
            BatchStatus::Finished => write!(f, "Finished"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On Deliver" => Ok(BatchStatus::OnDeliver),
            "Finished" => Ok(BatchStatus::Finished),
            other => Err(format!("Unknown batch status: {}", other)),
        }
    }
}

/// A named grouping of parcels dispatched together.
///
/// `parcels` is an ordered membership list of parcel ids. The batch groups
/// parcels but does not own their lifecycle; each member's `batch_id` is a
/// back-reference written by the orchestrator at assignment time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBatch {
    pub id: Uuid,
    pub batch_name: String,
    pub delivery_type: Option<DeliveryType>,
    pub parcels: Vec<Uuid>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_status_wire_strings_round_trip() {
        for raw in BatchStatus::ALLOWED_VALUES {
            let status: BatchStatus = raw.parse().unwrap();
            assert_eq!(status.to_string(), *raw);
        }
    }

    #[test]
    fn delivery_type_serializes_with_spaces() {
        let json = serde_json::to_string(&DeliveryType::OwnDelivery).unwrap();
        assert_eq!(json, "\"Own Delivery\"");
    }
}
