//! Business Record Models (trucker onboardings, delivery orders)
//!
//! Owned by the operations modules; the target evaluator only counts
//! them by `(created_by, created_at)` window.

use serde::{Deserialize, Serialize};

/// Trucker onboarding record (CMT outcome)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TruckerOnboarding {
    pub id: i64,
    pub truck_number: String,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    /// emp_id of the creator
    pub created_by: String,
    pub created_at: i64,
}

/// Create trucker onboarding payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckerOnboardingCreate {
    pub truck_number: String,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
}

/// Delivery order record (Sales outcome)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrder {
    pub id: i64,
    pub order_number: String,
    pub client_name: String,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub freight_amount: Option<f64>,
    /// emp_id of the creator
    pub created_by: String,
    pub created_at: i64,
}

/// Create delivery order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOrderCreate {
    pub order_number: String,
    pub client_name: String,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub freight_amount: Option<f64>,
}
