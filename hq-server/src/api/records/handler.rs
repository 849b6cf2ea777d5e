//! Business Records API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::business_record;
use crate::utils::time::{day_window, parse_date};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

use shared::models::{
    DeliveryOrder, DeliveryOrderCreate, TruckerOnboarding, TruckerOnboardingCreate,
};
use shared::util::now_millis;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Creator filter; non-admins are always scoped to themselves
    pub emp_id: Option<String>,
    /// Restrict to one business day (YYYY-MM-DD)
    pub date: Option<String>,
}

/// Resolve the creator filter for a listing request.
///
/// Admins may filter by anyone or see everything; employees only ever
/// see their own records.
fn creator_filter(user: &CurrentUser, requested: Option<&str>) -> AppResult<Option<String>> {
    match requested {
        Some(emp_id) => {
            if !user.can_act_for(emp_id) {
                return Err(AppError::Forbidden(
                    "Cannot view another employee's records".to_string(),
                ));
            }
            Ok(Some(emp_id.to_string()))
        }
        None if user.is_admin() => Ok(None),
        None => Ok(Some(user.emp_id.clone())),
    }
}

/// Record a trucker onboarding, stamped with the current user
pub async fn create_trucker(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<TruckerOnboardingCreate>,
) -> AppResult<Json<TruckerOnboarding>> {
    validate_required_text(&payload.truck_number, "truckNumber", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.owner_name, "ownerName", MAX_NAME_LEN)?;
    validate_optional_text(&payload.owner_phone, "ownerPhone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.origin_city, "originCity", MAX_NAME_LEN)?;
    validate_optional_text(&payload.destination_city, "destinationCity", MAX_NAME_LEN)?;

    let record =
        business_record::create_trucker(&state.db.pool, &payload, &user.emp_id, now_millis())
            .await?;
    tracing::info!(
        emp_id = %user.emp_id,
        truck_number = %record.truck_number,
        "Trucker onboarding recorded"
    );
    Ok(Json(record))
}

/// List trucker onboardings, newest first
pub async fn list_truckers(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TruckerOnboarding>>> {
    let created_by = creator_filter(&user, query.emp_id.as_deref())?;
    let window = match query.date.as_deref() {
        Some(date) => {
            let day = parse_date(date)?;
            let w = day_window(day, state.config.timezone);
            Some((w.start_ms, w.end_ms))
        }
        None => None,
    };

    let records =
        business_record::find_truckers(&state.db.pool, created_by.as_deref(), window).await?;
    Ok(Json(records))
}

/// Record a delivery order, stamped with the current user
pub async fn create_delivery_order(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DeliveryOrderCreate>,
) -> AppResult<Json<DeliveryOrder>> {
    validate_required_text(&payload.order_number, "orderNumber", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.client_name, "clientName", MAX_NAME_LEN)?;
    validate_optional_text(&payload.origin_city, "originCity", MAX_NAME_LEN)?;
    validate_optional_text(&payload.destination_city, "destinationCity", MAX_NAME_LEN)?;
    if let Some(amount) = payload.freight_amount
        && amount < 0.0
    {
        return Err(AppError::validation("freightAmount cannot be negative"));
    }

    let record =
        business_record::create_delivery_order(&state.db.pool, &payload, &user.emp_id, now_millis())
            .await?;
    tracing::info!(
        emp_id = %user.emp_id,
        order_number = %record.order_number,
        "Delivery order recorded"
    );
    Ok(Json(record))
}

/// List delivery orders, newest first
pub async fn list_delivery_orders(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DeliveryOrder>>> {
    let created_by = creator_filter(&user, query.emp_id.as_deref())?;
    let window = match query.date.as_deref() {
        Some(date) => {
            let day = parse_date(date)?;
            let w = day_window(day, state.config.timezone);
            Some((w.start_ms, w.end_ms))
        }
        None => None,
    };

    let records =
        business_record::find_delivery_orders(&state.db.pool, created_by.as_deref(), window)
            .await?;
    Ok(Json(records))
}
