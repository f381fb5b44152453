// src/handlers/attendance.rs

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        calendar::{DayIndex, MonthYear},
        error::AppError,
        money::money,
    },
    config::AppState,
    middleware::tenancy::VendorContext,
    models::{
        attendance::{Addon, MealCode, MealDayView, MonthSheet, ShiftCode, ShiftDayView, SlotInput},
        billing::validate_not_negative,
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuery {
    pub month_year: String,
    pub day: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMonthQuery {
    pub month_year: String,
    pub customer_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMonthQuery {
    pub month_year: String,
    pub staff_id: Uuid,
}

/// Cada refeição aceita `true`/`false` ou o status explícito (`P`, `A`, `H`, `L`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyDeliveryRecord {
    pub customer_id: Uuid,
    #[schema(value_type = bool)]
    pub breakfast: SlotInput,
    #[schema(value_type = bool)]
    pub lunch: SlotInput,
    #[schema(value_type = bool)]
    pub dinner: SlotInput,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDailyDeliveriesPayload {
    #[schema(example = "2024-05")]
    pub month_year: String,
    #[schema(example = 12)]
    pub day: i64,
    #[validate(length(min = 1, message = "Informe ao menos um cliente."))]
    pub records: Vec<DailyDeliveryRecord>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMonthDeliveriesPayload {
    #[schema(example = "2024-05")]
    pub month_year: String,
    pub customer_id: Uuid,
    /// `{"day1": "PPA", "day2": "AAA"}`
    #[validate(length(min = 1, message = "Informe ao menos um dia."))]
    pub records: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAddonPayload {
    pub customer_id: Uuid,
    #[schema(example = "2024-05")]
    pub month_year: String,
    #[schema(example = 12)]
    pub day: i64,
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "40.00")]
    pub amount: Decimal,
    #[validate(length(max = 200, message = "O detalhe deve ter no máximo 200 caracteres."))]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendanceRecord {
    pub staff_id: Uuid,
    #[schema(value_type = bool)]
    pub morning: SlotInput,
    #[schema(value_type = bool)]
    pub evening: SlotInput,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDailyAttendancePayload {
    #[schema(example = "2024-05")]
    pub month_year: String,
    #[schema(example = 3)]
    pub day: i64,
    #[validate(length(min = 1, message = "Informe ao menos um funcionário."))]
    pub records: Vec<DailyAttendanceRecord>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMonthAttendancePayload {
    #[schema(example = "2024-05")]
    pub month_year: String,
    pub staff_id: Uuid,
    /// `{"day1": "PP", "day2": "PA"}`
    #[validate(length(min = 1, message = "Informe ao menos um dia."))]
    pub records: HashMap<String, String>,
}

// =============================================================================
//  ENTREGAS
// =============================================================================

// GET /api/deliveries/daily
#[utoipa::path(
    get,
    path = "/api/deliveries/daily",
    tag = "Deliveries",
    params(
        ("monthYear" = String, Query, description = "YYYY-MM"),
        ("day" = i64, Query, description = "Dia do mês (1-31)")
    ),
    responses(
        (status = 200, description = "Entregas do dia para todos os clientes ativos", body = Vec<MealDayView>),
        (status = 400, description = "Mês ou dia inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_daily_deliveries(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<DailyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month: MonthYear = query.month_year.parse()?;
    let day = DayIndex::new(query.day)?;

    let views = app_state
        .attendance_service
        .get_daily_deliveries(vendor.0, month, day)
        .await?;

    Ok((StatusCode::OK, Json(views)))
}

// PUT /api/deliveries/daily
#[utoipa::path(
    put,
    path = "/api/deliveries/daily",
    tag = "Deliveries",
    request_body = UpdateDailyDeliveriesPayload,
    responses(
        (status = 200, description = "Resultado por cliente: `succeeded` e `failed`"),
        (status = 400, description = "Mês, dia ou registros inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_daily_deliveries(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<UpdateDailyDeliveriesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let month: MonthYear = payload.month_year.parse()?;
    let day = DayIndex::new(payload.day)?;

    let records: Vec<(Uuid, MealCode)> = payload
        .records
        .iter()
        .map(|r| {
            let code = MealCode::new([r.breakfast.into(), r.lunch.into(), r.dinner.into()]);
            (r.customer_id, code)
        })
        .collect();

    let outcome = app_state
        .attendance_service
        .update_daily_deliveries(vendor.0, month, day, &records)
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// GET /api/deliveries/month
#[utoipa::path(
    get,
    path = "/api/deliveries/month",
    tag = "Deliveries",
    params(
        ("monthYear" = String, Query, description = "YYYY-MM"),
        ("customerId" = Uuid, Query, description = "Cliente")
    ),
    responses(
        (status = 200, description = "Planilha do mês (criada vazia se não existir)", body = MonthSheet),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_month_deliveries(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<CustomerMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month: MonthYear = query.month_year.parse()?;

    let sheet = app_state
        .attendance_service
        .get_month_deliveries(vendor.0, query.customer_id, month)
        .await?;

    Ok((StatusCode::OK, Json(sheet)))
}

// PUT /api/deliveries/month
#[utoipa::path(
    put,
    path = "/api/deliveries/month",
    tag = "Deliveries",
    request_body = UpdateMonthDeliveriesPayload,
    responses(
        (status = 200, description = "Dias gravados"),
        (status = 400, description = "Dia ou código inválido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_month_deliveries(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<UpdateMonthDeliveriesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let month: MonthYear = payload.month_year.parse()?;

    let sheet = app_state
        .attendance_service
        .update_month_deliveries(vendor.0, payload.customer_id, month, &payload.records)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true, "sheet": sheet }))))
}

// POST /api/deliveries/addons
#[utoipa::path(
    post,
    path = "/api/deliveries/addons",
    tag = "Deliveries",
    request_body = AddAddonPayload,
    responses(
        (status = 201, description = "Addon lançado no mês", body = MonthSheet),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_delivery_addon(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<AddAddonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let month: MonthYear = payload.month_year.parse()?;
    let day = DayIndex::new(payload.day)?;

    let addon = Addon {
        day: day.get(),
        amount: money(payload.amount),
        detail: payload.detail,
    };

    let sheet = app_state
        .attendance_service
        .add_delivery_addon(vendor.0, payload.customer_id, month, addon)
        .await?;

    Ok((StatusCode::CREATED, Json(sheet)))
}

// =============================================================================
//  PRESENÇA DE FUNCIONÁRIOS
// =============================================================================

// GET /api/staff/attendance/daily
#[utoipa::path(
    get,
    path = "/api/staff/attendance/daily",
    tag = "Staff",
    params(
        ("monthYear" = String, Query, description = "YYYY-MM"),
        ("day" = i64, Query, description = "Dia do mês (1-31)")
    ),
    responses(
        (status = 200, description = "Presença do dia para todos os funcionários ativos", body = Vec<ShiftDayView>),
        (status = 400, description = "Mês ou dia inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_daily_attendance(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<DailyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month: MonthYear = query.month_year.parse()?;
    let day = DayIndex::new(query.day)?;

    let views = app_state
        .attendance_service
        .get_daily_attendance(vendor.0, month, day)
        .await?;

    Ok((StatusCode::OK, Json(views)))
}

// PUT /api/staff/attendance/daily
#[utoipa::path(
    put,
    path = "/api/staff/attendance/daily",
    tag = "Staff",
    request_body = UpdateDailyAttendancePayload,
    responses(
        (status = 200, description = "Resultado por funcionário: `succeeded` e `failed`"),
        (status = 400, description = "Mês, dia ou registros inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_daily_attendance(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<UpdateDailyAttendancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let month: MonthYear = payload.month_year.parse()?;
    let day = DayIndex::new(payload.day)?;

    let records: Vec<(Uuid, ShiftCode)> = payload
        .records
        .iter()
        .map(|r| (r.staff_id, ShiftCode::new([r.morning.into(), r.evening.into()])))
        .collect();

    let outcome = app_state
        .attendance_service
        .update_daily_attendance(vendor.0, month, day, &records)
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// GET /api/staff/attendance/month
#[utoipa::path(
    get,
    path = "/api/staff/attendance/month",
    tag = "Staff",
    params(
        ("monthYear" = String, Query, description = "YYYY-MM"),
        ("staffId" = Uuid, Query, description = "Funcionário")
    ),
    responses(
        (status = 200, description = "Planilha do mês (criada vazia se não existir)", body = MonthSheet),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_month_attendance(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<StaffMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month: MonthYear = query.month_year.parse()?;

    let sheet = app_state
        .attendance_service
        .get_month_attendance(vendor.0, query.staff_id, month)
        .await?;

    Ok((StatusCode::OK, Json(sheet)))
}

// PUT /api/staff/attendance/month
#[utoipa::path(
    put,
    path = "/api/staff/attendance/month",
    tag = "Staff",
    request_body = UpdateMonthAttendancePayload,
    responses(
        (status = 200, description = "Dias gravados"),
        (status = 400, description = "Dia ou código inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_month_attendance(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<UpdateMonthAttendancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let month: MonthYear = payload.month_year.parse()?;

    let sheet = app_state
        .attendance_service
        .update_month_attendance(vendor.0, payload.staff_id, month, &payload.records)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "success": true, "sheet": sheet }))))
}
