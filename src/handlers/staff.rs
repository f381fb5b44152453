// src/handlers/staff.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{calendar::MonthYear, error::AppError},
    config::AppState,
    middleware::tenancy::VendorContext,
    models::{
        billing::validate_not_negative,
        staff::{Expense, Staff},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Carlos")]
    pub name: String,

    pub phone: Option<String>,

    #[schema(example = "Entregador")]
    pub role: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "12000.00")]
    pub monthly_salary: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    // Preencha para registrar pagamento de salário
    pub staff_id: Option<Uuid>,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "Mercado")]
    pub category: String,

    pub detail: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "750.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-05-10")]
    pub expense_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    pub month_year: Option<String>,
}

// POST /api/staff
#[utoipa::path(
    post,
    path = "/api/staff",
    tag = "Staff",
    request_body = CreateStaffPayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = Staff),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<CreateStaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let staff = app_state
        .staff_service
        .create_staff(
            vendor.0,
            &payload.name,
            payload.phone.as_deref(),
            payload.role.as_deref(),
            payload.monthly_salary,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(staff)))
}

// GET /api/staff
#[utoipa::path(
    get,
    path = "/api/staff",
    tag = "Staff",
    responses(
        (status = 200, description = "Funcionários do fornecedor", body = Vec<Staff>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    vendor: VendorContext,
) -> Result<impl IntoResponse, AppError> {
    let staff = app_state.staff_service.list_staff(vendor.0).await?;

    Ok((StatusCode::OK, Json(staff)))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada", body = Expense),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state
        .staff_service
        .create_expense(
            vendor.0,
            payload.staff_id,
            &payload.category,
            payload.detail.as_deref(),
            payload.amount,
            payload.expense_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(
        ("monthYear" = Option<String>, Query, description = "YYYY-MM; padrão = mês corrente")
    ),
    responses(
        (status = 200, description = "Despesas do mês", body = Vec<Expense>),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    vendor: VendorContext,
    Query(query): Query<ListExpensesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month: MonthYear = match query.month_year {
        Some(raw) => raw.parse::<MonthYear>()?,
        None => MonthYear::of(Utc::now().date_naive()),
    };

    let expenses = app_state.staff_service.list_expenses(vendor.0, month).await?;

    Ok((StatusCode::OK, Json(expenses)))
}
