// src/models/staff.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    #[schema(example = "Carlos")]
    pub name: String,
    pub phone: Option<String>,

    #[schema(example = "Entregador")]
    pub role: Option<String>,

    #[schema(value_type = String, example = "12000.00")]
    pub monthly_salary: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    // Preenchido quando a despesa é pagamento de salário
    pub staff_id: Option<Uuid>,

    #[schema(example = "Mercado")]
    pub category: String,
    pub detail: Option<String>,

    #[schema(value_type = String, example = "750.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-05-10")]
    pub expense_date: NaiveDate,

    pub created_at: DateTime<Utc>,
}
