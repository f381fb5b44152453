// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plan_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Regular, // Assinatura
    Random,  // Avulso / itemizado
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Left,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    #[schema(example = "Almoço + Jantar (60)")]
    pub name: String,

    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,

    #[schema(example = 60)]
    pub total_tiffins: i32,

    #[schema(value_type = String, example = "85.00")]
    pub price_per_tiffin: Decimal,

    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Quantas refeições por dia o plano inclui (0 a 3).
    pub fn frequency(&self) -> i32 {
        [self.breakfast, self.lunch, self.dinner]
            .iter()
            .filter(|included| **included)
            .count() as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    pub plan_id: Option<Uuid>,

    #[schema(example = "Ana Souza")]
    pub name: String,

    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,
    pub address: Option<String>,

    pub plan_type: PlanType,
    pub status: CustomerStatus,

    #[schema(value_type = Option<String>, format = Date, example = "2024-05-31")]
    pub last_bill_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(breakfast: bool, lunch: bool, dinner: bool) -> Plan {
        Plan {
            id: Uuid::nil(),
            vendor_id: Uuid::nil(),
            name: "teste".into(),
            breakfast,
            lunch,
            dinner,
            total_tiffins: 60,
            price_per_tiffin: Decimal::new(8500, 2),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn frequency_counts_included_meals() {
        assert_eq!(plan(true, true, true).frequency(), 3);
        assert_eq!(plan(false, true, true).frequency(), 2);
        assert_eq!(plan(false, false, true).frequency(), 1);
        assert_eq!(plan(false, false, false).frequency(), 0);
    }
}
