// src/models/billing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::money::{money_limit, within_money_limit};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bill_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Regular, // Assinatura, cobrada adiantado
    Random,  // Itens avulsos
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartialPaid,
    Paid,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_mode", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
    BankTransfer,
    Other,
}

// --- Detalhe da fatura (JSONB polimórfico) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealCounts {
    pub breakfast: i32,
    pub lunch: i32,
    pub dinner: i32,
}

impl MealCounts {
    pub fn total(&self) -> i32 {
        self.breakfast + self.lunch + self.dinner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegularBillDetail {
    #[schema(value_type = String, format = Date, example = "2024-05-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-05-30")]
    pub end_date: NaiveDate,
    pub counts: MealCounts,
    #[schema(example = 60)]
    pub total_tiffins: i32,
    #[schema(value_type = String, example = "85.00")]
    pub price_per_tiffin: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub addon_amount: Decimal,
    /// Total de addons já lançado no valor da fatura na última reconciliação.
    #[schema(value_type = String, example = "0.00")]
    pub previous_addon_amount: Decimal,
    #[serde(default)]
    pub addon_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    #[schema(example = "Marmita executiva")]
    pub name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(value_type = String, example = "50.00")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemizedBillDetail {
    pub items: Vec<BillItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillDetail {
    Regular(RegularBillDetail),
    Itemized(ItemizedBillDetail),
}

impl BillDetail {
    pub fn bill_type(&self) -> BillType {
        match self {
            BillDetail::Regular(_) => BillType::Regular,
            BillDetail::Itemized(_) => BillType::Random,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    pub customer_id: Uuid,

    #[schema(example = 42)]
    pub bill_no: i32,

    pub bill_type: BillType,

    #[schema(value_type = String, format = Date, example = "2024-05-01")]
    pub bill_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-05-06")]
    pub due_date: NaiveDate,

    #[schema(value_type = BillDetail)]
    pub bill_detail: Json<BillDetail>,

    #[schema(value_type = String, example = "5100.00")]
    pub total_amount: Decimal,
    #[schema(value_type = String, example = "2100.00")]
    pub remaining_amount: Decimal,
    #[schema(value_type = String, example = "0.00")]
    pub discount: Decimal,

    pub payment_status: PaymentStatus,
    pub is_closed: bool,
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,

    #[schema(ignore)]
    pub vendor_id: Uuid,

    pub bill_id: Uuid,
    pub customer_id: Uuid,

    #[schema(value_type = String, example = "3000.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-05-02")]
    pub payment_date: NaiveDate,

    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
}

/// Prévia (não persistida) usada para preencher o formulário de nova fatura.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillEstimate {
    pub customer_id: Uuid,
    #[schema(example = "Ana Souza")]
    pub customer_name: String,
    #[schema(value_type = String, format = Date)]
    pub bill_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub counts: Option<MealCounts>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub total_tiffins: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price_per_tiffin: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub addon_amount: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillPayload {
    pub customer_id: Uuid,
    pub bill_type: BillType,

    #[schema(value_type = String, format = Date, example = "2024-05-01")]
    pub bill_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-05-06")]
    pub due_date: NaiveDate,

    pub payment_mode: PaymentMode,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<String>, example = "0.00")]
    pub discount: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<String>, example = "1000.00")]
    pub amount_paid: Option<Decimal>,

    /// Data do pagamento inicial; padrão = data da fatura.
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub note: Option<String>,

    // Obrigatórios para faturas de assinatura
    #[schema(value_type = Option<String>, format = Date, example = "2024-05-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-05-30")]
    pub end_date: Option<NaiveDate>,

    // Obrigatório para faturas avulsas
    pub items: Option<Vec<BillItem>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillPayload {
    #[schema(value_type = String, format = Date, example = "2024-05-10")]
    pub payment_date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "500.00")]
    pub amount_paid: Decimal,

    /// Saldo que o formulário exibia; se divergir do banco, o pagamento é recusado.
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub remaining_amount: Option<Decimal>,

    pub payment_mode: PaymentMode,
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if !within_money_limit(*val) {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &money_limit().to_string());
        err.message = Some("O valor excede o limite permitido.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_must_fit_the_money_columns() {
        assert!(validate_not_negative(&dec!(0)).is_ok());
        assert!(validate_not_negative(&dec!(9999999999.99)).is_ok());
        assert!(validate_not_negative(&dec!(-0.01)).is_err());
        assert!(validate_not_negative(&dec!(10000000000)).is_err());
        assert!(validate_not_negative(&Decimal::MAX).is_err());
    }

    #[test]
    fn huge_payment_fails_validation() {
        let payload = UpdateBillPayload {
            payment_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            amount_paid: "79228162514264337593543950335".parse().unwrap(),
            remaining_amount: None,
            payment_mode: PaymentMode::Cash,
        };
        assert!(payload.validate().is_err());
    }
}
