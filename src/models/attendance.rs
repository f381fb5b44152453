// src/models/attendance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, types::Json, FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{
    calendar::{DayIndex, MonthYear, DAYS_PER_SHEET},
    error::AppError,
};

// --- Status de cada refeição / turno ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SlotStatus {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "H")]
    Holiday,
    #[serde(rename = "L")]
    Leave,
}

impl SlotStatus {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(SlotStatus::Present),
            'A' => Some(SlotStatus::Absent),
            'H' => Some(SlotStatus::Holiday),
            'L' => Some(SlotStatus::Leave),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            SlotStatus::Present => 'P',
            SlotStatus::Absent => 'A',
            SlotStatus::Holiday => 'H',
            SlotStatus::Leave => 'L',
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SlotStatus::Present)
    }
}

/// O frontend manda `true`/`false` (marcado ou não) ou o status explícito.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotInput {
    Flag(bool),
    Status(SlotStatus),
}

impl From<SlotInput> for SlotStatus {
    fn from(input: SlotInput) -> Self {
        match input {
            SlotInput::Flag(true) => SlotStatus::Present,
            SlotInput::Flag(false) => SlotStatus::Absent,
            SlotInput::Status(status) => status,
        }
    }
}

// --- Código de largura fixa de um dia ---

/// Código de um dia com `N` posições: 3 para entregas (café, almoço, jantar)
/// e 2 para funcionários (manhã, tarde).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCode<const N: usize>([SlotStatus; N]);

pub type MealCode = DayCode<3>;
pub type ShiftCode = DayCode<2>;

impl<const N: usize> Default for DayCode<N> {
    fn default() -> Self {
        Self([SlotStatus::Absent; N])
    }
}

impl<const N: usize> DayCode<N> {
    pub fn new(slots: [SlotStatus; N]) -> Self {
        Self(slots)
    }

    /// Leitura tolerante do valor armazenado: ausente ou curto vira "A".
    pub fn decode(raw: Option<&str>) -> Self {
        let mut slots = [SlotStatus::Absent; N];
        if let Some(raw) = raw {
            for (slot, c) in slots.iter_mut().zip(raw.chars()) {
                *slot = SlotStatus::from_char(c).unwrap_or(SlotStatus::Absent);
            }
        }
        Self(slots)
    }

    /// Leitura estrita de entrada do usuário.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.chars().count() != N {
            return Err(AppError::bad_request(format!(
                "Código '{}' deve ter exatamente {} caracteres",
                raw, N
            )));
        }
        let mut slots = [SlotStatus::Absent; N];
        for (slot, c) in slots.iter_mut().zip(raw.chars()) {
            *slot = SlotStatus::from_char(c).ok_or_else(|| {
                AppError::bad_request(format!("Caractere '{}' inválido em '{}' (use P, A, H ou L)", c, raw))
            })?;
        }
        Ok(Self(slots))
    }

    pub fn encode(&self) -> String {
        self.0.iter().map(SlotStatus::as_char).collect()
    }

    pub fn slot(&self, index: usize) -> SlotStatus {
        self.0.get(index).copied().unwrap_or(SlotStatus::Absent)
    }
}

impl MealCode {
    pub fn breakfast(&self) -> SlotStatus {
        self.slot(0)
    }

    pub fn lunch(&self) -> SlotStatus {
        self.slot(1)
    }

    pub fn dinner(&self) -> SlotStatus {
        self.slot(2)
    }
}

impl ShiftCode {
    pub fn morning(&self) -> SlotStatus {
        self.slot(0)
    }

    pub fn evening(&self) -> SlotStatus {
        self.slot(1)
    }
}

/// Lê as 31 colunas `dayN` de uma linha mensal.
fn read_day_columns<const N: usize>(row: &PgRow) -> Result<[DayCode<N>; DAYS_PER_SHEET], sqlx::Error> {
    let mut days = [DayCode::<N>::default(); DAYS_PER_SHEET];
    for day in DayIndex::all() {
        let raw: Option<String> = row.try_get(day.column().as_str())?;
        days[day.slot()] = DayCode::decode(raw.as_deref());
    }
    Ok(days)
}

// --- Addons (cobranças avulsas num dia de entrega) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    #[schema(example = 12)]
    pub day: u8,
    #[schema(value_type = String, example = "40.00")]
    pub amount: Decimal,
    #[schema(example = "Sobremesa extra")]
    pub detail: Option<String>,
}

// --- Linhas mensais ---

#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub customer_id: Uuid,
    pub month_year: String,
    pub days: [MealCode; DAYS_PER_SHEET],
    pub addons: Vec<Addon>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Delivery {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let addons: Json<Vec<Addon>> = row.try_get("addons")?;
        Ok(Self {
            id: row.try_get("id")?,
            vendor_id: row.try_get("vendor_id")?,
            customer_id: row.try_get("customer_id")?,
            month_year: row.try_get("month_year")?,
            days: read_day_columns::<3>(row)?,
            addons: addons.0,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Delivery {
    pub fn month(&self) -> Result<MonthYear, AppError> {
        self.month_year.parse()
    }

    pub fn day(&self, day: DayIndex) -> MealCode {
        self.days[day.slot()]
    }
}

#[derive(Debug, Clone)]
pub struct StaffAttendance {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub staff_id: Uuid,
    pub month_year: String,
    pub days: [ShiftCode; DAYS_PER_SHEET],
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for StaffAttendance {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vendor_id: row.try_get("vendor_id")?,
            staff_id: row.try_get("staff_id")?,
            month_year: row.try_get("month_year")?,
            days: read_day_columns::<2>(row)?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// --- Visões entregues ao frontend ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealDayView {
    pub customer_id: Uuid,
    #[schema(example = "Ana Souza")]
    pub customer_name: Option<String>,
    #[schema(example = 12)]
    pub day: u8,
    pub breakfast: SlotStatus,
    pub lunch: SlotStatus,
    pub dinner: SlotStatus,
}

impl MealDayView {
    pub fn new(customer_id: Uuid, customer_name: Option<String>, day: DayIndex, code: MealCode) -> Self {
        Self {
            customer_id,
            customer_name,
            day: day.get(),
            breakfast: code.breakfast(),
            lunch: code.lunch(),
            dinner: code.dinner(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDayView {
    pub staff_id: Uuid,
    #[schema(example = "Carlos")]
    pub staff_name: Option<String>,
    #[schema(example = 3)]
    pub day: u8,
    pub morning: SlotStatus,
    pub evening: SlotStatus,
}

impl ShiftDayView {
    pub fn new(staff_id: Uuid, staff_name: Option<String>, day: DayIndex, code: ShiftCode) -> Self {
        Self {
            staff_id,
            staff_name,
            day: day.get(),
            morning: code.morning(),
            evening: code.evening(),
        }
    }
}

/// Mês inteiro já decodificado; só contém os dias reais do mês.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthSheet {
    pub owner_id: Uuid,
    #[schema(example = "2024-05")]
    pub month_year: String,
    pub days: Vec<SheetDay>,
    pub addons: Vec<Addon>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SheetDay {
    pub day: u8,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(example = "PPA")]
    pub code: String,
}

impl MonthSheet {
    fn build<const N: usize>(
        owner_id: Uuid,
        month: MonthYear,
        days: &[DayCode<N>; DAYS_PER_SHEET],
        addons: Vec<Addon>,
    ) -> Self {
        let days = DayIndex::all()
            .filter_map(|day| {
                month.date(day).map(|date| SheetDay {
                    day: day.get(),
                    date,
                    code: days[day.slot()].encode(),
                })
            })
            .collect();
        Self {
            owner_id,
            month_year: month.to_string(),
            days,
            addons,
        }
    }

    pub fn from_delivery(delivery: &Delivery, month: MonthYear) -> Self {
        Self::build(delivery.customer_id, month, &delivery.days, delivery.addons.clone())
    }

    pub fn from_staff(attendance: &StaffAttendance, month: MonthYear) -> Self {
        Self::build(attendance.staff_id, month, &attendance.days, Vec::new())
    }
}

/// Resultado de lote: cada linha é gravada de forma independente.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub id: Uuid,
    pub message: String,
}
