// src/services/attendance_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        calendar::{DayIndex, MonthYear},
        error::AppError,
    },
    db::{AttendanceRepository, CustomerRepository, StaffRepository},
    models::attendance::{
        Addon, BatchFailure, BatchOutcome, DayCode, MealCode, MealDayView, MonthSheet, ShiftCode,
        ShiftDayView,
    },
    models::{customer::Customer, staff::Staff},
};

#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    customer_repo: CustomerRepository,
    staff_repo: StaffRepository,
    pool: PgPool,
}

impl AttendanceService {
    pub fn new(
        repo: AttendanceRepository,
        customer_repo: CustomerRepository,
        staff_repo: StaffRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            customer_repo,
            staff_repo,
            pool,
        }
    }

    // =========================================================================
    //  ENTREGAS
    // =========================================================================

    /// Planilha do mês do cliente; a linha é criada vazia na primeira leitura.
    pub async fn get_month_deliveries(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
    ) -> Result<MonthSheet, AppError> {
        self.ensure_customer(vendor_id, customer_id).await?;

        let delivery = self
            .repo
            .ensure_delivery(&self.pool, vendor_id, customer_id, month)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        Ok(MonthSheet::from_delivery(&delivery, month))
    }

    pub async fn get_daily_deliveries(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
    ) -> Result<Vec<MealDayView>, AppError> {
        let entries = self.repo.delivery_day_entries(vendor_id, month, day).await?;

        Ok(entries
            .into_iter()
            .map(|e| {
                MealDayView::new(e.owner_id, Some(e.owner_name), day, MealCode::decode(e.code.as_deref()))
            })
            .collect())
    }

    /// Grava o mesmo dia para vários clientes. Cada linha é independente:
    /// uma falha não desfaz as demais e volta listada em `failed`.
    pub async fn update_daily_deliveries(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        records: &[(Uuid, MealCode)],
    ) -> Result<BatchOutcome<MealDayView>, AppError> {
        let mut outcome = BatchOutcome::default();

        for &(customer_id, code) in records {
            match self.write_delivery_day(vendor_id, customer_id, month, day, code).await {
                Ok(view) => outcome.succeeded.push(view),
                Err(e) => {
                    tracing::warn!(
                        vendor_id = %vendor_id,
                        customer_id = %customer_id,
                        day = day.get(),
                        error = %e,
                        "Falha ao gravar entrega do dia"
                    );
                    outcome.failed.push(BatchFailure {
                        id: customer_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            month = %month,
            day = day.get(),
            ok = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "📦 Entregas do dia gravadas"
        );
        Ok(outcome)
    }

    async fn write_delivery_day(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        code: MealCode,
    ) -> Result<MealDayView, AppError> {
        let customer = self.ensure_customer(vendor_id, customer_id).await?;

        let delivery = self
            .repo
            .upsert_delivery_day(&self.pool, vendor_id, customer_id, month, day, code)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        Ok(MealDayView::new(customer_id, Some(customer.name), day, delivery.day(day)))
    }

    /// Vários dias de um cliente numa única instrução.
    /// Todos os campos são validados antes de qualquer escrita.
    pub async fn update_month_deliveries(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        records: &HashMap<String, String>,
    ) -> Result<MonthSheet, AppError> {
        let days = parse_day_records::<3>(records)?;

        let mut tx = self.pool.begin().await?;

        self.customer_repo
            .find_customer(&mut *tx, vendor_id, customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        let delivery = self
            .repo
            .upsert_delivery_days(&mut *tx, vendor_id, customer_id, month, &days)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        tx.commit().await?;

        tracing::info!(customer_id = %customer_id, month = %month, days = days.len(), "📦 Mês de entregas atualizado");
        Ok(MonthSheet::from_delivery(&delivery, month))
    }

    pub async fn add_delivery_addon(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        addon: Addon,
    ) -> Result<MonthSheet, AppError> {
        // valida o dia antes de gravar
        DayIndex::new(addon.day as i64)?;
        self.ensure_customer(vendor_id, customer_id).await?;

        let delivery = self
            .repo
            .append_addon(&self.pool, vendor_id, customer_id, month, &addon)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        tracing::info!(
            customer_id = %customer_id,
            month = %month,
            day = addon.day,
            amount = %addon.amount,
            "➕ Addon lançado"
        );
        Ok(MonthSheet::from_delivery(&delivery, month))
    }

    // =========================================================================
    //  PRESENÇA DE FUNCIONÁRIOS
    // =========================================================================

    pub async fn get_month_attendance(
        &self,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
    ) -> Result<MonthSheet, AppError> {
        self.ensure_staff(vendor_id, staff_id).await?;

        let attendance = self
            .repo
            .ensure_staff_sheet(&self.pool, vendor_id, staff_id, month)
            .await?
            .ok_or_else(|| AppError::not_found("Funcionário"))?;

        Ok(MonthSheet::from_staff(&attendance, month))
    }

    pub async fn get_daily_attendance(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
    ) -> Result<Vec<ShiftDayView>, AppError> {
        let entries = self.repo.staff_day_entries(vendor_id, month, day).await?;

        Ok(entries
            .into_iter()
            .map(|e| {
                ShiftDayView::new(e.owner_id, Some(e.owner_name), day, ShiftCode::decode(e.code.as_deref()))
            })
            .collect())
    }

    pub async fn update_daily_attendance(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        records: &[(Uuid, ShiftCode)],
    ) -> Result<BatchOutcome<ShiftDayView>, AppError> {
        let mut outcome = BatchOutcome::default();

        for &(staff_id, code) in records {
            match self.write_staff_day(vendor_id, staff_id, month, day, code).await {
                Ok(view) => outcome.succeeded.push(view),
                Err(e) => {
                    tracing::warn!(
                        vendor_id = %vendor_id,
                        staff_id = %staff_id,
                        day = day.get(),
                        error = %e,
                        "Falha ao gravar presença do dia"
                    );
                    outcome.failed.push(BatchFailure {
                        id: staff_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    async fn write_staff_day(
        &self,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        code: ShiftCode,
    ) -> Result<ShiftDayView, AppError> {
        let staff = self.ensure_staff(vendor_id, staff_id).await?;

        let attendance = self
            .repo
            .upsert_staff_day(&self.pool, vendor_id, staff_id, month, day, code)
            .await?
            .ok_or_else(|| AppError::not_found("Funcionário"))?;

        Ok(ShiftDayView::new(staff_id, Some(staff.name), day, attendance.days[day.slot()]))
    }

    pub async fn update_month_attendance(
        &self,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
        records: &HashMap<String, String>,
    ) -> Result<MonthSheet, AppError> {
        let days = parse_day_records::<2>(records)?;
        self.ensure_staff(vendor_id, staff_id).await?;

        // Uma única instrução: ou grava todos os dias ou nenhum
        let attendance = self
            .repo
            .upsert_staff_days(&self.pool, vendor_id, staff_id, month, &days)
            .await?
            .ok_or_else(|| AppError::not_found("Funcionário"))?;

        Ok(MonthSheet::from_staff(&attendance, month))
    }

    // ---

    async fn ensure_customer(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Customer, AppError> {
        self.customer_repo
            .find_customer(&self.pool, vendor_id, customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))
    }

    async fn ensure_staff(
        &self,
        vendor_id: Uuid,
        staff_id: Uuid,
    ) -> Result<Staff, AppError> {
        self.staff_repo
            .find_staff(vendor_id, staff_id)
            .await?
            .ok_or_else(|| AppError::not_found("Funcionário"))
    }
}

/// Converte `{"day5": "PPA", ...}` em pares validados, ordenados por dia.
fn parse_day_records<const N: usize>(
    records: &HashMap<String, String>,
) -> Result<Vec<(DayIndex, DayCode<N>)>, AppError> {
    if records.is_empty() {
        return Err(AppError::bad_request("Nenhum dia informado"));
    }

    let mut days = records
        .iter()
        .map(|(field, code)| Ok((DayIndex::parse_field(field)?, DayCode::<N>::parse(code)?)))
        .collect::<Result<Vec<_>, AppError>>()?;
    days.sort_by_key(|(day, _)| *day);

    // "day5" e "5" apontam para a mesma coluna
    if days.windows(2).any(|pair| pair[0].0 == pair[1].0) {
        return Err(AppError::bad_request("Dia informado mais de uma vez"));
    }
    Ok(days)
}
