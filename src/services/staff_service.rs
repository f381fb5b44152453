// src/services/staff_service.rs

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{calendar::MonthYear, error::AppError, money::money},
    db::StaffRepository,
    models::staff::{Expense, Staff},
};

#[derive(Clone)]
pub struct StaffService {
    repo: StaffRepository,
}

impl StaffService {
    pub fn new(repo: StaffRepository) -> Self {
        Self { repo }
    }

    pub async fn create_staff(
        &self,
        vendor_id: Uuid,
        name: &str,
        phone: Option<&str>,
        role: Option<&str>,
        monthly_salary: Decimal,
    ) -> Result<Staff, AppError> {
        let staff = self
            .repo
            .create_staff(vendor_id, name, phone, role, money(monthly_salary))
            .await?;

        tracing::info!(vendor_id = %vendor_id, staff_id = %staff.id, "Funcionário cadastrado");
        Ok(staff)
    }

    pub async fn list_staff(&self, vendor_id: Uuid) -> Result<Vec<Staff>, AppError> {
        self.repo.list_staff(vendor_id).await
    }

    /// Despesa avulsa ou pagamento de salário (quando `staff_id` vem preenchido).
    pub async fn create_expense(
        &self,
        vendor_id: Uuid,
        staff_id: Option<Uuid>,
        category: &str,
        detail: Option<&str>,
        amount: Decimal,
        expense_date: NaiveDate,
    ) -> Result<Expense, AppError> {
        if let Some(staff_id) = staff_id {
            self.repo
                .find_staff(vendor_id, staff_id)
                .await?
                .ok_or_else(|| AppError::not_found("Funcionário"))?;
        }

        self.repo
            .create_expense(vendor_id, staff_id, category, detail, money(amount), expense_date)
            .await
    }

    pub async fn list_expenses(&self, vendor_id: Uuid, month: MonthYear) -> Result<Vec<Expense>, AppError> {
        let (from, to) = month_bounds(month);
        self.repo.list_expenses(vendor_id, from, to).await
    }
}

/// Primeiro e último dia do mês.
pub(crate) fn month_bounds(month: MonthYear) -> (NaiveDate, NaiveDate) {
    let from = month.first_day();
    let to = from
        .checked_add_days(Days::new(month.days_in_month() as u64 - 1))
        .unwrap_or(from);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (from, to) = month_bounds("2024-02".parse().unwrap());
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, to) = month_bounds("2023-12".parse().unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }
}
